//! Engine types and data structures.
//!
//! This module provides the core types shared by the registry, prober,
//! aggregator and ranker: the probed [`Endpoint`], its per-run
//! [`EndpointStats`] and the run-wide [`RunSummary`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

/// A named, addressable target to be probed.
///
/// Endpoints are immutable once registered; the prober only ever sees
/// shared references to them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Endpoint {
    /// Display name (e.g., "Cloudflare DNS")
    pub name: String,
    /// IP address of the endpoint
    #[serde(rename = "IP")]
    pub address: String,
    /// Optional region tag (e.g., "Global", "China")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl Endpoint {
    /// Create a new endpoint without a region tag.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let endpoint = Endpoint::new("Cloudflare", "1.1.1.1");
    /// ```
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            region: None,
        }
    }

    /// Attach a region tag.
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Parse the address string into an `IpAddr`.
    ///
    /// # Returns
    ///
    /// Returns `Some(IpAddr)` if parsing succeeds, `None` otherwise.
    #[must_use]
    pub fn ip_addr(&self) -> Option<IpAddr> {
        self.address.parse().ok()
    }

    /// Check if the endpoint uses IPv4.
    #[must_use]
    pub fn is_ipv4(&self) -> bool {
        self.ip_addr().is_some_and(|ip| ip.is_ipv4())
    }

    /// Check if the endpoint uses IPv6.
    #[must_use]
    pub fn is_ipv6(&self) -> bool {
        self.ip_addr().is_some_and(|ip| ip.is_ipv6())
    }

    /// Region tag, or `"Unknown"` when none was given.
    #[must_use]
    pub fn region_or_unknown(&self) -> &str {
        self.region.as_deref().unwrap_or("Unknown")
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.address)
    }
}

/// Aggregate latency of one endpoint.
///
/// `Unavailable` is the sentinel for "no successful sample": it never
/// carries a number, so it cannot be compared numerically by accident.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum Latency {
    /// At least one attempt succeeded.
    Available {
        /// Fastest successful sample in milliseconds
        min_ms: f64,
        /// Slowest successful sample in milliseconds
        max_ms: f64,
        /// Mean of the successful samples in milliseconds
        mean_ms: f64,
    },
    /// Every attempt failed.
    Unavailable,
}

impl Latency {
    /// Check whether a measurement is available.
    #[must_use]
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available { .. })
    }

    /// Mean latency in milliseconds, if available.
    #[must_use]
    pub fn mean(&self) -> Option<f64> {
        match self {
            Self::Available { mean_ms, .. } => Some(*mean_ms),
            Self::Unavailable => None,
        }
    }

    /// Minimum latency in milliseconds, if available.
    #[must_use]
    pub fn min(&self) -> Option<f64> {
        match self {
            Self::Available { min_ms, .. } => Some(*min_ms),
            Self::Unavailable => None,
        }
    }

    /// Maximum latency in milliseconds, if available.
    #[must_use]
    pub fn max(&self) -> Option<f64> {
        match self {
            Self::Available { max_ms, .. } => Some(*max_ms),
            Self::Unavailable => None,
        }
    }
}

/// Outcome tag of an endpoint after all of its attempts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StatsStatus {
    /// At least one attempt succeeded.
    #[default]
    Ok,
    /// Every attempt failed.
    Error,
}

impl StatsStatus {
    /// Check if the status indicates a usable endpoint.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }
}

impl fmt::Display for StatsStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Aggregated statistics for one endpoint across all attempts of a run.
///
/// Built once by the aggregator and never mutated afterwards, except for
/// the registry position the prober stamps on it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EndpointStats {
    /// The endpoint that was probed
    pub endpoint: Endpoint,
    /// Index of the endpoint in registry order; final ranking tie-break
    pub position: usize,
    /// Successful samples in milliseconds, in attempt order
    pub samples: Vec<f64>,
    /// Derived min/max/mean, or the unavailable sentinel
    pub latency: Latency,
    /// Number of attempts made
    pub attempts: usize,
    /// Number of successful attempts (always <= `attempts`)
    pub success_count: usize,
    /// Whether any attempt confirmed basic connectivity
    pub connectivity: bool,
    /// Outcome tag
    pub status: StatsStatus,
    /// Every attempt failed, and every failure was a timeout
    #[serde(default)]
    pub all_timeouts: bool,
    /// First answer returned by a successful attempt, if the probe reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<IpAddr>,
}

impl EndpointStats {
    /// Stamp the registry position.
    #[must_use]
    pub fn with_position(mut self, position: usize) -> Self {
        self.position = position;
        self
    }

    /// Whether at least one attempt succeeded.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.success_count > 0
    }

    /// Short outcome label: `ok`, `timeout` when every attempt timed out,
    /// `error` otherwise.
    #[must_use]
    pub fn outcome(&self) -> &'static str {
        match self.status {
            StatsStatus::Ok => "ok",
            StatsStatus::Error if self.all_timeouts => "timeout",
            StatsStatus::Error => "error",
        }
    }

    /// Success rate as a percentage of attempts.
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            (self.success_count as f64 / self.attempts as f64) * 100.0
        }
    }
}

/// Run-wide summary statistics.
///
/// Aggregated over the per-endpoint stats of one run; latency figures are
/// taken over the means of available endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RunSummary {
    /// Total number of endpoints probed
    pub total: usize,
    /// Endpoints with status `ok`
    pub ok: usize,
    /// Endpoints with status `error`
    pub error: usize,
    /// Failed endpoints whose every attempt timed out (included in `error`)
    pub timeout: usize,
    /// Mean of endpoint means in milliseconds
    pub avg_latency: Option<f64>,
    /// Lowest endpoint mean in milliseconds
    pub min_latency: Option<f64>,
    /// Highest endpoint mean in milliseconds
    pub max_latency: Option<f64>,
}

impl RunSummary {
    /// Build a summary from a run's stats.
    #[must_use]
    pub fn from_stats(stats: &[EndpointStats]) -> Self {
        let mut summary = Self::default();
        for s in stats {
            summary.add(s);
        }
        summary
    }

    fn add(&mut self, stats: &EndpointStats) {
        self.total += 1;
        if stats.status.is_ok() {
            self.ok += 1;
        } else {
            self.error += 1;
            if stats.all_timeouts {
                self.timeout += 1;
            }
        }

        if let Some(mean) = stats.latency.mean() {
            let n = self.ok as f64;
            self.avg_latency = Some(
                self.avg_latency
                    .map(|a| a.mul_add(n - 1.0, mean) / n)
                    .unwrap_or(mean),
            );
            self.min_latency = Some(self.min_latency.map(|m| m.min(mean)).unwrap_or(mean));
            self.max_latency = Some(self.max_latency.map(|m| m.max(mean)).unwrap_or(mean));
        }
    }

    /// Share of endpoints with status `ok`, as a percentage.
    #[must_use]
    pub fn ok_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.ok as f64 / self.total as f64) * 100.0
        }
    }
}
