//! Probe capability.
//!
//! A [`Probe`] performs one network interaction against an endpoint and
//! reports a [`Measurement`]. The prober is written against the trait only,
//! so a real query can be swapped for a scripted fake without touching the
//! engine.
//!
//! Two real probes ship with the crate:
//! - [`DnsQueryProbe`]: time a DNS lookup answered by the endpoint
//! - [`IcmpProbe`]: time an ICMP echo to the endpoint

pub mod dns;
pub mod icmp;

pub use dns::DnsQueryProbe;
pub use icmp::IcmpProbe;

use crate::engine::types::Endpoint;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use thiserror::Error;

/// Why a single probe attempt produced no sample.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeFailure {
    /// The attempt did not complete in time.
    #[error("timed out")]
    Timeout,
    /// The endpoint could not be reached at all.
    #[error("unreachable: {0}")]
    Unreachable(String),
    /// The endpoint answered with an error, or the query itself failed.
    #[error("query failed: {0}")]
    Query(String),
}

/// Outcome of a single probe attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    /// Sample in milliseconds, or why there is none
    pub outcome: std::result::Result<f64, ProbeFailure>,
    /// Whether basic connectivity was confirmed during the attempt
    pub connectivity: bool,
    /// First address the endpoint answered with, for probes that resolve names
    pub answer: Option<IpAddr>,
}

impl Measurement {
    /// A successful sample.
    ///
    /// A latency that is not a finite, non-negative number is recorded as a
    /// failed query instead.
    #[must_use]
    pub fn success(latency_ms: f64, connectivity: bool) -> Self {
        let outcome = if is_valid_latency(latency_ms) {
            Ok(latency_ms)
        } else {
            Err(ProbeFailure::Query(format!("invalid latency {latency_ms}")))
        };
        Self {
            outcome,
            connectivity,
            answer: None,
        }
    }

    /// A failed attempt.
    #[must_use]
    pub fn failure(failure: ProbeFailure) -> Self {
        Self {
            outcome: Err(failure),
            connectivity: false,
            answer: None,
        }
    }

    /// A timed-out attempt.
    #[must_use]
    pub fn timeout() -> Self {
        Self::failure(ProbeFailure::Timeout)
    }

    /// Attach the first answered address.
    #[must_use]
    pub fn with_answer(mut self, answer: IpAddr) -> Self {
        self.answer = Some(answer);
        self
    }

    /// The sample in milliseconds, if the attempt succeeded with a usable
    /// latency.
    #[must_use]
    pub fn sample(&self) -> Option<f64> {
        self.outcome
            .as_ref()
            .ok()
            .copied()
            .filter(|ms| is_valid_latency(*ms))
    }

    /// Whether the attempt succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.sample().is_some()
    }

    /// Whether the attempt failed by timing out.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self.outcome, Err(ProbeFailure::Timeout))
    }
}

fn is_valid_latency(ms: f64) -> bool {
    ms.is_finite() && ms >= 0.0
}

/// A pluggable measurement of one endpoint.
///
/// Implementations must not panic on network errors; every failure is
/// reported as a failed [`Measurement`].
#[async_trait]
pub trait Probe: Send + Sync {
    /// Perform one attempt against `endpoint`.
    async fn probe(&self, endpoint: &Endpoint) -> Measurement;

    /// Short name used in logs.
    fn name(&self) -> &str;
}

/// Which built-in probe to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeKind {
    /// DNS lookup through the endpoint (default)
    #[default]
    Dns,
    /// ICMP echo to the endpoint
    Icmp,
}

impl ProbeKind {
    /// Get all available probe names.
    #[must_use]
    pub fn names() -> &'static [&'static str] {
        &["dns", "icmp"]
    }
}

impl std::str::FromStr for ProbeKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dns" => Ok(Self::Dns),
            "icmp" | "ping" => Ok(Self::Icmp),
            _ => Err(format!(
                "Unknown probe: {}. Valid options are: {:?}",
                s,
                Self::names()
            )),
        }
    }
}

impl std::fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dns => write!(f, "dns"),
            Self::Icmp => write!(f, "icmp"),
        }
    }
}
