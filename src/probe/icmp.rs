//! ICMP echo probe.
//!
//! Measures round-trip time to an endpoint with a single ICMP echo per
//! attempt. Sending ICMP needs raw socket access (root, or
//! `net.ipv4.ping_group_range` on Linux).

#![allow(clippy::missing_errors_doc)]

use crate::engine::types::Endpoint;
use crate::error::{Error, Result};
use crate::probe::{Measurement, Probe, ProbeFailure};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::Duration;
use surge_ping::{Client, Config, PingIdentifier, PingSequence, SurgeError};
use tokio::time::timeout;

/// Default packet size for ping in bytes.
const DEFAULT_PACKET_SIZE: usize = 32;

/// Default timeout for each ping attempt in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 2;

/// ICMP echo latency probe.
///
/// One client is shared by every attempt; identifiers and sequence
/// numbers are drawn from per-probe counters so concurrent pingers do not
/// collide.
pub struct IcmpProbe {
    client: Client,
    timeout: Duration,
    next_ident: AtomicU16,
    next_seq: AtomicU16,
}

impl IcmpProbe {
    /// Create a new `IcmpProbe` with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the ICMP client cannot be initialized
    /// (e.g., due to insufficient permissions).
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a new `IcmpProbe` with a custom per-echo timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::new(&Config::default()).map_err(|e| Error::network(e.to_string()))?;

        Ok(Self {
            client,
            timeout,
            next_ident: AtomicU16::new(seed_ident()),
            next_seq: AtomicU16::new(0),
        })
    }
}

#[async_trait]
impl Probe for IcmpProbe {
    async fn probe(&self, endpoint: &Endpoint) -> Measurement {
        let Some(ip) = endpoint.ip_addr() else {
            return Measurement::failure(ProbeFailure::Unreachable(
                "invalid IP address".into(),
            ));
        };

        // The client is configured for ICMPv4 only
        if ip.is_ipv6() {
            return Measurement::failure(ProbeFailure::Unreachable(
                "IPv6 not supported by ICMP probe".into(),
            ));
        }

        let ident = self.next_ident.fetch_add(1, Ordering::Relaxed);
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let payload = [0u8; DEFAULT_PACKET_SIZE];

        let mut pinger = self.client.pinger(ip, PingIdentifier(ident)).await;
        pinger.timeout(self.timeout);

        match timeout(self.timeout, pinger.ping(PingSequence(seq), &payload)).await {
            Ok(Ok((_packet, rtt))) => Measurement::success(rtt.as_secs_f64() * 1000.0, true),
            Ok(Err(SurgeError::Timeout { .. })) | Err(_) => Measurement::timeout(),
            Ok(Err(e)) => {
                tracing::debug!("Ping error for {ip}: {e}");
                Measurement::failure(ProbeFailure::Unreachable(e.to_string()))
            }
        }
    }

    fn name(&self) -> &str {
        "icmp"
    }
}

/// Starting ICMP identifier, derived from the clock.
fn seed_ident() -> u16 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| (d.subsec_nanos() % 65536) as u16)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ping_localhost() {
        // This test requires ICMP socket permissions which are not available in CI
        if std::env::var("CI").is_ok() {
            return;
        }

        let Ok(probe) = IcmpProbe::new() else {
            return;
        };
        let m = probe.probe(&Endpoint::new("localhost", "127.0.0.1")).await;

        // Localhost should respond quickly
        if let Some(sample) = m.sample() {
            assert!(m.connectivity);
            assert!(sample < 10.0);
        }
    }

    #[tokio::test]
    async fn test_ipv6_is_rejected() {
        if std::env::var("CI").is_ok() {
            return;
        }

        let Ok(probe) = IcmpProbe::new() else {
            return;
        };
        let m = probe.probe(&Endpoint::new("v6", "::1")).await;
        assert!(matches!(m.outcome, Err(ProbeFailure::Unreachable(_))));
    }
}
