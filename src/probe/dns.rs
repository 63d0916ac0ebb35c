//! DNS query probe.
//!
//! Measures how long an endpoint takes to answer a lookup for a fixed test
//! domain. Each attempt builds a resolver that talks to that endpoint only,
//! with caching disabled so repeated attempts hit the wire.

#![allow(clippy::missing_errors_doc)]

use crate::engine::types::Endpoint;
use crate::error::{Error, Result};
use crate::probe::{Measurement, Probe, ProbeFailure};
use async_trait::async_trait;
use std::net::IpAddr;
use std::time::{Duration, Instant};
use trust_dns_resolver::config::{NameServerConfigGroup, ResolverConfig, ResolverOpts};
use trust_dns_resolver::error::ResolveErrorKind;
use trust_dns_resolver::proto::op::ResponseCode;
use trust_dns_resolver::TokioAsyncResolver;

/// Standard DNS port.
const DNS_PORT: u16 = 53;

/// Default timeout for a single lookup in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 2;

/// Default domain to resolve.
pub const DEFAULT_TEST_DOMAIN: &str = "www.google.com";

/// DNS lookup latency probe.
///
/// # Example
///
/// ```ignore
/// let probe = DnsQueryProbe::new("www.baidu.com");
/// let endpoint = Endpoint::new("AliDNS", "223.5.5.5");
/// let measurement = probe.probe(&endpoint).await;
/// ```
#[derive(Debug, Clone)]
pub struct DnsQueryProbe {
    domain: String,
    timeout: Duration,
}

impl DnsQueryProbe {
    /// Create a probe resolving `domain`.
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Set the resolver-level timeout for one lookup.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fully-qualified form of the test domain.
    fn fqdn(&self) -> String {
        if self.domain.ends_with('.') {
            self.domain.clone()
        } else {
            format!("{}.", self.domain)
        }
    }

    /// Build a resolver that only queries `ip`.
    fn resolver_for(&self, ip: IpAddr) -> Result<TokioAsyncResolver> {
        let config = ResolverConfig::from_parts(
            None,
            vec![],
            NameServerConfigGroup::from_ips_clear(&[ip], DNS_PORT, true),
        );

        let mut opts = ResolverOpts::default();
        opts.timeout = self.timeout;
        opts.attempts = 1;
        opts.cache_size = 0;
        opts.use_hosts_file = false;

        TokioAsyncResolver::tokio(config, opts).map_err(Error::Resolver)
    }
}

impl Default for DnsQueryProbe {
    fn default() -> Self {
        Self::new(DEFAULT_TEST_DOMAIN)
    }
}

#[async_trait]
impl Probe for DnsQueryProbe {
    async fn probe(&self, endpoint: &Endpoint) -> Measurement {
        let Some(ip) = endpoint.ip_addr() else {
            return Measurement::failure(ProbeFailure::Unreachable(
                "invalid IP address".into(),
            ));
        };

        let resolver = match self.resolver_for(ip) {
            Ok(resolver) => resolver,
            Err(e) => return Measurement::failure(ProbeFailure::Query(e.to_string())),
        };

        let start = Instant::now();
        let result = resolver.lookup_ip(self.fqdn()).await;
        let elapsed = start.elapsed().as_secs_f64() * 1000.0;

        match result {
            Ok(lookup) => match lookup.iter().next() {
                Some(first) => Measurement::success(elapsed, true).with_answer(first),
                None => Measurement::success(elapsed, false),
            },
            Err(e) => match e.kind() {
                ResolveErrorKind::NoRecordsFound { response_code, .. } => {
                    empty_answer(*response_code, elapsed)
                }
                ResolveErrorKind::Timeout => Measurement::timeout(),
                ResolveErrorKind::Io(_) | ResolveErrorKind::NoConnections => {
                    tracing::debug!("DNS probe to {ip} unreachable: {e}");
                    Measurement::failure(ProbeFailure::Unreachable(e.to_string()))
                }
                _ => {
                    tracing::debug!("DNS probe to {ip} failed: {e}");
                    Measurement::failure(ProbeFailure::Query(e.to_string()))
                }
            },
        }
    }

    fn name(&self) -> &str {
        "dns"
    }
}

/// Classify an answer that carried no address records.
///
/// `NOERROR` and `NXDOMAIN` are real answers; any other code (`SERVFAIL`,
/// `REFUSED`, ...) means the endpoint would not resolve the name.
fn empty_answer(code: ResponseCode, elapsed_ms: f64) -> Measurement {
    match code {
        ResponseCode::NoError | ResponseCode::NXDomain => Measurement::success(elapsed_ms, false),
        other => Measurement::failure(ProbeFailure::Query(format!("server answered {other}"))),
    }
}
