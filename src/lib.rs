//! dnsrank - bounded-concurrency DNS resolver probing and ranking.
//!
//! This crate provides both a library API and a CLI tool for:
//! - Probing a list of endpoints with a pluggable probe (DNS lookup or ICMP echo)
//! - Running probes under a fixed concurrency cap
//! - Aggregating per-endpoint latency statistics
//! - Ranking endpoints and recommending the fastest usable ones
//!
//! # Library Usage
//!
//! ```ignore
//! use dnsrank::{rank, top_k, DnsQueryProbe, Prober, ProberSettings, Registry};
//! use std::sync::Arc;
//!
//! let registry = Registry::builtin();
//! let prober = Prober::new(Arc::new(DnsQueryProbe::default()), ProberSettings::new(3, 10))?;
//! let ranked = rank(prober.run_all(registry.endpoints()).await?);
//! let best = top_k(&ranked, 3);
//! ```
//!
//! Any type implementing [`Probe`] can replace the built-in probes.
//!
//! # CLI Usage
//!
//! ```bash
//! # Probe the built-in resolver list and rank it
//! dnsrank run
//! dnsrank run --concurrency 4 --attempts 5 --top 5
//! dnsrank run --dns 8.8.8.8#Google --dns 1.1.1.1#Cloudflare
//! dnsrank run --probe icmp --region China
//!
//! # List or export the registry
//! dnsrank list --ipv4
//! dnsrank export --output endpoints.json
//! ```

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod probe;
pub mod report;

// Re-export commonly used types
pub use cli::{Cli, Commands, OutputFormat};
pub use config::{ConfigLoader, RunConfig};
pub use engine::{
    best, rank, run_all, summarize, top_k, Endpoint, EndpointStats, Latency, Prober,
    ProberSettings, Registry, RunSummary, StatsStatus,
};
pub use error::{Error, Result};
pub use probe::{DnsQueryProbe, IcmpProbe, Measurement, Probe, ProbeFailure, ProbeKind};
