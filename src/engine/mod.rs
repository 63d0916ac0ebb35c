//! Probing engine.
//!
//! Data flows registry → prober → aggregator → ranker:
//! - [`Registry`]: ordered endpoint list
//! - [`Prober`]: bounded-concurrency fan-out of a probe over the registry
//! - [`summarize`]: per-endpoint statistics from raw measurements
//! - [`rank`] / [`top_k`]: global ordering and recommendation

pub mod aggregate;
pub mod prober;
pub mod rank;
pub mod registry;
pub mod types;

pub use aggregate::summarize;
pub use prober::{run_all, Prober, ProberSettings};
pub use rank::{best, rank, top_k};
pub use registry::Registry;
pub use types::*;
