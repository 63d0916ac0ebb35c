//! Aggregation of raw probe samples into per-endpoint statistics.

use crate::engine::types::{Endpoint, EndpointStats, Latency, StatsStatus};
use crate::probe::Measurement;

/// Summarize every attempt made against `endpoint`.
///
/// Pure and deterministic: min/max/mean are computed over the successful
/// samples only, in attempt order. A sample that is not a finite,
/// non-negative number of milliseconds counts as a failed attempt. When
/// nothing succeeded the latency is [`Latency::Unavailable`] and the status
/// is [`StatsStatus::Error`]; `all_timeouts` records whether every one of
/// those failures was a timeout.
///
/// Connectivity is reported independently of success: it is `true` iff at
/// least one attempt confirmed it.
///
/// The returned stats carry registry position 0; the prober stamps the
/// real one with [`EndpointStats::with_position`].
#[must_use]
pub fn summarize(endpoint: &Endpoint, samples: &[Measurement]) -> EndpointStats {
    let values: Vec<f64> = samples.iter().filter_map(Measurement::sample).collect();
    let connectivity = samples.iter().any(|m| m.connectivity);
    let answer = samples
        .iter()
        .filter(|m| m.is_success())
        .find_map(|m| m.answer);

    let all_timeouts = values.is_empty()
        && !samples.is_empty()
        && samples.iter().all(Measurement::is_timeout);

    let (latency, status) = if values.is_empty() {
        (Latency::Unavailable, StatsStatus::Error)
    } else {
        let sum: f64 = values.iter().sum();
        let min_ms = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max_ms = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let latency = Latency::Available {
            min_ms,
            max_ms,
            mean_ms: sum / values.len() as f64,
        };
        (latency, StatsStatus::Ok)
    };

    EndpointStats {
        endpoint: endpoint.clone(),
        position: 0,
        success_count: values.len(),
        samples: values,
        latency,
        attempts: samples.len(),
        connectivity,
        status,
        all_timeouts,
        answer,
    }
}
