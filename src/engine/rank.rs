//! Ranking of aggregated endpoint statistics.
//!
//! Ordering rules, in priority order:
//! 1. available endpoints before unavailable ones
//! 2. ascending mean latency
//! 3. registry position
//!
//! The sort is also stable, so stats that tie on all three keep their
//! input order.

use crate::engine::types::EndpointStats;
use std::cmp::Ordering;

/// Compare two stats by ranking order.
#[must_use]
pub fn compare(a: &EndpointStats, b: &EndpointStats) -> Ordering {
    match (a.latency.mean(), b.latency.mean()) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.position.cmp(&b.position))
}

/// Sort a run's stats into ranking order.
///
/// Unavailable endpoints are kept, at the tail.
#[must_use]
pub fn rank(mut stats: Vec<EndpointStats>) -> Vec<EndpointStats> {
    stats.sort_by(compare);
    stats
}

/// Select the `k` best available endpoints from a ranked list.
///
/// Endpoints without a single successful sample are never recommended,
/// even when `k` exceeds the number of healthy ones. An empty result means
/// there is no usable endpoint.
#[must_use]
pub fn top_k(ranked: &[EndpointStats], k: usize) -> Vec<EndpointStats> {
    ranked
        .iter()
        .filter(|s| s.success_count > 0)
        .take(k)
        .cloned()
        .collect()
}

/// The single best available endpoint, if any.
#[must_use]
pub fn best(ranked: &[EndpointStats]) -> Option<&EndpointStats> {
    ranked.iter().find(|s| s.success_count > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::aggregate::summarize;
    use crate::engine::types::Endpoint;
    use crate::probe::Measurement;

    fn stats_with(name: &str, position: usize, samples: &[Option<f64>]) -> EndpointStats {
        let measurements: Vec<Measurement> = samples
            .iter()
            .map(|s| match s {
                Some(ms) => Measurement::success(*ms, true),
                None => Measurement::timeout(),
            })
            .collect();
        summarize(&Endpoint::new(name, "192.0.2.1"), &measurements).with_position(position)
    }

    fn names(stats: &[EndpointStats]) -> Vec<&str> {
        stats.iter().map(|s| s.endpoint.name.as_str()).collect()
    }

    #[test]
    fn test_rank_three_endpoint_scenario() {
        let e1 = stats_with("E1", 0, &[Some(9.0), Some(10.0), Some(11.0)]);
        let e2 = stats_with("E2", 1, &[None, None, None]);
        let e3 = stats_with("E3", 2, &[Some(4.0), None, Some(6.0)]);

        let ranked = rank(vec![e1, e2, e3]);
        assert_eq!(names(&ranked), vec!["E3", "E1", "E2"]);
        assert_eq!(names(&top_k(&ranked, 2)), vec!["E3", "E1"]);
    }

    #[test]
    fn test_unavailable_always_last() {
        let input = vec![
            stats_with("down-a", 0, &[None]),
            stats_with("slow", 1, &[Some(900.0)]),
            stats_with("down-b", 2, &[None]),
            stats_with("fast", 3, &[Some(1.0)]),
        ];
        let ranked = rank(input);
        assert_eq!(names(&ranked), vec!["fast", "slow", "down-a", "down-b"]);
    }

    #[test]
    fn test_ties_follow_registry_order() {
        // Completion order differs from registry order
        let input = vec![
            stats_with("third", 2, &[Some(5.0)]),
            stats_with("first", 0, &[Some(5.0)]),
            stats_with("second", 1, &[Some(5.0)]),
        ];
        let ranked = rank(input);
        assert_eq!(names(&ranked), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_top_k_never_recommends_unavailable() {
        let ranked = rank(vec![
            stats_with("up", 0, &[Some(3.0)]),
            stats_with("down", 1, &[None, None]),
        ]);
        let top = top_k(&ranked, 5);
        assert_eq!(names(&top), vec!["up"]);
        assert!(top.iter().all(|s| s.success_count > 0));
    }

    #[test]
    fn test_top_k_zero_and_all_down() {
        let ranked = rank(vec![stats_with("a", 0, &[Some(1.0)])]);
        assert!(top_k(&ranked, 0).is_empty());

        let ranked = rank(vec![
            stats_with("a", 0, &[None]),
            stats_with("b", 1, &[None]),
        ]);
        assert!(top_k(&ranked, 3).is_empty());
        assert!(best(&ranked).is_none());
    }

    #[test]
    fn test_empty_input() {
        let ranked = rank(Vec::new());
        assert!(ranked.is_empty());
        assert!(top_k(&ranked, 3).is_empty());
    }

    #[test]
    fn test_best() {
        let ranked = rank(vec![
            stats_with("b", 1, &[Some(8.0)]),
            stats_with("a", 0, &[Some(2.0)]),
        ]);
        assert_eq!(best(&ranked).map(|s| s.endpoint.name.as_str()), Some("a"));
    }

    #[test]
    fn test_garbage_sample_is_never_recommended() {
        let garbage = Measurement {
            outcome: Ok(-f64::NAN),
            connectivity: true,
            answer: None,
        };
        let nan = summarize(&Endpoint::new("nan", "192.0.2.9"), &[garbage]).with_position(0);
        let fast = stats_with("fast", 1, &[Some(1.0)]);

        let ranked = rank(vec![nan, fast]);
        assert_eq!(names(&ranked), vec!["fast", "nan"]);
        assert_eq!(names(&top_k(&ranked, 1)), vec!["fast"]);
    }
}
