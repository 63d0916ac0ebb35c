//! End-to-end tests of the probing pipeline with deterministic probes.

use async_trait::async_trait;
use dnsrank::cli::OutputFormat;
use dnsrank::report::{render, Report};
use dnsrank::{
    rank, top_k, ConfigLoader, Endpoint, Measurement, Probe, ProbeFailure, Prober,
    ProberSettings, Registry, RunConfig, StatsStatus,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Fixed latency per address; unknown addresses fail. Optionally delays
/// each answer so completion order can be controlled.
struct TableProbe {
    latency: HashMap<String, f64>,
    delay: HashMap<String, Duration>,
}

impl TableProbe {
    fn new(rows: &[(&str, f64)]) -> Self {
        Self {
            latency: rows.iter().map(|(a, ms)| ((*a).to_string(), *ms)).collect(),
            delay: HashMap::new(),
        }
    }

    fn with_delay(mut self, address: &str, delay: Duration) -> Self {
        self.delay.insert(address.to_string(), delay);
        self
    }
}

#[async_trait]
impl Probe for TableProbe {
    async fn probe(&self, endpoint: &Endpoint) -> Measurement {
        if let Some(delay) = self.delay.get(&endpoint.address) {
            tokio::time::sleep(*delay).await;
        }
        match self.latency.get(&endpoint.address) {
            Some(ms) => Measurement::success(*ms, true),
            None => Measurement::failure(ProbeFailure::Unreachable("no route".into())),
        }
    }

    fn name(&self) -> &str {
        "table"
    }
}

#[tokio::test]
async fn test_registry_to_recommendation() {
    let registry = ConfigLoader::from_args(vec![
        "192.0.2.1#Slow#Global".into(),
        "192.0.2.2#Dead#Global".into(),
        "192.0.2.3#Fast#China".into(),
        "192.0.2.4#Medium#China".into(),
    ])
    .unwrap();

    let probe = Arc::new(TableProbe::new(&[
        ("192.0.2.1", 80.0),
        ("192.0.2.3", 5.0),
        ("192.0.2.4", 20.0),
    ]));
    let config = RunConfig {
        attempts: 2,
        concurrency: 2,
        top_k: 5,
        ..RunConfig::default()
    };

    let prober = Prober::new(probe, config.prober_settings()).unwrap();
    let stats = prober.run_all(registry.endpoints()).await.unwrap();
    assert_eq!(stats.len(), registry.len());

    let ranked = rank(stats);
    let names: Vec<_> = ranked.iter().map(|s| s.endpoint.name.as_str()).collect();
    assert_eq!(names, vec!["Fast", "Medium", "Slow", "Dead"]);
    assert_eq!(ranked[3].status, StatsStatus::Error);
    assert_eq!(ranked[3].attempts, 2);

    // k larger than the healthy set never pulls in the dead endpoint
    let recommended = top_k(&ranked, config.top_k);
    assert_eq!(recommended.len(), 3);
    assert!(recommended.iter().all(|s| s.success_count > 0));

    let report = Report::new(ranked, recommended);
    assert_eq!(report.summary.total, 4);
    assert_eq!(report.summary.error, 1);

    let mut buf = Vec::new();
    render(&mut buf, &report, OutputFormat::Csv).unwrap();
    let csv = String::from_utf8(buf).unwrap();
    assert!(csv.lines().nth(1).unwrap().starts_with("1,Fast,192.0.2.3,China,5.00"));
}

#[tokio::test]
async fn test_equal_means_keep_registry_order_despite_completion_order() {
    let endpoints: Vec<Endpoint> = (1..=4)
        .map(|i| Endpoint::new(format!("E{i}"), format!("192.0.2.{i}")))
        .collect();

    // Every endpoint reports the same latency, but the first ones finish last
    let probe = TableProbe::new(&[
        ("192.0.2.1", 7.0),
        ("192.0.2.2", 7.0),
        ("192.0.2.3", 7.0),
        ("192.0.2.4", 7.0),
    ])
    .with_delay("192.0.2.1", Duration::from_millis(60))
    .with_delay("192.0.2.2", Duration::from_millis(40))
    .with_delay("192.0.2.3", Duration::from_millis(20));

    let prober = Prober::new(Arc::new(probe), ProberSettings::new(1, 4)).unwrap();
    let stats = prober.run_all(&endpoints).await.unwrap();

    let ranked = rank(stats);
    let names: Vec<_> = ranked.iter().map(|s| s.endpoint.name.as_str()).collect();
    assert_eq!(names, vec!["E1", "E2", "E3", "E4"]);
}

#[tokio::test]
async fn test_all_endpoints_down() {
    let registry = Registry::from_endpoints(vec![
        Endpoint::new("A", "198.51.100.1"),
        Endpoint::new("B", "198.51.100.2"),
    ]);
    let prober = Prober::new(Arc::new(TableProbe::new(&[])), ProberSettings::new(3, 1)).unwrap();

    let ranked = rank(prober.run_all(registry.endpoints()).await.unwrap());
    assert_eq!(ranked.len(), 2);
    assert!(ranked.iter().all(|s| s.status == StatsStatus::Error));
    assert!(top_k(&ranked, 3).is_empty());

    // Failed endpoints stay visible in the full ranking
    let report = Report::new(ranked, Vec::new());
    let mut buf = Vec::new();
    render(&mut buf, &report, OutputFormat::Table).unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert!(text.contains("198.51.100.1"));
    assert!(text.contains("No usable endpoint found"));
}

#[tokio::test]
async fn test_invalid_settings_fail_before_probing() {
    let probe: Arc<dyn Probe> = Arc::new(TableProbe::new(&[]));
    let err = dnsrank::run_all(probe, &[Endpoint::new("A", "192.0.2.1")], 0, 1)
        .await
        .unwrap_err();
    assert!(matches!(err, dnsrank::Error::Config(_)));
}
