//! Concurrent prober.
//!
//! Fans a [`Probe`] out over every endpoint with bounded parallelism:
//! one task per endpoint, admitted through a counting semaphore. Each task
//! makes its attempts sequentially, summarizes them, and sends the finished
//! [`EndpointStats`] to a single collector task that owns the result
//! buffer. No other state is shared between tasks.
//!
//! Probe failures never abort a run; they are recorded as failed
//! measurements. Only a failure to admit tasks is reported as an error.

#![allow(clippy::missing_errors_doc)]

use crate::engine::aggregate::summarize;
use crate::engine::types::{Endpoint, EndpointStats};
use crate::error::{Error, Result};
use crate::probe::{Measurement, Probe, ProbeFailure};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};
use tokio::time::timeout;

/// Default number of attempts per endpoint.
pub const DEFAULT_ATTEMPTS: usize = 3;

/// Default number of endpoints probed at the same time.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Progress callback: `(completed, total, stats of the endpoint just finished)`.
pub type ProgressFn = dyn Fn(usize, usize, &EndpointStats) + Send + Sync;

/// Scheduling settings for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProberSettings {
    /// Sequential attempts per endpoint (>= 1)
    pub attempts: usize,
    /// Maximum endpoints probed simultaneously (>= 1)
    pub concurrency: usize,
    /// Upper bound on a single attempt; an attempt that exceeds it is
    /// recorded as a timeout
    pub attempt_timeout: Option<Duration>,
}

impl ProberSettings {
    /// Settings without a per-attempt timeout.
    #[must_use]
    pub fn new(attempts: usize, concurrency: usize) -> Self {
        Self {
            attempts,
            concurrency,
            attempt_timeout: None,
        }
    }

    /// Bound every attempt by `limit`.
    #[must_use]
    pub fn with_attempt_timeout(mut self, limit: Duration) -> Self {
        self.attempt_timeout = Some(limit);
        self
    }

    /// Check the settings before any work starts.
    pub fn validate(&self) -> Result<()> {
        if self.attempts == 0 {
            return Err(Error::config("attempts per endpoint must be at least 1"));
        }
        if self.concurrency == 0 {
            return Err(Error::config("concurrency must be at least 1"));
        }
        Ok(())
    }
}

impl Default for ProberSettings {
    fn default() -> Self {
        Self::new(DEFAULT_ATTEMPTS, DEFAULT_CONCURRENCY)
    }
}

/// Bounded-concurrency runner for a [`Probe`].
///
/// # Example
///
/// ```ignore
/// let probe = Arc::new(DnsQueryProbe::default());
/// let prober = Prober::new(probe, ProberSettings::new(3, 10))?;
/// let stats = prober.run_all(registry.endpoints()).await?;
/// let ranked = rank(stats);
/// ```
pub struct Prober {
    probe: Arc<dyn Probe>,
    settings: ProberSettings,
    progress: Option<Arc<ProgressFn>>,
}

impl Prober {
    /// Create a prober.
    ///
    /// # Errors
    ///
    /// Returns a config error if `attempts` or `concurrency` is zero.
    pub fn new(probe: Arc<dyn Probe>, settings: ProberSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            probe,
            settings,
            progress: None,
        })
    }

    /// Report every finished endpoint to `callback`.
    #[must_use]
    pub fn with_progress(
        mut self,
        callback: impl Fn(usize, usize, &EndpointStats) + Send + Sync + 'static,
    ) -> Self {
        self.progress = Some(Arc::new(callback));
        self
    }

    /// Probe every endpoint and wait for all of them to finish.
    ///
    /// Returns exactly one [`EndpointStats`] per input endpoint, stamped
    /// with its index in `endpoints`. The order of the returned vector is
    /// completion order; rank it before presenting it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ResourceExhausted`] if the admission gate cannot
    /// be created or closes during the run.
    pub async fn run_all(&self, endpoints: &[Endpoint]) -> Result<Vec<EndpointStats>> {
        if endpoints.is_empty() {
            return Ok(Vec::new());
        }

        let ProberSettings {
            attempts,
            concurrency,
            attempt_timeout,
        } = self.settings;
        let total = endpoints.len();
        let gate = admission_gate(concurrency)?;

        tracing::info!(
            "Probing {total} endpoints with {} ({attempts} attempts, concurrency {concurrency})",
            self.probe.name()
        );

        let (tx, rx) = mpsc::unbounded_channel();
        let collector = tokio::spawn(collect(rx, total, self.progress.clone()));

        let mut handles = Vec::with_capacity(total);
        for (position, endpoint) in endpoints.iter().enumerate() {
            let gate = Arc::clone(&gate);
            let probe = Arc::clone(&self.probe);
            let endpoint = endpoint.clone();
            let tx = tx.clone();

            handles.push(tokio::spawn(async move {
                // Released on drop, including when the probe panics
                let _permit = gate
                    .acquire_owned()
                    .await
                    .map_err(|_| Error::resource_exhausted("admission gate closed"))?;

                let samples =
                    probe_endpoint(probe.as_ref(), &endpoint, attempts, attempt_timeout).await;
                let stats = summarize(&endpoint, &samples).with_position(position);
                tracing::debug!(
                    "{endpoint}: {}/{} ok, {}",
                    stats.success_count,
                    stats.attempts,
                    stats.outcome()
                );

                // The collector only stops once every sender is gone
                let _ = tx.send(stats);
                Ok::<(), Error>(())
            }));
        }
        drop(tx);

        let outcomes = futures::future::join_all(handles).await;

        let mut results = match collector.await {
            Ok(results) => results,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => return Err(Error::resource_exhausted(format!("result collector: {e}"))),
        };

        for (position, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                Ok(Ok(())) => {}
                Ok(Err(e)) => return Err(e),
                Err(e) => {
                    let endpoint = &endpoints[position];
                    tracing::warn!("Probe task for {endpoint} did not finish: {e}");
                    let failed = Measurement::failure(ProbeFailure::Query(format!(
                        "probe task did not finish: {e}"
                    )));
                    let samples = vec![failed; attempts];
                    results.push(summarize(endpoint, &samples).with_position(position));
                }
            }
        }

        tracing::info!(
            "Probed {} endpoints, {} available",
            results.len(),
            results.iter().filter(|s| s.is_available()).count()
        );

        Ok(results)
    }
}

/// Probe `endpoints` without a per-attempt timeout.
///
/// Convenience wrapper over [`Prober::run_all`].
pub async fn run_all(
    probe: Arc<dyn Probe>,
    endpoints: &[Endpoint],
    attempts: usize,
    concurrency: usize,
) -> Result<Vec<EndpointStats>> {
    Prober::new(probe, ProberSettings::new(attempts, concurrency))?
        .run_all(endpoints)
        .await
}

/// Counting admission gate with `capacity` permits.
fn admission_gate(capacity: usize) -> Result<Arc<Semaphore>> {
    if capacity > Semaphore::MAX_PERMITS {
        return Err(Error::resource_exhausted(format!(
            "concurrency {capacity} exceeds the admission gate limit of {}",
            Semaphore::MAX_PERMITS
        )));
    }
    Ok(Arc::new(Semaphore::new(capacity)))
}

/// Make `attempts` sequential attempts against one endpoint.
async fn probe_endpoint(
    probe: &dyn Probe,
    endpoint: &Endpoint,
    attempts: usize,
    attempt_timeout: Option<Duration>,
) -> Vec<Measurement> {
    let mut samples = Vec::with_capacity(attempts);

    for attempt in 1..=attempts {
        let measurement = match attempt_timeout {
            Some(limit) => timeout(limit, probe.probe(endpoint))
                .await
                .unwrap_or_else(|_| Measurement::timeout()),
            None => probe.probe(endpoint).await,
        };

        if let Err(failure) = &measurement.outcome {
            tracing::debug!("{endpoint}: attempt {attempt}/{attempts} failed: {failure}");
        }
        samples.push(measurement);
    }

    samples
}

/// Own the result buffer until every endpoint task has hung up.
async fn collect(
    mut rx: mpsc::UnboundedReceiver<EndpointStats>,
    total: usize,
    progress: Option<Arc<ProgressFn>>,
) -> Vec<EndpointStats> {
    let mut results = Vec::with_capacity(total);
    while let Some(stats) = rx.recv().await {
        if let Some(callback) = &progress {
            callback(results.len() + 1, total, &stats);
        }
        results.push(stats);
    }
    results
}
