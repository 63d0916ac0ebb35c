//! Run settings.
//!
//! The scalar knobs of a probing run, loadable from a JSON file and
//! overridable from the command line.

use crate::engine::prober::{ProberSettings, DEFAULT_ATTEMPTS, DEFAULT_CONCURRENCY};
use crate::error::{Error, Result};
use crate::probe::dns::DEFAULT_TEST_DOMAIN;
use crate::probe::ProbeKind;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// File name of the run settings inside the config directory.
pub const SETTINGS_FILE: &str = "config.json";

/// Default number of recommended endpoints.
pub const DEFAULT_TOP_K: usize = 3;

/// Default per-attempt timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 2000;

/// Settings of one probing run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Probe attempts per endpoint (>= 1)
    pub attempts: usize,
    /// Endpoints probed simultaneously (>= 1)
    pub concurrency: usize,
    /// Size of the recommended subset
    pub top_k: usize,
    /// Per-attempt timeout in milliseconds; 0 disables it
    pub timeout_ms: u64,
    /// Domain resolved by the DNS probe
    pub domain: String,
    /// Probe used for the run
    pub probe: ProbeKind,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            concurrency: DEFAULT_CONCURRENCY,
            top_k: DEFAULT_TOP_K,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            domain: DEFAULT_TEST_DOMAIN.to_string(),
            probe: ProbeKind::default(),
        }
    }
}

impl RunConfig {
    /// Load settings from a JSON file; missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or the
    /// settings are invalid.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `$CONFIG_DIR/dnsrank/config.json`, or defaults if it is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but is invalid.
    pub fn load_default() -> Result<Self> {
        let path = crate::config::ConfigLoader::config_dir().join(SETTINGS_FILE);
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Reject settings the prober cannot run with.
    ///
    /// # Errors
    ///
    /// Returns a config error naming the offending field.
    pub fn validate(&self) -> Result<()> {
        self.prober_settings().validate()?;
        if self.domain.trim().is_empty() {
            return Err(Error::config("domain must not be empty"));
        }
        Ok(())
    }

    /// Per-attempt timeout, if enabled.
    #[must_use]
    pub fn attempt_timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }

    /// Scheduling settings for the prober.
    #[must_use]
    pub fn prober_settings(&self) -> ProberSettings {
        let settings = ProberSettings::new(self.attempts, self.concurrency);
        match self.attempt_timeout() {
            Some(limit) => settings.with_attempt_timeout(limit),
            None => settings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RunConfig::default();
        assert_eq!(config.attempts, 3);
        assert_eq!(config.concurrency, 10);
        assert_eq!(config.top_k, 3);
        assert_eq!(config.probe, ProbeKind::Dns);
        assert!(config.validate().is_ok());
        assert_eq!(
            config.prober_settings().attempt_timeout,
            Some(Duration::from_millis(2000))
        );
    }

    #[test]
    fn test_zero_timeout_disables_it() {
        let config = RunConfig {
            timeout_ms: 0,
            ..RunConfig::default()
        };
        assert!(config.attempt_timeout().is_none());
        assert!(config.prober_settings().attempt_timeout.is_none());
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let config = RunConfig {
            concurrency: 0,
            ..RunConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let config = RunConfig {
            attempts: 0,
            ..RunConfig::default()
        };
        assert!(config.validate().is_err());

        let config = RunConfig {
            domain: " ".into(),
            ..RunConfig::default()
        };
        assert!(config.validate().is_err());

        // top_k of zero is allowed
        let config = RunConfig {
            top_k: 0,
            ..RunConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        std::fs::write(&path, r#"{"concurrency": 4, "probe": "icmp"}"#).unwrap();

        let config = RunConfig::load_from_file(&path).unwrap();
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.probe, ProbeKind::Icmp);
        assert_eq!(config.attempts, 3);
    }

    #[test]
    fn test_load_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        std::fs::write(&path, r#"{"attempts": 0}"#).unwrap();
        assert!(RunConfig::load_from_file(&path).is_err());
    }
}
