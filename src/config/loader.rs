//! Endpoint list loader.
//!
//! This module loads endpoint registries from JSON files, command-line
//! arguments, the user config directory, or the built-in defaults.

use crate::engine::registry::Registry;
use crate::engine::types::Endpoint;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// File name of the endpoint list inside the config directory.
pub const ENDPOINTS_FILE: &str = "endpoints.json";

/// Endpoint list loader.
///
/// Provides various methods to load and merge endpoint lists
/// from different sources.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load an endpoint list from a JSON file.
    ///
    /// The file has the shape `{"list": [{"name": .., "IP": .., "region": ..}]}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let registry = ConfigLoader::load_from_file("endpoints.json")?;
    /// for endpoint in registry.endpoints() {
    ///     println!("{}: {}", endpoint.name, endpoint.address);
    /// }
    /// ```
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Registry> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let registry: Registry = serde_json::from_str(&content)?;
        // Re-collect to drop repeated addresses
        Ok(Registry::from_endpoints(registry.endpoints().iter().cloned()))
    }

    /// Load the endpoint list from the default locations.
    ///
    /// Searches in the following order:
    /// 1. `$CONFIG_DIR/dnsrank/endpoints.json`
    /// 2. `endpoints.json` in current directory
    ///
    /// # Errors
    ///
    /// Returns an error if no default file is found or it cannot be parsed.
    pub fn load_default() -> Result<Registry> {
        let user_path = Self::config_dir().join(ENDPOINTS_FILE);
        if user_path.exists() {
            return Self::load_from_file(user_path);
        }
        if Path::new(ENDPOINTS_FILE).exists() {
            return Self::load_from_file(ENDPOINTS_FILE);
        }
        Err(Error::config(format!(
            "No endpoint list found at {}",
            user_path.display()
        )))
    }

    /// Load the default endpoint list, or fall back to the built-in one.
    ///
    /// A list that exists but cannot be parsed is still an error.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured list is unreadable or malformed.
    pub fn load_or_builtin() -> Result<Registry> {
        match Self::load_default() {
            Ok(registry) => Ok(registry),
            Err(Error::Config(reason)) => {
                tracing::debug!("{reason}; using built-in endpoints");
                Ok(Registry::builtin())
            }
            Err(e) => Err(e),
        }
    }

    /// Get the config directory path.
    #[must_use]
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dnsrank")
    }

    /// Merge multiple endpoint lists into one.
    ///
    /// Lists are concatenated in order; a repeated address keeps its
    /// first occurrence so registry order stays meaningful.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let merged = ConfigLoader::merge(vec![Registry::builtin(), extra]);
    /// println!("Total endpoints: {}", merged.len());
    /// ```
    #[must_use]
    pub fn merge(lists: Vec<Registry>) -> Registry {
        Registry::from_endpoints(
            lists
                .into_iter()
                .flat_map(|list| list.endpoints().to_vec()),
        )
    }

    /// Create an endpoint list from command-line arguments.
    ///
    /// Each argument has the form `IP[#Name[#Region]]`; the name defaults
    /// to the address.
    ///
    /// # Errors
    ///
    /// Returns an error if any IP address is invalid.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let args = vec!["8.8.8.8#Google#Global".to_string(), "1.1.1.1".to_string()];
    /// let registry = ConfigLoader::from_args(args)?;
    /// ```
    pub fn from_args(args: Vec<String>) -> Result<Registry> {
        let mut endpoints = Vec::with_capacity(args.len());
        for arg in args {
            let mut parts = arg.splitn(3, '#').map(str::trim);
            let ip = parts.next().unwrap_or_default().to_string();

            if ip.parse::<std::net::IpAddr>().is_err() {
                return Err(Error::parse(format!("Invalid IP address: {ip}")));
            }

            let name = parts
                .next()
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| ip.clone());
            let mut endpoint = Endpoint::new(name, ip);
            if let Some(region) = parts.next().filter(|s| !s.is_empty()) {
                endpoint = endpoint.with_region(region);
            }
            endpoints.push(endpoint);
        }
        Ok(Registry::from_endpoints(endpoints))
    }

    /// Write an endpoint list as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save<P: AsRef<Path>>(registry: &Registry, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(registry)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_args() {
        let args = vec![
            "8.8.8.8#Google#Global".to_string(),
            "1.1.1.1#Cloudflare".to_string(),
            "9.9.9.9".to_string(),
        ];
        let registry = ConfigLoader::from_args(args).unwrap();
        let endpoints = registry.endpoints();
        assert_eq!(endpoints.len(), 3);
        assert_eq!(endpoints[0].name, "Google");
        assert_eq!(endpoints[0].region.as_deref(), Some("Global"));
        assert_eq!(endpoints[1].name, "Cloudflare");
        assert!(endpoints[1].region.is_none());
        assert_eq!(endpoints[2].name, "9.9.9.9");
    }

    #[test]
    fn test_config_from_args_invalid_ip() {
        let args = vec!["invalid_ip#Test".to_string()];
        let result = ConfigLoader::from_args(args);
        assert!(matches!(result, Err(Error::Parse(_))));
    }

    #[test]
    fn test_merge_keeps_first_occurrence() {
        let a = ConfigLoader::from_args(vec!["1.1.1.1#A".into(), "8.8.8.8#B".into()]).unwrap();
        let b = ConfigLoader::from_args(vec!["8.8.8.8#Dup".into(), "9.9.9.9#C".into()]).unwrap();
        let merged = ConfigLoader::merge(vec![a, b]);
        let names: Vec<_> = merged.endpoints().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(ENDPOINTS_FILE);

        let registry = Registry::builtin();
        ConfigLoader::save(&registry, &path).unwrap();
        let loaded = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(loaded, registry);
    }

    #[test]
    fn test_load_file_drops_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("list.json");
        std::fs::write(
            &path,
            r#"{"list":[{"name":"A","IP":"1.1.1.1"},{"name":"B","IP":"1.1.1.1"}]}"#,
        )
        .unwrap();
        let loaded = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.endpoints()[0].name, "A");
    }

    #[test]
    fn test_load_missing_or_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ConfigLoader::load_from_file(dir.path().join("missing.json")),
            Err(Error::Io(_))
        ));

        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            ConfigLoader::load_from_file(&path),
            Err(Error::Json(_))
        ));
    }
}
