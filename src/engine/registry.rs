//! Endpoint registry.
//!
//! The registry is the ordered, read-only list of endpoints a run probes.
//! Registration order matters: it is the final tie-break when ranking.

use crate::engine::types::Endpoint;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Well-known public resolvers, used when no list is configured.
const DEFAULT_ENDPOINTS: &[(&str, &str, &str)] = &[
    ("Google DNS", "8.8.8.8", "Global"),
    ("Google DNS", "8.8.4.4", "Global"),
    ("Cloudflare DNS", "1.1.1.1", "Global"),
    ("Cloudflare DNS", "1.0.0.1", "Global"),
    ("OpenDNS", "208.67.222.222", "Global"),
    ("Quad9", "9.9.9.9", "Global"),
    ("AliDNS", "223.5.5.5", "China"),
    ("AliDNS", "223.6.6.6", "China"),
    ("DNSPod", "119.29.29.29", "China"),
    ("114 DNS", "114.114.114.114", "China"),
    ("Baidu DNS", "180.76.76.76", "China"),
    ("CNNIC DNS", "1.2.4.8", "China"),
];

/// Ordered collection of endpoints.
///
/// Serializes as `{"list": [...]}`, the on-disk endpoint list format.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Registry {
    #[serde(rename = "list")]
    endpoints: Vec<Endpoint>,
}

impl Registry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in list of public resolvers.
    #[must_use]
    pub fn builtin() -> Self {
        let endpoints = DEFAULT_ENDPOINTS
            .iter()
            .map(|(name, ip, region)| Endpoint::new(*name, *ip).with_region(*region))
            .collect();
        Self { endpoints }
    }

    /// Build a registry from endpoints, dropping repeated addresses.
    ///
    /// The first occurrence of an address wins, so the relative order of
    /// the survivors is preserved.
    #[must_use]
    pub fn from_endpoints(endpoints: impl IntoIterator<Item = Endpoint>) -> Self {
        let mut registry = Self::new();
        for endpoint in endpoints {
            if !registry.contains_address(&endpoint.address) {
                registry.endpoints.push(endpoint);
            }
        }
        registry
    }

    /// Append an endpoint.
    ///
    /// # Errors
    ///
    /// Returns a config error if an endpoint with the same address is
    /// already registered.
    pub fn register(&mut self, endpoint: Endpoint) -> Result<()> {
        if self.contains_address(&endpoint.address) {
            return Err(Error::config(format!(
                "Endpoint {} is already registered",
                endpoint.address
            )));
        }
        self.endpoints.push(endpoint);
        Ok(())
    }

    /// Whether an endpoint with `address` is registered.
    #[must_use]
    pub fn contains_address(&self, address: &str) -> bool {
        self.endpoints.iter().any(|e| e.address == address)
    }

    /// Endpoints in registration order.
    #[must_use]
    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    /// Get the number of endpoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Sub-registry of endpoints tagged with `region` (case-insensitive).
    #[must_use]
    pub fn filter_region(&self, region: &str) -> Self {
        self.filter(|e| {
            e.region
                .as_deref()
                .is_some_and(|r| r.eq_ignore_ascii_case(region))
        })
    }

    /// Sub-registry of endpoints matching `predicate`, order preserved.
    #[must_use]
    pub fn filter(&self, predicate: impl Fn(&Endpoint) -> bool) -> Self {
        Self {
            endpoints: self
                .endpoints
                .iter()
                .filter(|&e| predicate(e))
                .cloned()
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry() {
        let registry = Registry::builtin();
        assert_eq!(registry.len(), 12);
        assert_eq!(registry.endpoints()[0].address, "8.8.8.8");
        assert!(registry.endpoints().iter().all(|e| e.is_ipv4()));
        assert_eq!(registry.filter_region("china").len(), 6);
        assert_eq!(registry.filter_region("Global").len(), 6);
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let mut registry = Registry::new();
        assert!(registry.is_empty());
        registry.register(Endpoint::new("A", "1.1.1.1")).unwrap();
        registry.register(Endpoint::new("B", "8.8.8.8")).unwrap();
        assert!(registry.register(Endpoint::new("C", "1.1.1.1")).is_err());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_from_endpoints_keeps_first_and_order() {
        let registry = Registry::from_endpoints(vec![
            Endpoint::new("Z", "9.9.9.9"),
            Endpoint::new("A", "1.1.1.1"),
            Endpoint::new("Z again", "9.9.9.9"),
        ]);
        let names: Vec<_> = registry.endpoints().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Z", "A"]);
    }

    #[test]
    fn test_filter_ipv6() {
        let registry = Registry::from_endpoints(vec![
            Endpoint::new("v4", "1.1.1.1"),
            Endpoint::new("v6", "2606:4700:4700::1111"),
        ]);
        let v6 = registry.filter(Endpoint::is_ipv6);
        assert_eq!(v6.len(), 1);
        assert_eq!(v6.endpoints()[0].name, "v6");
    }

    #[test]
    fn test_registry_json_shape() {
        let json = r#"{"list":[{"name":"Quad9","IP":"9.9.9.9","region":"Global"}]}"#;
        let registry: Registry = serde_json::from_str(json).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(serde_json::to_string(&registry).unwrap(), json);
    }
}
