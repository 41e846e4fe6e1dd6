//! Version registry: which partition names are current.
//!
//! Everything not listed here is stale and collectible. Activation asks
//! the registry which of the store's existing partitions to delete.

use crate::config::AppConfig;

/// The set of partition names considered current.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionRegistry {
    static_partition: String,
    data_partition: String,
}

impl VersionRegistry {
    pub fn new(static_partition: impl Into<String>, data_partition: impl Into<String>) -> Self {
        Self { static_partition: static_partition.into(), data_partition: data_partition.into() }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.static_partition.clone(), config.data_partition.clone())
    }

    pub fn static_partition(&self) -> &str {
        &self.static_partition
    }

    pub fn data_partition(&self) -> &str {
        &self.data_partition
    }

    /// Whether `name` is one of the current partitions.
    pub fn is_current(&self, name: &str) -> bool {
        name == self.static_partition || name == self.data_partition
    }

    /// The subset of `existing` that is stale and should be deleted.
    pub fn stale<'a>(&self, existing: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        existing
            .into_iter()
            .filter(|name| !self.is_current(name))
            .map(|name| name.to_string())
            .collect()
    }

    /// Extract the semantic version embedded in a partition name
    /// (the suffix after the last `-v`), if present.
    pub fn version_of(name: &str) -> Option<&str> {
        let idx = name.rfind("-v")?;
        let version = &name[idx + 2..];
        if version.is_empty() { None } else { Some(version) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> VersionRegistry {
        VersionRegistry::new("shelter-static-v2.0.0", "shelter-data-v2.0.0")
    }

    #[test]
    fn test_is_current() {
        let reg = registry();
        assert!(reg.is_current("shelter-static-v2.0.0"));
        assert!(reg.is_current("shelter-data-v2.0.0"));
        assert!(!reg.is_current("shelter-static-v1.0.0"));
    }

    #[test]
    fn test_stale_selects_only_superseded() {
        let reg = registry();
        let existing = vec![
            "shelter-static-v1.0.0",
            "shelter-static-v2.0.0",
            "shelter-data-v2.0.0",
            "shelter-data-v1.9.3",
        ];
        let stale = reg.stale(existing);
        assert_eq!(stale, vec!["shelter-static-v1.0.0".to_string(), "shelter-data-v1.9.3".to_string()]);
    }

    #[test]
    fn test_stale_empty_when_all_current() {
        let reg = registry();
        let stale = reg.stale(vec!["shelter-static-v2.0.0", "shelter-data-v2.0.0"]);
        assert!(stale.is_empty());
    }

    #[test]
    fn test_version_of() {
        assert_eq!(VersionRegistry::version_of("shelter-static-v2.0.0"), Some("2.0.0"));
        assert_eq!(VersionRegistry::version_of("tool-center-v1.0.0"), Some("1.0.0"));
        assert_eq!(VersionRegistry::version_of("unversioned"), None);
        assert_eq!(VersionRegistry::version_of("trailing-v"), None);
    }

    #[test]
    fn test_from_config() {
        let config = AppConfig::default();
        let reg = VersionRegistry::from_config(&config);
        assert_eq!(reg.static_partition(), config.static_partition);
        assert_eq!(reg.data_partition(), config.data_partition);
    }
}
