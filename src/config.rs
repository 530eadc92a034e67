use std::{fs, io, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What a return does with further requests for the same book once the book
/// has been reassigned
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateRequestPolicy {
    /// Discard them; they are treated as satisfied
    #[default]
    Drop,
    /// Keep them queued for the next return
    Retain,
}

/// Catalog configuration
///
/// Loaded from JSON; every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    /// Maximum number of events kept in the activity history; 0 disables it
    pub history_limit: usize,
    /// Handling of extra same-book requests during a backlog drain
    pub duplicate_requests: DuplicateRequestPolicy,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self { history_limit: 100, duplicate_requests: DuplicateRequestPolicy::Drop }
    }
}

/// Errors raised while loading a configuration file
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("failed to read config file: {0}")]
    Io(#[from] io::Error),
    /// The file is not valid configuration JSON
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

impl CatalogConfig {
    /// Parse configuration from a JSON string
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` on malformed JSON or unknown fields
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load configuration from a JSON file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be read and
    /// `ConfigError::Parse` if its contents are invalid
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        log::info!("Loading catalog config from {}", path.display());
        let contents = fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Load configuration from `path`, falling back to defaults on any error
    #[must_use]
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Using default catalog config: {e}");
                Self::default()
            }
        }
    }

    /// Serialize to pretty JSON
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` if serialization fails
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CatalogConfig::default();
        assert_eq!(config.history_limit, 100);
        assert_eq!(config.duplicate_requests, DuplicateRequestPolicy::Drop);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = CatalogConfig::from_json(r#"{ "duplicate_requests": "retain" }"#);
        assert!(matches!(
            config,
            Ok(CatalogConfig { history_limit: 100, duplicate_requests: DuplicateRequestPolicy::Retain })
        ));
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let result = CatalogConfig::from_json(r#"{ "history_limt": 5 }"#);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_json_round_trip() {
        let config =
            CatalogConfig { history_limit: 7, duplicate_requests: DuplicateRequestPolicy::Retain };
        let json = config.to_json().unwrap_or_default();
        assert!(matches!(CatalogConfig::from_json(&json), Ok(parsed) if parsed == config));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = CatalogConfig::load_or_default(Path::new("/nonexistent/catalog.json"));
        assert_eq!(config, CatalogConfig::default());
    }
}
