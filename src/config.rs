//! Manager configuration
//!
//! Every field has a default, so an empty JSON object is a valid config.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Initial capacity of the order store
    pub order_capacity: usize,

    /// Remove a price level once its last order leaves. When off, empty
    /// levels stay in the book and every query skips them.
    pub prune_empty_levels: bool,

    /// Levels per side in `default_snapshot`
    pub snapshot_depth: usize,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            order_capacity: 1024,
            prune_empty_levels: true,
            snapshot_depth: 10,
        }
    }
}

impl ManagerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_uses_defaults() {
        let config = ManagerConfig::from_json_str("{}").unwrap();
        assert_eq!(config, ManagerConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config =
            ManagerConfig::from_json_str(r#"{"prune_empty_levels": false, "snapshot_depth": 3}"#)
                .unwrap();

        assert!(!config.prune_empty_levels);
        assert_eq!(config.snapshot_depth, 3);
        assert_eq!(config.order_capacity, 1024);
    }

    #[test]
    fn test_malformed_config() {
        let err = ManagerConfig::from_json_str(r#"{"snapshot_depth": "deep"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = ManagerConfig::from_json_file("/nonexistent/book.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
