//! Per-hierarchy configuration.
//!
//! ```rust
//! use talipot_core::{Graph, GraphConfig};
//!
//! # fn main() -> talipot_core::Result<()> {
//! let config = GraphConfig::from_json(r#"{ "max_checkpoints": 16 }"#)?;
//! let graph = Graph::with_config(config);
//! assert_eq!(graph.config().max_notification_depth, 200);
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Settings shared by every graph of a hierarchy. Missing fields take their
/// default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Checkpoints kept by `push`; beyond it the oldest one is committed.
    /// `None` keeps every checkpoint.
    pub max_checkpoints: Option<usize>,

    /// Nesting limit of events emitted from inside callbacks. Deeper events
    /// are dropped with an error log.
    pub max_notification_depth: usize,

    /// Drop an explicit value as soon as it equals the default.
    pub prune_default_overrides: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self { max_checkpoints: None, max_notification_depth: 200, prune_default_overrides: true }
    }
}

impl GraphConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        let config: GraphConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_notification_depth == 0 {
            return Err(Error::Config("max_notification_depth must be at least 1".into()));
        }
        if self.max_checkpoints == Some(0) {
            return Err(Error::Config("max_checkpoints must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config = GraphConfig::from_json(r#"{ "prune_default_overrides": false }"#).unwrap();
        assert_eq!(
            config,
            GraphConfig { max_checkpoints: None, max_notification_depth: 200, prune_default_overrides: false }
        );
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(matches!(GraphConfig::from_json(r#"{ "max_notification_depth": 0 }"#), Err(Error::Config(_))));
        assert!(matches!(GraphConfig::from_json(r#"{ "max_checkpoints": 0 }"#), Err(Error::Config(_))));
        assert!(matches!(GraphConfig::from_json("{"), Err(Error::Json(_))));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(GraphConfig::from_file("/nonexistent/talipot.json"), Err(Error::Io(_))));
    }
}
