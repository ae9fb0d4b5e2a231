//! Application configuration.
//!
//! The configuration is loaded from
//! `$XDG_CONFIG_HOME/hyprsplit/config.json`.  The top-level schema uses a
//! `"workspaces"` key so the file can be extended with additional
//! sections later without breaking backward compatibility.
//!
//! # Example
//!
//! ```json
//! {
//!   "workspaces": {
//!     "count_per_monitor": 10,
//!     "keep_focused": false
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration.
///
/// Every field is optional; a minimal `{}` file is valid and all
/// sections fall back to their compiled-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Workspace namespace settings.
    #[serde(default)]
    pub workspaces: WorkspaceConfig,
}

/// Workspace namespace settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Normal workspaces per monitor.
    ///
    /// Documents the namespace capacity; the id arithmetic in
    /// [`codec`](crate::codec) is compiled in, so values other than the
    /// default are not honored yet.
    pub count_per_monitor: u32,

    /// Keep the previously focused monitor focused after a workspace
    /// change.
    ///
    /// Accepted and parsed but currently a no-op; reserved for a future
    /// focus-retention behavior.
    pub keep_focused: bool,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            count_per_monitor: crate::codec::WORKSPACES_PER_MONITOR,
            keep_focused: false,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_full_config() {
        let json = r#"{
            "workspaces": {
                "count_per_monitor": 10,
                "keep_focused": true
            }
        }"#;
        let cfg: Config = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.workspaces.count_per_monitor, 10);
        assert!(cfg.workspaces.keep_focused);
    }

    #[test]
    fn deserialize_empty_uses_defaults() {
        let cfg: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(
            cfg.workspaces.count_per_monitor,
            crate::codec::WORKSPACES_PER_MONITOR
        );
        assert!(!cfg.workspaces.keep_focused);
    }

    #[test]
    fn deserialize_partial_section() {
        let json = r#"{ "workspaces": { "keep_focused": true } }"#;
        let cfg: Config = serde_json::from_str(json).unwrap();
        assert!(cfg.workspaces.keep_focused);
        assert_eq!(
            cfg.workspaces.count_per_monitor,
            WorkspaceConfig::default().count_per_monitor
        );
    }

    #[test]
    fn unknown_top_level_keys_ignored() {
        let json = r#"{ "workspaces": {}, "future_section": { "key": 42 } }"#;
        // Unknown keys are silently ignored.
        let _cfg: Config = serde_json::from_str(json).unwrap();
    }
}
