//! Configuration types for the parley widget.
//!
//! A single [`WidgetConfig`] replaces the per-revision constants of earlier
//! widgets: backend address, request deadline, and which rendering features
//! are switched on.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::storage::atomic_write;

/// File name of the configuration inside the data directory.
pub const CONFIG_FILE: &str = "config.json";

/// Smallest accepted request deadline.
pub const MIN_TIMEOUT_MS: u64 = 1_000;

/// Largest accepted request deadline.
pub const MAX_TIMEOUT_MS: u64 = 120_000;

/// Widget configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct WidgetConfig {
    /// Base URL of the chat backend (without the `/chat` suffix).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Deadline for a single send, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Render bot replies as Markdown.
    #[serde(default = "default_true")]
    pub enable_markdown: bool,

    /// Render the thinking log before bot replies.
    #[serde(default = "default_true")]
    pub enable_thinking_log: bool,

    /// Allow switching between light and dark themes.
    #[serde(default = "default_true")]
    pub enable_theme_toggle: bool,
}

fn default_base_url() -> String {
    "https://gemini-search-chatbot.onrender.com".into()
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_true() -> bool {
    true
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            enable_markdown: true,
            enable_thinking_log: true,
            enable_theme_toggle: true,
        }
    }
}

impl WidgetConfig {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        let config: Self = serde_json::from_str(&content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file is missing.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::Io)?;
        }
        atomic_write(path, content.as_bytes()).map_err(ConfigError::Io)
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_TIMEOUT_MS..=MAX_TIMEOUT_MS).contains(&self.timeout_ms) {
            return Err(ConfigError::Invalid(format!(
                "timeout_ms must be between {MIN_TIMEOUT_MS} and {MAX_TIMEOUT_MS}, got {}",
                self.timeout_ms
            )));
        }

        let url = url::Url::parse(&self.base_url)
            .map_err(|e| ConfigError::Invalid(format!("base_url {:?}: {e}", self.base_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(format!(
                "base_url must use http or https, got {}",
                url.scheme()
            )));
        }

        Ok(())
    }

    /// Request deadline as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Errors that can occur when working with configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading or writing config.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing config JSON.
    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),

    /// Error serializing config to JSON.
    #[error("Serialize error: {0}")]
    Serialize(#[source] serde_json::Error),

    /// A value is out of range.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = WidgetConfig::default();
        assert_eq!(config.timeout_ms, 30_000);
        assert!(config.enable_markdown);
        assert!(config.enable_thinking_log);
        assert!(config.enable_theme_toggle);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: WidgetConfig =
            serde_json::from_str(r#"{"base_url": "http://localhost:8080", "enable_markdown": false}"#)
                .unwrap();
        assert_eq!(config.base_url, "http://localhost:8080");
        assert!(!config.enable_markdown);
        assert_eq!(config.timeout_ms, 30_000);
        assert!(config.enable_thinking_log);
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);

        let config = WidgetConfig {
            timeout_ms: 10_000,
            ..WidgetConfig::default()
        };
        config.save(&path).unwrap();

        let loaded = WidgetConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = TempDir::new().unwrap();
        let config = WidgetConfig::load_or_default(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config, WidgetConfig::default());
    }

    #[test]
    fn test_timeout_out_of_range() {
        let config = WidgetConfig {
            timeout_ms: 10,
            ..WidgetConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_base_url_scheme_checked() {
        let config = WidgetConfig {
            base_url: "ftp://example.com".into(),
            ..WidgetConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = WidgetConfig {
            base_url: "not a url".into(),
            ..WidgetConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_timeout_duration() {
        let config = WidgetConfig {
            timeout_ms: 15_000,
            ..WidgetConfig::default()
        };
        assert_eq!(config.timeout(), Duration::from_secs(15));
    }
}
