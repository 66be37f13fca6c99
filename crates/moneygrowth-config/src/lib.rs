//! Configuration management for moneygrowth
//!
//! This module handles loading, validation, and management of
//! moneygrowth configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

pub use error::{ConfigError, ConfigResult};

// ==================== Configuration Types ====================

/// Remote store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the hosted project (e.g. `https://xyz.supabase.co`)
    #[serde(default)]
    pub url: String,
    /// API key sent with every request
    #[serde(default)]
    pub key: String,
    /// Table holding the transactions
    #[serde(default = "default_table")]
    pub table: String,
    /// Unique identifier column
    #[serde(default = "default_id_field")]
    pub id_field: String,
    /// Numeric ordering column; `null` disables positional inserts
    #[serde(default = "default_position_field")]
    pub position_field: Option<String>,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            key: String::new(),
            table: default_table(),
            id_field: default_id_field(),
            position_field: default_position_field(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_table() -> String {
    "transactions".to_string()
}

fn default_id_field() -> String {
    "id".to_string()
}

fn default_position_field() -> Option<String> {
    Some("id".to_string())
}

fn default_timeout_secs() -> u64 {
    30
}

/// Terminal viewer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Rows per window
    #[serde(default = "default_rows")]
    pub rows: usize,
    /// Columns per window
    #[serde(default = "default_cols")]
    pub cols: usize,
    /// Cells wider than this are truncated
    #[serde(default = "default_max_cell_width")]
    pub max_cell_width: usize,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            rows: default_rows(),
            cols: default_cols(),
            max_cell_width: default_max_cell_width(),
        }
    }
}

fn default_rows() -> usize {
    15
}

fn default_cols() -> usize {
    5
}

fn default_max_cell_width() -> usize {
    24
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Pagination settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Records per page for sorted listings
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

fn default_page_size() -> usize {
    20
}

/// A named preset of column values used for quick transaction entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnippetConfig {
    /// Name used on the command line
    pub name: String,
    /// Help text
    #[serde(default)]
    pub description: String,
    /// Column values merged into every pushed row
    #[serde(default)]
    pub defaults: serde_json::Map<String, serde_json::Value>,
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Remote store settings
    #[serde(default)]
    pub store: StoreConfig,
    /// Viewer settings
    #[serde(default)]
    pub viewer: ViewerConfig,
    /// Pagination settings
    #[serde(default)]
    pub pagination: PaginationConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Quick-entry presets
    #[serde(default)]
    pub snippets: Vec<SnippetConfig>,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: PathBuf) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            },
            _ => ConfigError::IoError,
        })?;

        let config = Self::from_yaml(&content)?;
        config.validate()?;

        Ok(config)
    }

    /// Parse configuration from YAML text without validating it
    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        serde_yaml::from_str(content).map_err(|_| ConfigError::InvalidYaml)
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        let required = [
            ("store.url", &self.store.url),
            ("store.key", &self.store.key),
            ("store.table", &self.store.table),
            ("store.id_field", &self.store.id_field),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::MissingField {
                    field: field.to_string(),
                });
            }
        }

        if self.viewer.rows == 0 || self.viewer.cols == 0 {
            return Err(ConfigError::InvalidValue {
                field: "viewer".to_string(),
                reason: "Viewer rows and cols must be greater than 0".to_string(),
            });
        }

        if self.pagination.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "pagination.page_size".to_string(),
                reason: "Page size must be greater than 0".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for snippet in &self.snippets {
            if !seen.insert(snippet.name.as_str()) {
                return Err(ConfigError::ValidationError {
                    message: format!("Duplicate snippet name: {}", snippet.name),
                });
            }
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Look up a snippet by name
    pub fn snippet(&self, name: &str) -> Option<&SnippetConfig> {
        self.snippets.iter().find(|s| s.name == name)
    }
}

// ==================== Tests ====================
