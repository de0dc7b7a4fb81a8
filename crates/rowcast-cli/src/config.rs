//! Configuration file support for the CLI.
//!
//! Loads and saves CLI configuration from TOML files.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use rowcast_common::config::{Dialect, ExportConfig, SessionConfig};

/// CLI configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Dialect used when planning statements.
    #[serde(default)]
    pub dialect: Dialect,

    /// Default output format for `show`.
    #[serde(default = "default_format")]
    pub output_format: String,

    /// Log every statement at info level.
    #[serde(default)]
    pub show_sql: bool,

    /// Export settings.
    #[serde(default)]
    pub export: ExportConfig,
}

fn default_format() -> String {
    "table".to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            output_format: default_format(),
            show_sql: false,
            export: ExportConfig::default(),
        }
    }
}

impl CliConfig {
    /// Loads configuration from a file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Loads the default configuration file.
    ///
    /// Looks in the following locations:
    /// 1. ~/.config/rowcast/config.toml
    /// 2. ~/.rowcast/config.toml
    /// 3. Returns default if not found
    pub fn load_default() -> Result<Self> {
        if let Some(path) = Self::default_config_path() {
            if path.exists() {
                return Self::from_file(&path);
            }
        }
        if let Some(home) = dirs::home_dir() {
            let path = home.join(".rowcast").join("config.toml");
            if path.exists() {
                return Self::from_file(&path);
            }
        }
        Ok(Self::default())
    }

    /// Returns the default configuration file path.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("rowcast").join("config.toml"))
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        self.session_config().validate().map_err(|e| anyhow!(e))
    }

    /// Returns the session configuration derived from this file.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            dialect: self.dialect,
            auto_close: true,
            show_sql: self.show_sql,
            export: self.export.clone(),
        }
    }
}
