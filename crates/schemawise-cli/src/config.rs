//! `config.toml` for the schemawise binary
//!
//! Every section is optional; missing keys fall back to the library defaults.
//!
//! ```toml
//! [logging]
//! default_filter = "warn,schemawise=info"
//!
//! [analyzer]
//! comment_prefixes = ["--", "#"]
//! sample_cap = 10
//!
//! [heuristics]
//! denormalize_min_join_count = 4
//!
//! [plan]
//! partition_year = 2026
//!
//! [storage]
//! backend = "json"
//! base_dir = "/var/lib/schemawise"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use schemawise_analyzer::{HeuristicConfig, LogAnalyzerConfig};
use schemawise_planner::PlanConfig;
use schemawise_storage::StorageConfig;
use serde::{Deserialize, Serialize};

use crate::logging::LoggingConfig;

/// Full binary configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub analyzer: LogAnalyzerConfig,
    pub heuristics: HeuristicConfig,
    pub plan: PlanConfig,
    pub storage: StorageConfig,
}

impl AppConfig {
    /// `<config dir>/schemawise/config.toml`
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("schemawise")
            .join("config.toml")
    }

    /// Loads an explicitly requested file, or the default file when present
    ///
    /// An explicit path that does not exist is an error; a missing default
    /// file yields the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => {
                if !path.exists() {
                    bail!("Config file not found: {}", path.display());
                }
                Self::from_file(path)
            }
            None => {
                let path = Self::default_path();
                if path.exists() {
                    Self::from_file(&path)
                } else {
                    tracing::debug!(path = %path.display(), "no config file found, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.heuristics.validate()?;
        if self.analyzer.sample_cap == 0 {
            bail!("analyzer.sample_cap must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
