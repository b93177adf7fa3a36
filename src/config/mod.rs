//! Configuration module
//!
//! Handles finding, loading and validating the configuration file, and
//! layering environment overrides on top of it.

mod env;

pub use env::{print_env_help, EnvBuilder, EnvConfig, EnvGuard};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::output::OutputFormat;
use crate::utils::logger::LogLevel;

/// Configuration file locations (in order of precedence)
const CONFIG_LOCATIONS: &[&str] = &[
    "./treetest.yaml",
    "./treetest.yml",
    "./.treetest.yaml",
    "~/.config/treetest/config.yaml",
];

/// Application configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Report format (tree, json, json-pretty, summary)
    pub format: String,

    /// Colour tree output
    pub color: bool,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// How long the harness waits for a root test to finish; 0 waits forever
    pub suite_timeout_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            format: "tree".to_string(),
            color: true,
            log_level: "warn".to_string(),
            suite_timeout_ms: 10_000,
        }
    }
}

impl AppConfig {
    /// Find configuration file in standard locations
    pub fn find() -> Option<PathBuf> {
        CONFIG_LOCATIONS
            .iter()
            .map(|location| expand_path(location))
            .find(|path| path.exists())
    }

    /// Load from the first standard location, or defaults if none exists
    pub fn load_default() -> Result<Self> {
        match Self::find() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = if is_yaml_file(path) {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?
        };

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = if is_yaml_file(path) {
            serde_yaml::to_string(self).context("Failed to serialize config")?
        } else {
            serde_json::to_string_pretty(self).context("Failed to serialize config")?
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if OutputFormat::from_str(&self.format).is_none() {
            anyhow::bail!(
                "Unsupported output format '{}'. Valid formats: {}",
                self.format,
                OutputFormat::all().join(", ")
            );
        }

        if LogLevel::from_str(&self.log_level).is_none() {
            anyhow::bail!("Unsupported log level '{}'", self.log_level);
        }

        Ok(())
    }

    /// Apply environment overrides
    pub fn merge_env(&mut self, env: &EnvConfig) {
        if let Some(format) = &env.format {
            self.format.clone_from(format);
        }
        if let Some(color) = env.color {
            self.color = color;
        }
        if env.no_color {
            self.color = false;
        }
        if let Some(level) = &env.log_level {
            self.log_level.clone_from(level);
        }
        if let Some(timeout) = env.suite_timeout_ms {
            self.suite_timeout_ms = timeout;
        }
    }

    pub fn output_format(&self) -> OutputFormat {
        OutputFormat::from_str(&self.format).unwrap_or(OutputFormat::Tree)
    }

    pub fn log_level(&self) -> LogLevel {
        LogLevel::from_str(&self.log_level).unwrap_or(LogLevel::Warn)
    }

    pub fn suite_timeout(&self) -> Duration {
        Duration::from_millis(self.suite_timeout_ms)
    }
}

/// Expand ~ to home directory
fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

/// Check if file is YAML based on extension
fn is_yaml_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
}
