//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration.

use std::env;

/// Environment variable prefix
const ENV_PREFIX: &str = "TREETEST";

/// Environment configuration from environment variables
#[derive(Clone, Debug, Default)]
pub struct EnvConfig {
    /// Output format from TREETEST_FORMAT
    pub format: Option<String>,
    /// Colour from TREETEST_COLOR
    pub color: Option<bool>,
    /// Set when NO_COLOR is present, whatever its value
    pub no_color: bool,
    /// Log level from TREETEST_LOG
    pub log_level: Option<String>,
    /// Harness deadline from TREETEST_SUITE_TIMEOUT_MS
    pub suite_timeout_ms: Option<u64>,
    /// Config file from TREETEST_CONFIG
    pub config_file: Option<String>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self {
            format: get_env("FORMAT"),
            color: get_env_bool("COLOR"),
            no_color: env::var_os("NO_COLOR").is_some(),
            log_level: get_env("LOG"),
            suite_timeout_ms: get_env_parse("SUITE_TIMEOUT_MS"),
            config_file: get_env("CONFIG"),
        }
    }

    /// Check if any environment variables are set
    pub fn has_any(&self) -> bool {
        self.format.is_some()
            || self.color.is_some()
            || self.no_color
            || self.log_level.is_some()
            || self.suite_timeout_ms.is_some()
            || self.config_file.is_some()
    }

    /// Print current environment configuration
    pub fn print_summary(&self) {
        println!("Environment Configuration:");
        println!("  {}_FORMAT:           {:?}", ENV_PREFIX, self.format);
        println!("  {}_COLOR:            {:?}", ENV_PREFIX, self.color);
        println!("  {}_LOG:              {:?}", ENV_PREFIX, self.log_level);
        println!("  {}_SUITE_TIMEOUT_MS: {:?}", ENV_PREFIX, self.suite_timeout_ms);
        println!("  {}_CONFIG:           {:?}", ENV_PREFIX, self.config_file);
        println!("  NO_COLOR:                  {}", self.no_color);
    }
}

/// Get environment variable with prefix
fn get_env(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{name}")).ok()
}

/// Get environment variable and parse to type
fn get_env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    get_env(name).and_then(|v| v.parse().ok())
}

/// Get environment variable as boolean
fn get_env_bool(name: &str) -> Option<bool> {
    get_env(name).map(|v| {
        matches!(
            v.to_lowercase().as_str(),
            "1" | "true" | "yes" | "on" | "enabled"
        )
    })
}

/// Builder for setting environment variables (useful for testing)
pub struct EnvBuilder {
    vars: Vec<(String, String)>,
}

impl EnvBuilder {
    pub fn new() -> Self {
        Self { vars: Vec::new() }
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.vars.push((format!("{ENV_PREFIX}_FORMAT"), format.into()));
        self
    }

    pub fn color(mut self, color: bool) -> Self {
        self.vars.push((format!("{ENV_PREFIX}_COLOR"), color.to_string()));
        self
    }

    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.vars.push((format!("{ENV_PREFIX}_LOG"), level.into()));
        self
    }

    pub fn suite_timeout_ms(mut self, timeout: u64) -> Self {
        self.vars
            .push((format!("{ENV_PREFIX}_SUITE_TIMEOUT_MS"), timeout.to_string()));
        self
    }

    /// Apply environment variables
    pub fn apply(self) {
        for (key, value) in self.vars {
            env::set_var(key, value);
        }
    }

    /// Apply and return guard that restores on drop
    pub fn apply_scoped(self) -> EnvGuard {
        let previous: Vec<_> = self
            .vars
            .iter()
            .map(|(k, _)| (k.clone(), env::var(k).ok()))
            .collect();

        self.apply();

        EnvGuard { previous }
    }
}

impl Default for EnvBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Guard that restores environment variables on drop
pub struct EnvGuard {
    previous: Vec<(String, Option<String>)>,
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.previous {
            match value {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }
    }
}

/// Print all TREETEST environment variables
pub fn print_env_help() {
    println!("Environment Variables:");
    println!();
    println!("  {ENV_PREFIX}_FORMAT            Output format (tree, json, json-pretty, summary)");
    println!("  {ENV_PREFIX}_COLOR             Colour tree output (true/false)");
    println!("  {ENV_PREFIX}_LOG               Log level (trace, debug, info, warn, error)");
    println!("  {ENV_PREFIX}_SUITE_TIMEOUT_MS  Harness deadline per suite, 0 waits forever");
    println!("  {ENV_PREFIX}_CONFIG            Path to configuration file");
    println!("  NO_COLOR                    Disable colour when set");
}
