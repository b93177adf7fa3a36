//! Logging utilities
//!
//! Provides logging configuration and helpers.

use std::panic;

use tracing::{debug, Level};
use tracing_subscriber::EnvFilter;

/// Log level configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn to_tracing_level(self) -> Level {
        match self {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }

    /// The more verbose of two levels
    pub fn max(self, other: LogLevel) -> LogLevel {
        if self.to_tracing_level() >= other.to_tracing_level() {
            self
        } else {
            other
        }
    }
}

/// Initialize the logger with specified level
pub fn init_logger(level: LogLevel) {
    let filter = EnvFilter::new(format!("treetest={}", level.to_tracing_level()));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}

/// Replace the panic hook so panic reports go to `sink` instead of stderr.
///
/// Test bodies run under `catch_unwind` and their panics are reported as
/// failures in the tree, so the default hook would only duplicate them.
pub fn route_panics<F>(sink: F)
where
    F: Fn(String) + Send + Sync + 'static,
{
    panic::set_hook(Box::new(move |info| sink(info.to_string())));
}

/// Route panic reports into the log at debug level
pub fn route_panics_to_log() {
    route_panics(|report| debug!(%report, "panic caught"));
}
