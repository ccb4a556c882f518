//! Logging setup for bridge processes
//!
//! Library code only emits `tracing` events. Binaries pick a [`LoggingMode`]
//! once at startup to decide where those events go.

use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Where log output goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggingMode {
    /// No subscriber is installed
    Silent,
    /// Compact stderr output at info level
    Development,
    /// Pretty output with source locations at debug level
    Debug,
}

impl LoggingMode {
    /// Parse a mode name as accepted in `SONOS_BRIDGE_LOG_MODE`
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "silent" => Some(LoggingMode::Silent),
            "development" | "dev" => Some(LoggingMode::Development),
            "debug" => Some(LoggingMode::Debug),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracingInit(String),
}

/// Install a global subscriber for `mode`.
///
/// # Environment Variables
///
/// - `SONOS_BRIDGE_LOG_LEVEL`: filter directives, e.g. `sonos_bridge=debug`
/// - `RUST_LOG`: used when the variable above is unset
pub fn init_logging(mode: LoggingMode) -> Result<(), LoggingError> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    match mode {
        LoggingMode::Silent => Ok(()),
        LoggingMode::Development => Registry::default()
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .with(env_filter("info"))
            .try_init()
            .map_err(|e| LoggingError::TracingInit(e.to_string())),
        LoggingMode::Debug => Registry::default()
            .with(
                fmt::layer()
                    .pretty()
                    .with_writer(std::io::stderr)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(env_filter("debug"))
            .try_init()
            .map_err(|e| LoggingError::TracingInit(e.to_string())),
    }
}

/// Initialize from `SONOS_BRIDGE_LOG_MODE`, falling back to `default`
pub fn init_logging_from_env(default: LoggingMode) -> Result<(), LoggingError> {
    let mode = std::env::var("SONOS_BRIDGE_LOG_MODE")
        .ok()
        .and_then(|name| LoggingMode::from_name(&name))
        .unwrap_or(default);

    init_logging(mode)
}

fn env_filter(default_level: &str) -> EnvFilter {
    std::env::var("SONOS_BRIDGE_LOG_LEVEL")
        .or_else(|_| std::env::var("RUST_LOG"))
        .map(EnvFilter::new)
        .unwrap_or_else(|_| EnvFilter::new(default_level))
}

pub fn is_initialized() -> bool {
    tracing::dispatcher::has_been_set()
}
