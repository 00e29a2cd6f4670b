//! Logging setup for the bridge process.
//!
//! Library crates only emit `tracing` events; installing a subscriber is
//! left to the binary (or an embedding application) through this module.

use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Environment variable selecting the [`LoggingMode`].
pub const LOG_MODE_ENV: &str = "HUE_EMULATOR_LOG_MODE";
/// Environment variable overriding the filter directive.
pub const LOG_LEVEL_ENV: &str = "HUE_EMULATOR_LOG_LEVEL";

/// How much the process writes to stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggingMode {
    /// No subscriber is installed
    Silent,
    /// Compact stderr output at info level
    Development,
    /// Pretty output with thread ids and source locations at debug level
    Debug,
}

impl LoggingMode {
    fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "silent" => Some(Self::Silent),
            "development" => Some(Self::Development),
            "debug" => Some(Self::Debug),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracingInit(String),

    #[error("Invalid environment variable: {0}")]
    InvalidEnv(String),
}

/// Install a global subscriber for `mode`.
///
/// The filter comes from `HUE_EMULATOR_LOG_LEVEL`, then `RUST_LOG`, then
/// the mode's default level. Fails if a subscriber is already installed.
///
/// ```rust,ignore
/// hue_bridge::logging::init_logging(LoggingMode::Development)?;
/// ```
pub fn init_logging(mode: LoggingMode) -> Result<(), LoggingError> {
    let default_level = match mode {
        LoggingMode::Silent => return Ok(()),
        LoggingMode::Development => "info",
        LoggingMode::Debug => "debug",
    };
    init_with_filter(mode, create_env_filter(default_level)?)
}

/// Install a subscriber for `mode` using `level` as the default directive.
///
/// Used by the binary, where `--log-level` replaces the mode's default.
pub fn init_logging_with_level(mode: LoggingMode, level: &str) -> Result<(), LoggingError> {
    if mode == LoggingMode::Silent {
        return Ok(());
    }
    init_with_filter(mode, create_env_filter(level)?)
}

/// Initialize from `HUE_EMULATOR_LOG_MODE`.
///
/// Unset means [`LoggingMode::Development`]; an unknown value is an error.
pub fn init_logging_from_env() -> Result<(), LoggingError> {
    let mode = match std::env::var(LOG_MODE_ENV) {
        Ok(name) => LoggingMode::from_name(&name)
            .ok_or_else(|| LoggingError::InvalidEnv(format!("{LOG_MODE_ENV}={name}")))?,
        Err(_) => LoggingMode::Development,
    };

    init_logging(mode)
}

fn init_with_filter(mode: LoggingMode, filter: EnvFilter) -> Result<(), LoggingError> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let result = match mode {
        LoggingMode::Silent => return Ok(()),
        LoggingMode::Development => Registry::default()
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .compact(),
            )
            .with(filter)
            .try_init(),
        LoggingMode::Debug => Registry::default()
            .with(
                fmt::layer()
                    .pretty()
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(filter)
            .try_init(),
    };

    result.map_err(|e| LoggingError::TracingInit(e.to_string()))
}

fn create_env_filter(default_level: &str) -> Result<EnvFilter, LoggingError> {
    let directive = std::env::var(LOG_LEVEL_ENV)
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| default_level.to_string());

    EnvFilter::try_new(&directive)
        .map_err(|e| LoggingError::InvalidEnv(format!("bad filter '{directive}': {e}")))
}

pub fn is_initialized() -> bool {
    tracing::dispatcher::has_been_set()
}
