//! Logging setup for smcli.
//!
//! Logs go to stderr so that command output on stdout stays clean. Three
//! formats are available (text, JSON, compact), optionally mirrored to a
//! daily rolling file.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use smcli::logging::{init_logging, LogFormat, LoggingConfig};
//!
//! let config = LoggingConfig::from_env().with_format(LogFormat::Compact);
//! init_logging(&config);
//! tracing::info!("ready");
//! ```
//!
//! Secret material is never logged: only counts, paths, algorithm names,
//! public keys and addresses appear in events.

pub mod format;

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Once, OnceLock};

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

pub use format::{CompactFormatter, SmcliFormatter};

/// Name of the rolling log file.
pub const LOG_FILE_NAME: &str = "smcli.log";

static INIT: Once = Once::new();

static INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Keeps the non-blocking file writer alive for the life of the process.
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Timestamped text: `YYYY-MM-DDTHH:MM:SS.mmmZ LEVEL module: message`
    #[default]
    Text,
    /// Newline-delimited JSON
    Json,
    /// `level: message`
    Compact,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
            LogFormat::Compact => write!(f, "compact"),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(format!(
                "Invalid log format '{}'. Valid options: text, json, compact",
                s
            )),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum level DEBUG
    pub debug: bool,
    /// Minimum level TRACE (overrides debug)
    pub trace: bool,
    /// Only warnings and errors (ignored when debug or trace is set)
    pub quiet: bool,
    /// Mirror logs to a daily rolling file
    pub record_log: bool,
    /// Directory for log files (supports ~ for home directory)
    pub logging_dir: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            debug: false,
            trace: false,
            quiet: false,
            record_log: false,
            logging_dir: "~/.spacemesh/logs".to_string(),
            format: LogFormat::Text,
        }
    }
}

impl LoggingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn with_file_logging(mut self, enabled: bool) -> Self {
        self.record_log = enabled;
        self
    }

    pub fn with_logging_dir(mut self, dir: impl Into<String>) -> Self {
        self.logging_dir = dir.into();
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Load configuration from environment variables
    ///
    /// Supported environment variables:
    /// - `SMCLI_LOG_FORMAT`: text, json or compact
    /// - `SMCLI_LOG_DIR`: log directory; setting it enables file logging
    /// - `SMCLI_DEBUG`: enable debug level (any value)
    /// - `SMCLI_TRACE`: enable trace level (any value)
    /// - `RUST_LOG`: standard tracing filter, takes precedence at init time
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if std::env::var("SMCLI_DEBUG").is_ok() || std::env::var("SMCLI_TRACE").is_ok() {
            config.debug = true;
        }

        if std::env::var("SMCLI_TRACE").is_ok() {
            config.trace = true;
        }

        if let Ok(format) = std::env::var("SMCLI_LOG_FORMAT") {
            if let Ok(f) = format.parse() {
                config.format = f;
            }
        }

        if let Ok(dir) = std::env::var("SMCLI_LOG_DIR") {
            config.logging_dir = dir;
            config.record_log = true;
        }

        config
    }

    fn get_level(&self) -> Level {
        if self.trace {
            Level::TRACE
        } else if self.debug {
            Level::DEBUG
        } else if self.quiet {
            Level::WARN
        } else {
            Level::INFO
        }
    }

    fn expand_path(&self) -> PathBuf {
        let path = &self.logging_dir;
        if let Some(stripped) = path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        }
        PathBuf::from(path)
    }
}

/// Initialize the global subscriber.
///
/// Only the first call has any effect.
pub fn init_logging(config: &LoggingConfig) {
    INIT.call_once(|| {
        init_logging_internal(config);
        INITIALIZED.store(true, Ordering::SeqCst);
    });
}

/// Initialize with [`LoggingConfig::from_env`].
pub fn init_default_logging() {
    init_logging(&LoggingConfig::from_env());
}

pub fn is_initialized() -> bool {
    INITIALIZED.load(Ordering::SeqCst)
}

fn init_logging_internal(config: &LoggingConfig) {
    let env_filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(format!("smcli={}", config.get_level()))
    };

    let file_writer = if config.record_log {
        let log_dir = config.expand_path();
        if let Err(e) = std::fs::create_dir_all(&log_dir) {
            eprintln!(
                "Warning: Failed to create log directory {:?}: {}",
                log_dir, e
            );
            None
        } else {
            let appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_NAME);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            Some(non_blocking)
        }
    } else {
        None
    };

    // a `None` layer is a no-op
    let registry = tracing_subscriber::registry().with(env_filter);
    let result = match config.format {
        LogFormat::Text => registry
            .with(
                fmt::layer()
                    .event_format(SmcliFormatter)
                    .with_writer(io::stderr),
            )
            .with(file_writer.map(|writer| {
                fmt::layer()
                    .event_format(SmcliFormatter)
                    .with_writer(writer)
                    .with_ansi(false)
            }))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(io::stderr))
            .with(file_writer.map(|writer| {
                fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_ansi(false)
            }))
            .try_init(),
        LogFormat::Compact => registry
            .with(
                fmt::layer()
                    .event_format(CompactFormatter)
                    .with_writer(io::stderr),
            )
            .with(file_writer.map(|writer| {
                fmt::layer()
                    .event_format(CompactFormatter)
                    .with_writer(writer)
                    .with_ansi(false)
            }))
            .try_init(),
    };

    if let Err(e) = result {
        eprintln!("Warning: a global tracing subscriber is already set: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_config_default() {
        let config = LoggingConfig::default();
        assert!(!config.debug);
        assert!(!config.trace);
        assert!(!config.quiet);
        assert!(!config.record_log);
        assert_eq!(config.logging_dir, "~/.spacemesh/logs");
        assert_eq!(config.format, LogFormat::Text);
    }

    #[test]
    fn test_logging_config_builder() {
        let config = LoggingConfig::new()
            .with_debug(true)
            .with_format(LogFormat::Json)
            .with_logging_dir("/tmp/logs")
            .with_file_logging(true);

        assert!(config.debug);
        assert!(config.record_log);
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.logging_dir, "/tmp/logs");
    }

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("text".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("compact".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert!("pretty".parse::<LogFormat>().is_err());
        assert_eq!(LogFormat::Compact.to_string(), "compact");
    }

    #[test]
    fn test_get_level() {
        assert_eq!(LoggingConfig::default().get_level(), Level::INFO);
        assert_eq!(
            LoggingConfig::default().with_quiet(true).get_level(),
            Level::WARN
        );
        assert_eq!(
            LoggingConfig::default()
                .with_quiet(true)
                .with_debug(true)
                .get_level(),
            Level::DEBUG
        );
        // trace takes precedence over debug
        let config = LoggingConfig::default().with_debug(true).with_trace(true);
        assert_eq!(config.get_level(), Level::TRACE);
    }

    #[test]
    fn test_expand_path() {
        let config = LoggingConfig::default();
        assert!(!config.expand_path().to_string_lossy().starts_with('~'));

        let config = LoggingConfig::default().with_logging_dir("/var/log/smcli");
        assert_eq!(config.expand_path(), PathBuf::from("/var/log/smcli"));
    }
}
