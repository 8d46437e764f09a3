//! Logging setup built on the tracing ecosystem.
//!
//! # Environment Variables
//!
//! - `KEEPSAKE_LOG`: Filter directive (like `RUST_LOG`), e.g., `keepsake_store=debug`
//! - `KEEPSAKE_LOG_FORMAT`: Output format for stderr: `pretty`, `json`, `compact`
//! - `KEEPSAKE_LOG_DIR`: Directory for file logging (overrides settings)
//!
//! # Example
//!
//! ```no_run
//! use keepsake_core::logging;
//!
//! // Hold the guard for the lifetime of the program so buffered file logs are flushed
//! let _guard = logging::init_logging(None)?;
//! # Ok::<(), keepsake_core::Error>(())
//! ```

use crate::Error;
use crate::config::{FileLoggingSettings, LoggingSettings};
use std::env;
use std::io;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Log output format for stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Pretty, human-readable output with colors
    Pretty,
    /// JSON output (one line per event)
    Json,
    /// Compact, single-line output
    #[default]
    Compact,
}

impl LogFormat {
    /// All available log formats.
    pub const VALUES: &[LogFormat] = &[LogFormat::Pretty, LogFormat::Json, LogFormat::Compact];

    /// Parse a log format from a string.
    pub fn parse_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pretty" => Some(LogFormat::Pretty),
            "json" => Some(LogFormat::Json),
            "compact" => Some(LogFormat::Compact),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
            LogFormat::Compact => "compact",
        }
    }
}

/// Resolved logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default filter directive for stderr output.
    pub level: String,
    /// Output format for stderr.
    pub format: LogFormat,
    /// File logging configuration (optional).
    pub file: Option<FileLoggingSettings>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "warn".to_string(), format: LogFormat::default(), file: None }
    }
}

impl From<LoggingSettings> for LoggingConfig {
    fn from(settings: LoggingSettings) -> Self {
        let format = LogFormat::parse_str(&settings.format).unwrap_or_default();

        Self {
            level: settings.level,
            format,
            file: if settings.file.enabled { Some(settings.file) } else { None },
        }
    }
}

impl LoggingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_file_logging(mut self, settings: FileLoggingSettings) -> Self {
        self.file = Some(settings);
        self
    }

    /// Filter precedence: `KEEPSAKE_LOG`, then `RUST_LOG`, then the configured level.
    fn filter_directive(&self) -> String {
        env::var("KEEPSAKE_LOG")
            .ok()
            .or_else(|| env::var("RUST_LOG").ok())
            .unwrap_or_else(|| self.level.clone())
    }

    fn build_env_filter(&self) -> EnvFilter {
        EnvFilter::try_new(self.filter_directive()).unwrap_or_else(|_| EnvFilter::new("warn"))
    }

    fn is_tty() -> bool {
        atty::is(atty::Stream::Stderr)
    }

    /// Environment override wins; pretty output is only used on a terminal.
    fn detect_format(&self) -> LogFormat {
        if let Ok(fmt_str) = env::var("KEEPSAKE_LOG_FORMAT")
            && let Some(fmt) = LogFormat::parse_str(&fmt_str)
        {
            return fmt;
        }

        if self.format == LogFormat::Pretty && !Self::is_tty() { LogFormat::Compact } else { self.format }
    }

    fn log_dir(file: &FileLoggingSettings) -> Result<PathBuf, Error> {
        if let Ok(custom_dir) = env::var("KEEPSAKE_LOG_DIR") {
            return Ok(PathBuf::from(custom_dir));
        }

        if let Some(dir) = &file.directory {
            return Ok(dir.clone());
        }

        let home = env::var("HOME")
            .or_else(|_| env::var("USERPROFILE"))
            .map_err(|_| Error::Config("Could not determine home directory".to_string()))?;

        Ok(PathBuf::from(home).join(".keepsake").join("logs"))
    }
}

/// Install the global tracing subscriber.
///
/// Sets up an environment-aware filter, a formatted stderr layer, and, when
/// file logging is enabled, a daily rolling JSON file layer. The returned guard
/// must be held until shutdown for file output to be flushed; it is `None` when
/// file logging is off.
pub fn init_logging(config: Option<LoggingConfig>) -> Result<Option<WorkerGuard>, Error> {
    let config = config.unwrap_or_default();
    let env_filter = config.build_env_filter();
    let format = config.detect_format();

    let registry = Registry::default().with(env_filter);

    if let Some(file_config) = &config.file {
        let log_dir = LoggingConfig::log_dir(file_config)?;
        std::fs::create_dir_all(&log_dir)
            .map_err(|e| Error::Config(format!("Failed to create log directory: {}", e)))?;

        let file_appender = tracing_appender::rolling::daily(log_dir, "keepsake.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let result = match format {
            LogFormat::Pretty => registry
                .with(fmt::layer().pretty().with_writer(io::stderr).with_ansi(true))
                .with(fmt::layer().json().with_writer(non_blocking))
                .try_init(),
            LogFormat::Json => registry
                .with(fmt::layer().json().with_writer(io::stderr))
                .with(fmt::layer().json().with_writer(non_blocking))
                .try_init(),
            LogFormat::Compact => registry
                .with(fmt::layer().compact().with_writer(io::stderr))
                .with(fmt::layer().json().with_writer(non_blocking))
                .try_init(),
        };
        result.map_err(|e| Error::Config(format!("Failed to install subscriber: {}", e)))?;

        Ok(Some(guard))
    } else {
        let result = match format {
            LogFormat::Pretty => registry
                .with(fmt::layer().pretty().with_writer(io::stderr).with_ansi(true))
                .try_init(),
            LogFormat::Json => registry.with(fmt::layer().json().with_writer(io::stderr)).try_init(),
            LogFormat::Compact => registry.with(fmt::layer().compact().with_writer(io::stderr)).try_init(),
        };
        result.map_err(|e| Error::Config(format!("Failed to install subscriber: {}", e)))?;

        Ok(None)
    }
}

/// Sanitize file paths for logging (home directory shown as `~`).
pub fn sanitize_path(path: &Path) -> String {
    if let Ok(home) = env::var("HOME")
        && home.len() > 1
        && let Ok(stripped) = path.strip_prefix(&home)
    {
        return format!("~/{}", stripped.display());
    }

    path.display().to_string()
}
