//! Shared building blocks for keepsake: the stored value model, settings, and logging setup.

pub mod config;
pub mod error;
pub mod logging;
pub mod value;

pub use config::{ConfigError, DEFAULT_FILE_MODE, FileLoggingSettings, LoggingSettings, Settings, StoreSettings};
pub use error::{Error, Result};
pub use logging::{LogFormat, LoggingConfig, init_logging, sanitize_path};
pub use value::{Normalize, UnsupportedValue, Value};
