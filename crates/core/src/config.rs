use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Default permission bits for a newly created store file
pub const DEFAULT_FILE_MODE: u32 = 0o644;

/// Store location and creation policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreSettings {
    /// Path of the store file
    #[serde(default = "default_store_path")]
    pub path: PathBuf,

    /// Permission bits used when the file is created (Unix only)
    #[serde(default = "default_mode")]
    pub mode: u32,
}

fn default_store_path() -> PathBuf {
    PathBuf::from("keepsake.json")
}

fn default_mode() -> u32 {
    DEFAULT_FILE_MODE
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self { path: default_store_path(), mode: default_mode() }
    }
}

/// File logging section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileLoggingSettings {
    #[serde(default)]
    pub enabled: bool,

    /// Directory for rolling log files (default: `~/.keepsake/logs`)
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

/// `[logging]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// One of `pretty`, `json`, `compact`
    #[serde(default = "default_log_format")]
    pub format: String,

    #[serde(default)]
    pub file: FileLoggingSettings,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "compact".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self { level: default_log_level(), format: default_log_format(), file: FileLoggingSettings::default() }
    }
}

/// Root configuration structure for keepsake.toml
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Settings {
    /// Load settings from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let settings: Settings =
            toml::from_str(toml_str).map_err(|e| crate::Error::Config(ConfigError::from(e).to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load settings from `path` when it exists, defaults otherwise
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() { Self::from_file(path) } else { Ok(Self::default()) }
    }

    fn validate(&self) -> Result<()> {
        use crate::Error;

        if self.store.path.as_os_str().is_empty() {
            return Err(Error::Config(ConfigError::EmptyStorePath.to_string()));
        }

        if self.store.mode > 0o777 {
            return Err(Error::Config(ConfigError::InvalidMode(self.store.mode).to_string()));
        }

        if crate::logging::LogFormat::parse_str(&self.logging.format).is_none() {
            return Err(Error::Config(
                ConfigError::InvalidLogFormat(self.logging.format.clone()).to_string(),
            ));
        }

        Ok(())
    }

    /// Get example settings (as a string)
    pub fn example() -> &'static str {
        r#"# Keepsake Configuration Example

[store]
# Path of the store file, created on first use
path = "keepsake.json"
# Permission bits applied when the file is created
mode = 0o644

[logging]
# Filter directive, overridden by KEEPSAKE_LOG or RUST_LOG
level = "warn"
# Output format for stderr: "pretty", "json", or "compact"
format = "compact"

[logging.file]
# Write JSON logs to a daily rolling file
enabled = false
# directory = "/var/log/keepsake"
"#
    }
}

/// Configuration-specific errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("store path must not be empty")]
    EmptyStorePath,

    #[error("invalid file mode: {0:#o}")]
    InvalidMode(u32),

    #[error("invalid log format: {0}")]
    InvalidLogFormat(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    TomlParse(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::TomlParse(err.to_string())
    }
}
