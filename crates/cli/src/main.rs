use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use keepsake_core::{LoggingConfig, Settings, Value, init_logging};
use keepsake_store::{Store, StoreOptions};
use keepsake_ui::{Step, Theme};
use std::path::{Path, PathBuf};

/// Keepsake - a small write-through key/value store for configuration state
#[derive(Parser, Debug)]
#[command(name = "keepsake")]
#[command(about = "Read and write a keepsake store file", long_about = None)]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to keepsake.toml (default: ./keepsake.toml)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Store file to use (overrides store.path from the config)
    #[arg(short, long, value_name = "PATH")]
    store: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the value stored under a key
    Get {
        #[arg(value_name = "KEY")]
        key: String,
    },
    /// Store a value and flush it to disk
    Set {
        #[arg(value_name = "KEY")]
        key: String,

        #[arg(value_name = "VALUE", allow_hyphen_values = true)]
        value: String,

        /// How to interpret VALUE
        #[arg(short, long, value_enum, default_value_t = ValueKind::Auto)]
        kind: ValueKind,
    },
    /// Print every stored entry
    List {
        /// Print the entries as a JSON object
        #[arg(long)]
        json: bool,
    },
    /// Write an example keepsake.toml
    Init,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ValueKind {
    /// Boolean if `true`/`false`, number if numeric, text otherwise
    Auto,
    Text,
    Number,
    Bool,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {:#}", Theme::failure("Error:"), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(|| PathBuf::from("keepsake.toml"));
    if let Commands::Init = cli.command {
        return cmd_init(&config_path);
    }

    let settings = load_settings(&config_path, cli.store.clone())?;

    let mut logging = LoggingConfig::from(settings.logging.clone());
    if cli.verbose {
        logging = logging.with_level("debug");
    }
    let _guard = init_logging(Some(logging)).context("Failed to initialize logging")?;

    if cli.verbose {
        eprintln!("{} Using store: {}", Theme::info("Info:"), settings.store.path.display());
    }

    let store = Store::open_with(&settings.store.path, StoreOptions::from(&settings.store))
        .with_context(|| format!("Failed to open store {}", settings.store.path.display()))?;

    let result = match cli.command {
        Commands::Get { key } => cmd_get(&store, &key),
        Commands::Set { key, value, kind } => cmd_set(&store, &key, &value, kind),
        Commands::List { json } => cmd_list(&store, json),
        Commands::Init => unreachable!("handled before the store is opened"),
    };

    store.close().context("Failed to close store")?;
    result
}

/// Load settings if the file exists and apply the `--store` override
fn load_settings(path: &Path, store_override: Option<PathBuf>) -> Result<Settings> {
    let mut settings = Settings::load_or_default(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;

    if let Some(store_path) = store_override {
        settings.store.path = store_path;
    }

    tracing::debug!("Resolved store path {}", settings.store.path.display());
    Ok(settings)
}

fn parse_value(raw: &str, kind: ValueKind) -> Result<Value> {
    match kind {
        ValueKind::Text => Ok(Value::Text(raw.to_string())),
        ValueKind::Number => {
            let n: f64 = raw.trim().parse().with_context(|| format!("'{}' is not a number", raw))?;
            Ok(Value::Number(n))
        }
        ValueKind::Bool => match raw.trim().to_lowercase().as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => anyhow::bail!("'{}' is not a boolean (expected true or false)", raw),
        },
        ValueKind::Auto => match raw {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => match raw.parse::<f64>() {
                Ok(n) if n.is_finite() => Ok(Value::Number(n)),
                _ => Ok(Value::Text(raw.to_string())),
            },
        },
    }
}

/// Print the value stored under `key`
fn cmd_get(store: &Store, key: &str) -> Result<()> {
    let value = store
        .get(key)
        .with_context(|| format!("Key '{}' not found in {}", key, store.path().display()))?;

    println!("{}", value);
    Ok(())
}

/// Store a value, showing progress while the flush runs
fn cmd_set(store: &Store, key: &str, raw: &str, kind: ValueKind) -> Result<()> {
    let value = parse_value(raw, kind)?;

    let step = Step::new(format!("Writing {}", key))?;
    let result = store.set(key, value);
    let finished = step.finish(&result);

    result.with_context(|| format!("Failed to set '{}'", key))?;
    finished?;
    Ok(())
}

/// Print every entry as freshly read from disk
fn cmd_list(store: &Store, json: bool) -> Result<()> {
    let entries = store.get_all().context("Failed to read store")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("{} Store is empty", Theme::warning("Info:"));
        return Ok(());
    }

    for (key, value) in &entries {
        println!("{} = {} {}", Theme::accent(key), value, Theme::muted(&format!("({})", value.kind())));
    }

    Ok(())
}

/// Write the example settings file, refusing to overwrite
fn cmd_init(path: &Path) -> Result<()> {
    if path.exists() {
        anyhow::bail!("{} already exists", path.display());
    }

    std::fs::write(path, Settings::example()).context("Failed to create config")?;
    println!("{} Created config at {}", Theme::success("Success:"), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::TempDir;

    fn open_store(dir: &TempDir) -> Store {
        Store::open(dir.path().join("store.json")).unwrap()
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::try_parse_from(["keepsake", "list"]).unwrap();
        assert!(cli.config.is_none());
        assert!(cli.store.is_none());
        assert!(!cli.verbose);
        assert!(matches!(cli.command, Commands::List { json: false }));
    }

    #[test]
    fn test_cli_global_options() {
        let cli =
            Cli::try_parse_from(["keepsake", "--config", "/etc/ks.toml", "--store", "/tmp/s.json", "-v", "list"])
                .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/etc/ks.toml")));
        assert_eq!(cli.store, Some(PathBuf::from("/tmp/s.json")));
        assert!(cli.verbose);
    }

    #[test]
    fn test_cli_set_command() {
        let cli = Cli::try_parse_from(["keepsake", "set", "retries", "3"]).unwrap();
        if let Commands::Set { key, value, kind } = cli.command {
            assert_eq!(key, "retries");
            assert_eq!(value, "3");
            assert_eq!(kind, ValueKind::Auto);
        } else {
            panic!("Expected Set command");
        }

        let cli = Cli::try_parse_from(["keepsake", "set", "offset", "-5", "--kind", "text"]).unwrap();
        if let Commands::Set { value, kind, .. } = cli.command {
            assert_eq!(value, "-5");
            assert_eq!(kind, ValueKind::Text);
        } else {
            panic!("Expected Set command");
        }
    }

    #[test]
    fn test_cli_get_and_init_commands() {
        let cli = Cli::try_parse_from(["keepsake", "get", "theme"]).unwrap();
        assert!(matches!(cli.command, Commands::Get { ref key } if key == "theme"));

        let cli = Cli::try_parse_from(["keepsake", "init"]).unwrap();
        assert!(matches!(cli.command, Commands::Init));
    }

    #[test]
    fn test_parse_value_auto() {
        assert_eq!(parse_value("true", ValueKind::Auto).unwrap(), Value::Bool(true));
        assert_eq!(parse_value("false", ValueKind::Auto).unwrap(), Value::Bool(false));
        assert_eq!(parse_value("42", ValueKind::Auto).unwrap(), Value::Number(42.0));
        assert_eq!(parse_value("-1.5", ValueKind::Auto).unwrap(), Value::Number(-1.5));
        assert_eq!(parse_value("dark", ValueKind::Auto).unwrap(), Value::Text("dark".to_string()));
        assert_eq!(parse_value("NaN", ValueKind::Auto).unwrap(), Value::Text("NaN".to_string()));
    }

    #[test]
    fn test_parse_value_explicit_kinds() {
        assert_eq!(parse_value("42", ValueKind::Text).unwrap(), Value::Text("42".to_string()));
        assert_eq!(parse_value(" 7 ", ValueKind::Number).unwrap(), Value::Number(7.0));
        assert_eq!(parse_value("TRUE", ValueKind::Bool).unwrap(), Value::Bool(true));
        assert!(parse_value("abc", ValueKind::Number).is_err());
        assert!(parse_value("yes", ValueKind::Bool).is_err());
    }

    #[test]
    fn test_cmd_set_then_get() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        cmd_set(&store, "theme", "dark", ValueKind::Auto).unwrap();
        cmd_set(&store, "retries", "3", ValueKind::Auto).unwrap();

        assert_eq!(store.get_text("theme"), Some("dark".to_string()));
        assert_eq!(store.get_number("retries"), Some(3.0));
        assert!(cmd_get(&store, "theme").is_ok());
        store.close().unwrap();
    }

    #[test]
    fn test_cmd_set_non_finite_number_rejected() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        let err = cmd_set(&store, "bad", "inf", ValueKind::Number).unwrap_err();
        assert!(format!("{:#}", err).contains("non-finite"));
        assert!(!store.contains_key("bad"));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_cmd_set_reports_store_flush_error() {
        let store = Store::open("/dev/full").unwrap();

        let err = cmd_set(&store, "k", "v", ValueKind::Text).unwrap_err();
        assert!(err.to_string().contains("Failed to set 'k'"));
        assert!(err.downcast_ref::<keepsake_store::Error>().is_some());
        assert_eq!(store.get_text("k"), Some("v".to_string()));
    }

    #[test]
    fn test_cmd_get_missing_key() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        let err = cmd_get(&store, "missing").unwrap_err();
        assert!(err.to_string().contains("Key 'missing' not found"));
    }

    #[test]
    fn test_cmd_list() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        assert!(cmd_list(&store, false).is_ok());

        store.set("a", 1).unwrap();
        assert!(cmd_list(&store, false).is_ok());
        assert!(cmd_list(&store, true).is_ok());
    }

    #[test]
    fn test_load_settings_with_override() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("keepsake.toml");
        std::fs::write(&config_path, "[store]\npath = \"from-config.json\"\n").unwrap();

        let settings = load_settings(&config_path, None).unwrap();
        assert_eq!(settings.store.path, PathBuf::from("from-config.json"));

        let settings = load_settings(&config_path, Some(PathBuf::from("override.json"))).unwrap();
        assert_eq!(settings.store.path, PathBuf::from("override.json"));
    }

    #[test]
    fn test_load_settings_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = load_settings(&dir.path().join("absent.toml"), None).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_load_settings_invalid() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("keepsake.toml");
        std::fs::write(&config_path, "invalid toml").unwrap();

        assert!(load_settings(&config_path, None).is_err());
    }

    #[test]
    fn test_cmd_init() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("keepsake.toml");

        cmd_init(&config_path).unwrap();
        let content = std::fs::read_to_string(&config_path).unwrap();
        assert!(content.contains("[store]"));
        assert!(Settings::from_file(&config_path).is_ok());

        let err = cmd_init(&config_path).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }
}
