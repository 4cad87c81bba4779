//! Console configuration loading from file and environment variables.

use serde::Deserialize;
use switchboard_menu::{MachineConfig, DEFAULT_MENU};
use switchboard_types::DIGITS_FIELD;
use thiserror::Error;

/// Top-level console configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Database settings.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Menu state machine settings.
    #[serde(default)]
    pub menu: MenuConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,

    /// SQLite busy timeout, in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Maximum number of pooled connections.
    #[serde(default = "default_pool_max_size")]
    pub pool_max_size: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "switchboard_menu=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

/// Document format printed after every step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Twiml,
    Json,
}

/// Menu state machine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MenuConfig {
    /// Menu a call starts in before its first transition.
    #[serde(default = "default_menu")]
    pub default_menu: String,

    /// Longest cascade of body-requested transitions allowed.
    #[serde(default = "default_max_transition_chain")]
    pub max_transition_chain: usize,

    /// Input field matched against menu options.
    #[serde(default = "default_input_field")]
    pub input_field: String,

    #[serde(default)]
    pub format: OutputFormat,
}

impl MenuConfig {
    pub fn machine_config(&self) -> MachineConfig {
        MachineConfig {
            max_transition_chain: self.max_transition_chain,
            input_field: self.input_field.clone(),
        }
    }
}

fn default_db_path() -> String {
    "switchboard.db".to_string()
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

fn default_pool_max_size() -> u32 {
    4
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_menu() -> String {
    DEFAULT_MENU.to_string()
}

fn default_max_transition_chain() -> usize {
    MachineConfig::default().max_transition_chain
}

fn default_input_field() -> String {
    DIGITS_FIELD.to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
            pool_max_size: default_pool_max_size(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            default_menu: default_menu(),
            max_transition_chain: default_max_transition_chain(),
            input_field: default_input_field(),
            format: OutputFormat::default(),
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `SWITCHBOARD_DB_PATH` overrides `database.path`
/// - `SWITCHBOARD_LOG_LEVEL` overrides `logging.level`
/// - `SWITCHBOARD_LOG_JSON` overrides `logging.json` (set to "true" to enable)
/// - `SWITCHBOARD_DEFAULT_MENU` overrides `menu.default_menu`
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    apply_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

fn apply_overrides(config: &mut Config, var: impl Fn(&str) -> Option<String>) {
    if let Some(db_path) = var("SWITCHBOARD_DB_PATH") {
        config.database.path = db_path;
    }
    if let Some(level) = var("SWITCHBOARD_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = var("SWITCHBOARD_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }
    if let Some(menu) = var("SWITCHBOARD_DEFAULT_MENU") {
        if !menu.trim().is_empty() {
            config.menu.default_menu = menu;
        }
    }
}
