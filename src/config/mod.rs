//! Configuration management for cmdtree
//!
//! Settings come from a TOML file (`~/.cmdtree/config.toml` unless
//! `--config` names another) and are then overridden by command-line flags.
//!
//! Configuration precedence (highest to lowest):
//! 1. Command-line arguments
//! 2. Configuration file
//! 3. Default values

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ConfigError, Result};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Completion behaviour
    #[serde(default)]
    pub completion: CompletionConfig,

    /// Grammar source
    #[serde(default)]
    pub grammar: GrammarConfig,

    /// History configuration
    #[serde(default)]
    pub history: HistoryConfig,

    /// Display configuration
    #[serde(default)]
    pub display: DisplayConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Completion behaviour
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletionConfig {
    /// Offer and accept command aliases
    #[serde(default = "default_use_aliases")]
    pub use_aliases: bool,

    /// Expected first word of every line (None: lines start at the root's arguments)
    #[serde(default)]
    pub program_name: Option<String>,

    /// Show help text next to suggestions
    #[serde(default = "default_show_descriptions")]
    pub show_descriptions: bool,
}

/// Grammar source
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GrammarConfig {
    /// Grammar file used when none is given on the command line
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Command history configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryConfig {
    /// Maximum number of history entries
    #[serde(default = "default_max_history_size")]
    pub max_size: usize,

    /// Path to history file
    #[serde(default = "default_history_file")]
    pub file_path: PathBuf,

    /// Enable history persistence
    #[serde(default = "default_persist_history")]
    pub persist: bool,
}

/// Display configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisplayConfig {
    /// Enable colored output
    #[serde(default = "default_color_output")]
    pub color_output: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// Enable timestamps in logs
    #[serde(default = "default_log_timestamps")]
    pub timestamps: bool,
}

/// Log level options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

// Default value functions
fn default_use_aliases() -> bool {
    true
}

fn default_show_descriptions() -> bool {
    true
}

fn default_max_history_size() -> usize {
    1000
}

fn default_history_file() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".cmdtree_history")
}

fn default_persist_history() -> bool {
    true
}

fn default_color_output() -> bool {
    true
}

fn default_log_level() -> LogLevel {
    LogLevel::Warn
}

fn default_log_timestamps() -> bool {
    false
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            use_aliases: default_use_aliases(),
            program_name: None,
            show_descriptions: default_show_descriptions(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_size: default_max_history_size(),
            file_path: default_history_file(),
            persist: default_persist_history(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            color_output: default_color_output(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            timestamps: default_log_timestamps(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a file
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file (TOML format)
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration or error
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::FileNotFound(format!("{}: {e}", path.display())))?;
        let config: Config =
            toml::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;
        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load configuration from an explicit path or the default location
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    ///
    /// # Arguments
    /// * `path` - Path given with `--config`, if any
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration or error
    pub fn load_from_file(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Self::default_path();
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    debug!("No configuration file at {}", default_path.display());
                    Self::default()
                }
            }
        };
        Ok(config)
    }

    /// Get the default configuration file path
    ///
    /// # Returns
    /// * `PathBuf` - Path to default configuration file
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".cmdtree")
            .join("config.toml")
    }

    /// Render the configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Generic(format!("Failed to serialize config: {e}")).into())
    }

    /// Validate the configuration
    ///
    /// # Returns
    /// * `Result<()>` - Ok if valid, error otherwise
    pub fn validate(&self) -> Result<()> {
        if self.history.max_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "history.max_size".to_string(),
                value: "0".to_string(),
            }
            .into());
        }

        if let Some(name) = &self.completion.program_name
            && (name.is_empty() || name.starts_with('-') || name.chars().any(char::is_whitespace))
        {
            return Err(ConfigError::InvalidValue {
                field: "completion.program_name".to_string(),
                value: name.clone(),
            }
            .into());
        }

        Ok(())
    }
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CmdtreeError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.completion.use_aliases);
        assert!(config.completion.program_name.is_none());
        assert!(config.display.color_output);
        assert_eq!(config.history.max_size, 1000);
        assert_eq!(config.logging.level, LogLevel::Warn);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let file = write_config(
            r#"
[completion]
use_aliases = false
program_name = "myapp"

[logging]
level = "debug"
"#,
        );
        let config = Config::load_from_file(Some(file.path())).unwrap();
        assert!(!config.completion.use_aliases);
        assert_eq!(config.completion.program_name.as_deref(), Some("myapp"));
        assert!(config.completion.show_descriptions);
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.history.max_size, 1000);
    }

    #[test]
    fn test_grammar_path() {
        let file = write_config("[grammar]\npath = \"/etc/myapp.toml\"\n");
        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.grammar.path, Some(PathBuf::from("/etc/myapp.toml")));
    }

    #[test]
    fn test_explicit_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load_from_file(Some(dir.path().join("nope.toml").as_path())).unwrap_err();
        assert!(matches!(err, CmdtreeError::Config(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_invalid_format() {
        let file = write_config("[history]\nmax_size = \"many\"\n");
        let err = Config::from_file(file.path()).unwrap_err();
        assert!(matches!(err, CmdtreeError::Config(ConfigError::InvalidFormat(_))));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.history.max_size = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.completion.program_name = Some("my app".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = Config::default();
        config.completion.program_name = Some("myapp".to_string());
        let rendered = config.to_toml().unwrap();
        assert!(rendered.contains("program_name = \"myapp\""));
        let parsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(LogLevel::Debug.to_tracing_level(), tracing::Level::DEBUG);
        assert_eq!(LogLevel::Error.to_tracing_level(), tracing::Level::ERROR);
    }
}
