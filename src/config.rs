//! Configuration for the `reglisp` binary.
//!
//! Settings are read from `<config dir>/reglisp/config.toml` (for example
//! `~/.config/reglisp/config.toml` on Linux). Every key is optional:
//!
//! ```toml
//! log_level = "debug"
//! show_tokens = true
//! print_stats = false
//! max_parse_depth = 512
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::Level;

use crate::parser::MAX_PARSE_DEPTH;

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Toml(toml::de::Error),
    InvalidLogLevel(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "Failed to read config '{}': {}", path.display(), source)
            }
            ConfigError::Toml(e) => write!(f, "Invalid config: {}", e),
            ConfigError::InvalidLogLevel(level) => write!(f, "Invalid log level: {}", level),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Toml(e) => Some(e),
            ConfigError::InvalidLogLevel(_) => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Toml(e)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// `error`, `warn`, `info`, `debug` or `trace`
    pub log_level: String,
    /// Print the token stream before the parsed expression
    pub show_tokens: bool,
    /// Print continuation stack statistics on exit
    pub print_stats: bool,
    /// Deepest list nesting the reader accepts
    pub max_parse_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_level: "warn".to_string(),
            show_tokens: false,
            print_stats: false,
            max_parse_depth: MAX_PARSE_DEPTH,
        }
    }
}

impl Config {
    /// Default location of the config file, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("reglisp").join("config.toml"))
    }

    /// Load from [`Config::default_path`]; defaults if there is no file.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from_path(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_toml(&content)
    }

    pub fn parse_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.level()?;
        Ok(config)
    }

    /// `log_level` as a tracing level.
    pub fn level(&self) -> Result<Level, ConfigError> {
        self.log_level
            .parse()
            .map_err(|_| ConfigError::InvalidLogLevel(self.log_level.clone()))
    }
}
