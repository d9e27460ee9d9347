use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub const DEFAULT_AUTO_PATH_PREFIX: &str = "/auto/";
pub const DEFAULT_MAX_WAITERS_PER_NODE: usize = 1024;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Store-wide settings. A cluster hands its config down to every pod
/// and page it creates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Prefix for page paths minted by `Pod::new_page`, must start with `/`
    pub auto_path_prefix: String,
    /// Upper bound on pending long-poll waiters per node, 0 for unbounded
    pub max_waiters_per_node: usize,
    /// Default log level for binaries embedding the store
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auto_path_prefix: DEFAULT_AUTO_PATH_PREFIX.to_string(),
            max_waiters_per_node: DEFAULT_MAX_WAITERS_PER_NODE,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file; missing keys fall back to their defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.auto_path_prefix.starts_with('/') {
            return Err(ConfigError::InvalidAutoPathPrefix(self.auto_path_prefix.clone()));
        }
        self.level()?;
        Ok(())
    }

    /// `log_level` parsed as a tracing level
    pub fn level(&self) -> Result<tracing::Level, ConfigError> {
        self.log_level
            .parse()
            .map_err(|_| ConfigError::InvalidLogLevel(self.log_level.clone()))
    }

    /// The waiter bound as an option, `None` meaning unbounded
    pub fn waiter_limit(&self) -> Option<usize> {
        match self.max_waiters_per_node {
            0 => None,
            limit => Some(limit),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("auto path prefix must start with '/': {0:?}")]
    InvalidAutoPathPrefix(String),

    #[error("unknown log level: {0:?}")]
    InvalidLogLevel(String),
}
