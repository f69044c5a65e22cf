//! TOML configuration for the CLI: where the snapshot lives and how chatty logging is.
use super::error::{ConfigError, PersistError};
use super::persist::{JsonFilePort, STORAGE_KEY, SledPort, SnapshotPort};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Sled,
    Json,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: Backend,
    /// Defaults to a file under the platform data directory.
    pub path: Option<PathBuf>,
    pub key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// `~/.config/stock-ledger/config.toml` or the platform equivalent.
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("stock-ledger").join("config.toml")
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// A missing file yields the defaults; a present one must parse and validate.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.key.as_deref().is_some_and(|key| key.trim().is_empty()) {
            return Err(ConfigError::Validation("storage key must not be empty".into()));
        }
        if self.storage.backend == Backend::Json && self.storage.key.is_some() {
            return Err(ConfigError::Validation(
                "storage key only applies to the sled backend, the json backend keeps one snapshot per file".into(),
            ));
        }
        if self.logging.filter.trim().is_empty() {
            return Err(ConfigError::Validation("logging filter must not be empty".into()));
        }
        Ok(())
    }

    pub fn storage_key(&self) -> &str {
        self.storage.key.as_deref().unwrap_or(STORAGE_KEY)
    }

    pub fn data_path(&self) -> PathBuf {
        if let Some(path) = &self.storage.path {
            return path.clone();
        }
        let data_dir = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        let file = match self.storage.backend {
            Backend::Sled => "inventory.db",
            Backend::Json => "inventory.json",
        };
        data_dir.join("stock-ledger").join(file)
    }

    /// Opens the configured backend. The JSON file backend is one snapshot
    /// per file, so the key only applies to sled.
    pub fn open_port(&self) -> Result<Box<dyn SnapshotPort>, PersistError> {
        let path = self.data_path();
        match self.storage.backend {
            Backend::Sled => Ok(Box::new(SledPort::open(path)?.with_key(self.storage_key()))),
            Backend::Json => Ok(Box::new(JsonFilePort::new(path))),
        }
    }
}
