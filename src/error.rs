use std::path::PathBuf;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum StoreError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

#[derive(thiserror::Error, Debug)]
pub enum PersistError {
    #[error("Storage backend failed: {0}")]
    Sled(#[from] sled::Error),
    #[error("Snapshot i/o failed at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Snapshot could not be encoded: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("Snapshot could not be decoded: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("Storage quota exceeded: snapshot needs {needed} bytes, quota is {quota}")]
    QuotaExceeded { needed: usize, quota: usize },
}

// Raised by the entry builders before anything reaches the store
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum EntryError {
    #[error("Item name is missing")]
    MissingName,
    #[error("Quantity must be a positive number, got {0:?}")]
    InvalidQuantity(Option<f64>),
    #[error("Purchase price must be a non-negative number, got {0}")]
    InvalidPrice(f64),
    #[error("Reorder level must be a non-negative number, got {0}")]
    InvalidReorderLevel(f64),
    #[error("No item with id '{0}'")]
    UnknownItem(String),
    #[error("Quantity {requested} exceeds available stock of {available} {unit}")]
    InsufficientStock {
        requested: f64,
        available: f64,
        unit: String,
    },
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Config validation failed: {0}")]
    Validation(String),
}
