//! Error types for the gateway crate

use thiserror::Error;
use xbridge_ports::ClientError;

/// Configuration loading and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {error}")]
    Io { path: String, error: String },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("No enabled connectors in config")]
    NoEnabledConnectors,

    #[error("Duplicate connector id: {0}")]
    DuplicateConnector(String),

    #[error("Connector not found: {0}")]
    ConnectorNotFound(String),

    #[error("Trailing window must be positive, got {0} hours")]
    InvalidWindow(i64),

    #[error("Connector {connector}: invalid market {symbol}: {reason}")]
    InvalidMarket {
        connector: String,
        symbol: String,
        reason: String,
    },

    #[error("Invalid seed data: {0}")]
    Seed(#[from] ClientError),
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e.to_string())
    }
}
