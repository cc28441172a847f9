use std::collections::HashSet;
use std::path::Path;

use xbridge_core::CurrencyPair;

use super::types::{ConnectorConfig, GatewayConfig};
use crate::error::ConfigError;

/// Load gateway configuration from a JSON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<GatewayConfig, ConfigError> {
    GatewayConfig::from_file(path)
}

/// Load configuration from a JSON string
pub fn load_config_from_str(json: &str) -> Result<GatewayConfig, ConfigError> {
    GatewayConfig::from_json(json)
}

/// Load the default embedded configuration
pub fn load_default_config() -> Result<GatewayConfig, ConfigError> {
    let default_config = include_str!("default_config.json");
    load_config_from_str(default_config)
}

impl GatewayConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Get only enabled connectors
    pub fn enabled_connectors(&self) -> Vec<&ConnectorConfig> {
        self.connectors.iter().filter(|c| c.enabled).collect()
    }

    /// Get a specific connector by ID
    pub fn get_connector(&self, id: &str) -> Result<&ConnectorConfig, ConfigError> {
        self.connectors
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| ConfigError::ConnectorNotFound(id.to_string()))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trailing_window_hours <= 0 {
            return Err(ConfigError::InvalidWindow(self.trailing_window_hours));
        }
        if self.enabled_connectors().is_empty() {
            return Err(ConfigError::NoEnabledConnectors);
        }

        let mut seen = HashSet::new();
        for connector in &self.connectors {
            if !seen.insert(connector.id.as_str()) {
                return Err(ConfigError::DuplicateConnector(connector.id.clone()));
            }
            for market in &connector.markets {
                let checked = CurrencyPair::parse(&market.symbol)
                    .and_then(|_| market.decimals().validate());
                if let Err(e) = checked {
                    return Err(ConfigError::InvalidMarket {
                        connector: connector.id.clone(),
                        symbol: market.symbol.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}
