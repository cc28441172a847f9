use std::collections::HashMap;

use chrono::Duration;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use xbridge_core::{Asset, Decimals, OrderBook, Symbol};

use crate::normalize::DEFAULT_TRAILING_HOURS;

/// Root configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// env_logger filter directives, e.g. `info,xbridge_gateway=debug`
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Span of klines and trade histories
    #[serde(default = "default_trailing_window_hours")]
    pub trailing_window_hours: i64,

    #[serde(default)]
    pub connectors: Vec<ConnectorConfig>,
}

fn default_log_filter() -> String {
    "info".to_string()
}

fn default_trailing_window_hours() -> i64 {
    DEFAULT_TRAILING_HOURS
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            trailing_window_hours: default_trailing_window_hours(),
            connectors: Vec::new(),
        }
    }
}

impl GatewayConfig {
    pub fn trailing_window(&self) -> Duration {
        Duration::hours(self.trailing_window_hours)
    }
}

/// One connector instance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorConfig {
    pub id: String,
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub root_url: String,
    #[serde(default)]
    pub account_id: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_secret: String,
    #[serde(default)]
    pub markets: Vec<MarketConfig>,
    /// Initial free balances (simulator only)
    #[serde(default)]
    pub balances: HashMap<Asset, Decimal>,
    /// Raw resting liquidity per symbol (simulator only); need not be sorted
    #[serde(default)]
    pub seed_book: HashMap<Symbol, OrderBook>,
}

fn default_enabled() -> bool {
    true
}

impl ConnectorConfig {
    /// Prefix of the credential override variables, e.g. `XBRIDGE_PAPER_`
    pub fn env_prefix(&self) -> String {
        let id: String = self
            .id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect();
        format!("XBRIDGE_{}_", id)
    }

    /// Override credentials from the process environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    /// Override credentials from `lookup` (`<prefix>API_KEY`,
    /// `<prefix>API_SECRET`, `<prefix>ACCOUNT_ID`)
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let prefix = self.env_prefix();
        if let Some(key) = lookup(&format!("{prefix}API_KEY")) {
            self.api_key = key;
        }
        if let Some(secret) = lookup(&format!("{prefix}API_SECRET")) {
            self.api_secret = secret;
        }
        if let Some(account) = lookup(&format!("{prefix}ACCOUNT_ID")) {
            self.account_id = account;
        }
    }
}

/// Precision of one market
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketConfig {
    pub symbol: Symbol,
    pub price_decs: u32,
    pub amount_decs: u32,
}

impl MarketConfig {
    pub fn decimals(&self) -> Decimals {
        Decimals::new(self.price_decs, self.amount_decs)
    }
}
