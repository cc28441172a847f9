//! Gateway configuration
//!
//! JSON configuration describing the connectors to build, their
//! credentials and (for the simulator) seeded markets.

mod loader;
mod types;

pub use loader::{load_config, load_config_from_str, load_default_config};
pub use types::{ConnectorConfig, GatewayConfig, MarketConfig};
