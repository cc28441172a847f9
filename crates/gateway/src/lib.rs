//! xbridge Gateway
//!
//! Normalization layer for the xbridge exchange clients. Provides:
//! - Normalizers turning raw exchange data into the uniform model
//! - Per-connector order ledger with monotonic status tracking
//! - Exchange adapters (an in-memory simulator; live venues follow the same shape)
//! - Helpers operating on any connector through the `ApiClient` port
//!
//! ## Architecture
//!
//! ```text
//! Exchange REST (native symbols, unsorted books, venue statuses)
//!         │
//!    ┌────▼─────┐
//!    │ Adapter  │  canonical <-> native symbols, precision checks
//!    └────┬─────┘
//!         │ normalize::{order_book, candles, trades}
//!    ┌────▼─────┐
//!    │ApiClient │  OrderBook, MakedOrder, KLine, TradeHistory, Balances
//!    └────┬─────┘
//!         │
//!    Trading engine
//! ```

pub mod adapters;
pub mod config;
pub mod error;
pub mod ledger;
pub mod logging;
pub mod normalize;
pub mod session;
pub mod utils;

// Re-export commonly used types
pub use adapters::SimulatedExchange;
pub use config::{
    ConnectorConfig, GatewayConfig, MarketConfig, load_config, load_config_from_str,
    load_default_config,
};
pub use error::ConfigError;
pub use ledger::OrderLedger;
pub use logging::{ConnectorLogger, init_logging};
pub use normalize::{
    RawCandle, TradeCursor, TrailingWindow, build_kline, collect_trailing_trades,
    normalize_candles, normalize_order_book, normalize_trade_history,
};
pub use session::{CycleReport, run_cycle};
pub use utils::{ConnectorInfo, PollPolicy, await_terminal, place_limit, refresh_after_fill};
