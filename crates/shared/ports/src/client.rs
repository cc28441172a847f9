use async_trait::async_trait;
use xbridge_core::{
    Amount, Balances, Decimals, KLine, MakedOrder, OrderBook, Price, Quantity, TradeHistory,
    WithdrawalId,
};

use crate::error::ClientResult;
use crate::log_sink::LogSink;

/// Port every exchange connector implements
///
/// Symbols are canonical (`"BTC_ETH"`: left BTC, right ETH). `amount` is
/// denominated in the right currency, `price` in left per right. Connectors
/// translate to and from native notation internally.
///
/// `init` must succeed before any other async operation. Read operations
/// take `&self` and may run concurrently; mutating operations may serialize
/// internally but must not block reads.
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// Establish credentials; unused fields may be empty
    async fn init(&mut self, account_id: &str, api_key: &str, api_secret: &str)
    -> ClientResult<()>;

    /// All balances held by the account, keyed by asset
    async fn get_balances(&self) -> ClientResult<Balances>;

    /// Normalized book: asks ascending, bids descending, never crossed
    async fn get_order_book(&self, symbol: &str) -> ClientResult<OrderBook>;

    /// Place a limit sell; returns at least the exchange-assigned id
    async fn sell(&self, symbol: &str, amount: Quantity, price: Price)
    -> ClientResult<MakedOrder>;

    /// Place a limit buy; returns at least the exchange-assigned id
    async fn buy(&self, symbol: &str, amount: Quantity, price: Price) -> ClientResult<MakedOrder>;

    /// Fails if the order is already filled or closed
    async fn cancel_order(&self, symbol: &str, id: &str) -> ClientResult<()>;

    /// Authoritative refresh of one order
    async fn get_order_status(&self, id: &str, symbol: &str) -> ClientResult<MakedOrder>;

    async fn get_my_open_orders(&self, symbol: &str) -> ClientResult<Vec<MakedOrder>>;

    async fn get_my_all_orders(&self, symbol: &str) -> ClientResult<Vec<MakedOrder>>;

    async fn withdraw(&self, asset: &str, address: &str, amount: Amount)
    -> ClientResult<WithdrawalId>;

    /// Candles over the trailing window, oldest first
    async fn get_kline(&self, symbol: &str, candle_period_minutes: u32) -> ClientResult<KLine>;

    /// Public trades over the trailing window, oldest first
    async fn get_trade_history(&self, symbol: &str) -> ClientResult<TradeHistory>;

    /// Precision accepted for the symbol
    async fn get_decs(&self, symbol: &str) -> ClientResult<Decimals>;

    /// REST root URL
    fn prop_root(&self) -> &str {
        ""
    }

    fn prop_key(&self) -> &str {
        ""
    }

    fn prop_secret(&self) -> &str {
        ""
    }

    fn prop_id(&self) -> &str {
        ""
    }

    /// Destination for diagnostic output
    fn prop_logger(&self) -> LogSink {
        LogSink::discard()
    }
}
