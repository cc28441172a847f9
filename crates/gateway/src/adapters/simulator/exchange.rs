use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Duration;
use dashmap::DashMap;
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use uuid::Uuid;
use xbridge_core::{
    Amount, Asset, Balance, Balances, CurrencyPair, Decimals, DomainError, KLine, MakedOrder,
    OrderBook, PairNotation, Price, Quantity, Side, Symbol, Trade, TradeHistory, WithdrawalId,
    checked_add, checked_mul,
};
use xbridge_ports::{ApiClient, ClientError, ClientResult, Clock, LogSink};

use super::market::{Fill, MakerFill, Market};
use crate::config::ConnectorConfig;
use crate::error::ConfigError;
use crate::ledger::OrderLedger;
use crate::logging::{ConnectorLogger, DEFAULT_FILTER};
use crate::normalize::{
    MAX_TRADE_PAGES, TrailingWindow, build_kline, collect_trailing_trades,
};

/// Trades returned per history page
const TRADE_PAGE_SIZE: usize = 100;

const LOG_TARGET: &str = "xbridge_gateway::simulator";

/// In-memory exchange implementing [`ApiClient`]
///
/// Markets are held under their native spelling (`ETHBTC` by default), so
/// every call goes through the same canonical/native translation a live
/// connector performs. Limit orders cross seeded liquidity and the account's
/// own resting orders at maker prices, lock the spent asset while resting
/// and settle into free balances as they execute. Reads never wait on the
/// mutation gate. Diagnostics go to the sink given to [`with_logger`].
///
/// [`with_logger`]: SimulatedExchange::with_logger
pub struct SimulatedExchange {
    name: String,
    root: String,
    account_id: String,
    api_key: String,
    api_secret: String,
    initialized: bool,
    logger: LogSink,
    log_filter: String,
    log: ConnectorLogger,
    clock: Arc<dyn Clock>,
    window_span: Duration,
    notation: PairNotation,
    markets: DashMap<String, Market>,
    balances: DashMap<Asset, Balance>,
    ledger: OrderLedger,
    next_order_id: AtomicU64,
    /// Serializes order placement, cancels, fills and withdrawals
    gate: Mutex<()>,
}

impl SimulatedExchange {
    pub fn new(name: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            name: name.into(),
            root: String::new(),
            account_id: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            initialized: false,
            logger: LogSink::discard(),
            log_filter: DEFAULT_FILTER.to_string(),
            log: ConnectorLogger::discard(LOG_TARGET),
            clock,
            window_span: TrailingWindow::default_span(),
            notation: PairNotation::CONCAT,
            markets: DashMap::new(),
            balances: DashMap::new(),
            ledger: OrderLedger::new(),
            next_order_id: AtomicU64::new(1),
            gate: Mutex::new(()),
        }
    }

    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.root = root.into();
        self
    }

    /// Route this connector's diagnostics into `logger`
    pub fn with_logger(mut self, logger: LogSink) -> Self {
        self.log = ConnectorLogger::new(LOG_TARGET, &logger, &self.log_filter);
        self.logger = logger;
        self
    }

    /// env_logger filter for this connector's diagnostics
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self.log = ConnectorLogger::new(LOG_TARGET, &self.logger, &self.log_filter);
        self
    }

    /// Span of klines and trade histories
    pub fn with_window(mut self, span: Duration) -> Self {
        self.window_span = span;
        self
    }

    /// Native pair spelling used internally
    pub fn with_notation(mut self, notation: PairNotation) -> Self {
        self.notation = notation;
        self
    }

    /// First exchange-assigned order id
    pub fn with_order_ids_from(self, first: u64) -> Self {
        self.next_order_id.store(first, Ordering::Relaxed);
        self
    }

    /// Build a simulator seeded from a connector entry
    pub fn from_config(
        config: &ConnectorConfig,
        clock: Arc<dyn Clock>,
        window: Duration,
    ) -> Result<Self, ConfigError> {
        let exchange = Self::new(config.name.clone(), clock)
            .with_root(config.root_url.clone())
            .with_window(window);

        for market in &config.markets {
            exchange.add_market(&market.symbol, market.decimals())?;
        }
        for (asset, free) in &config.balances {
            exchange.set_balance(asset, *free)?;
        }
        for (symbol, book) in &config.seed_book {
            exchange.seed_book(symbol, book.clone())?;
        }
        Ok(exchange)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Listed symbols in canonical form
    pub fn symbols(&self) -> Vec<Symbol> {
        let mut symbols: Vec<Symbol> = self.markets.iter().map(|m| m.pair.to_string()).collect();
        symbols.sort();
        symbols
    }

    /// List a market with the precision it accepts
    pub fn add_market(&self, symbol: &str, decimals: Decimals) -> ClientResult<()> {
        let pair = CurrencyPair::parse(symbol)?;
        decimals.validate()?;
        let native = pair.to_native(self.notation);
        self.log
            .debug(format_args!("{}: listing {} as {}", self.name, pair, native));
        self.markets.insert(native, Market::new(pair, decimals));
        Ok(())
    }

    /// Set the free balance of `asset`, clearing anything locked
    pub fn set_balance(&self, asset: &str, free: Amount) -> ClientResult<()> {
        let balance = Balance::available(free)?;
        self.balances.insert(asset.to_uppercase(), balance);
        Ok(())
    }

    /// Replace resting liquidity; levels may arrive in any order
    pub fn seed_book(&self, symbol: &str, book: OrderBook) -> ClientResult<()> {
        let (_, native) = self.resolve(symbol)?;
        if let Some(mut market) = self.markets.get_mut(&native) {
            market.book = book;
        }
        Ok(())
    }

    /// Append public trades to the market's history
    pub fn seed_trades(&self, symbol: &str, trades: Vec<Trade>) -> ClientResult<()> {
        let (_, native) = self.resolve(symbol)?;
        if let Some(mut market) = self.markets.get_mut(&native) {
            market.trades.extend(trades);
        }
        Ok(())
    }

    /// Execute `amount` more of a resting order at its limit rate
    ///
    /// Stands in for a counterparty arriving after submission.
    pub async fn execute(&self, id: &str, amount: Quantity) -> ClientResult<MakedOrder> {
        if amount <= Decimal::ZERO {
            return Err(DomainError::NonPositive {
                field: "amount",
                value: amount,
            }
            .into());
        }
        let _gate = self.gate.lock().await;

        let symbol = self
            .ledger
            .symbol_of(id)
            .ok_or_else(|| ClientError::OrderNotFound(id.to_string()))?;
        let (pair, native) = self.resolve(&symbol)?;

        let maker = MakerFill {
            id: id.to_string(),
            right: amount,
            price: self.ledger.get_for(&symbol, id)?.rate,
        };
        let order = self.fill_resting(&pair, &maker)?;
        if let Some(mut market) = self.markets.get_mut(&native) {
            let now = self.clock.unix_now();
            market.reduce_resting(id, amount);
            market
                .trades
                .push(Trade::new(now, amount, order.rate, order.side.opposite()));
        }

        self.log.info(format_args!(
            "{}: order {} executed {} more, now {}",
            self.name,
            id,
            amount,
            order.status.as_str()
        ));
        Ok(order)
    }

    fn ensure_init(&self) -> ClientResult<()> {
        if !self.initialized {
            return Err(ClientError::NotInitialized);
        }
        Ok(())
    }

    /// Canonical pair and native market key for `symbol`
    fn resolve(&self, symbol: &str) -> ClientResult<(CurrencyPair, String)> {
        let pair = CurrencyPair::parse(symbol)?;
        let native = pair.to_native(self.notation);
        if !self.markets.contains_key(&native) {
            return Err(ClientError::UnknownSymbol(symbol.to_string()));
        }
        Ok((pair, native))
    }

    fn window(&self) -> TrailingWindow {
        TrailingWindow::trailing(self.clock.as_ref(), self.window_span)
    }

    fn read_market<R>(&self, native: &str, read: impl FnOnce(&Market) -> R) -> ClientResult<R> {
        self.markets
            .get(native)
            .map(|market| read(market.value()))
            .ok_or_else(|| ClientError::UnknownSymbol(native.to_string()))
    }

    fn lock_funds(&self, asset: &str, amount: Amount) -> ClientResult<()> {
        match self.balances.get_mut(asset) {
            Some(mut balance) => Ok(balance.lock(asset, amount)?),
            None => Err(DomainError::InsufficientBalance {
                asset: asset.to_string(),
                required: amount,
                available: Decimal::ZERO,
            }
            .into()),
        }
    }

    fn release_funds(&self, asset: &str, amount: Amount) {
        if let Some(mut balance) = self.balances.get_mut(asset) {
            balance.release(amount);
        }
    }

    /// Move executed funds: the spent asset leaves the locked part, the
    /// received asset lands in free. Buys filled below `limit` get the
    /// difference unlocked.
    fn settle(&self, pair: &CurrencyPair, side: Side, fill: Fill, limit: Price) -> ClientResult<()> {
        let (spent, received) = match side {
            Side::Buy => (fill.left, fill.right),
            Side::Sell => (fill.right, fill.left),
        };

        if let Some(mut balance) = self.balances.get_mut(pair.spent_asset(side)) {
            balance.consume_locked(spent);
            if side == Side::Buy {
                let reserved = checked_mul("fill", fill.right, limit)?;
                balance.release(reserved - fill.left);
            }
        }
        self.balances
            .entry(pair.received_asset(side).to_string())
            .or_default()
            .credit(received)?;
        Ok(())
    }

    /// Execute part of a resting account order at its limit rate and settle it
    fn fill_resting(&self, pair: &CurrencyPair, maker: &MakerFill) -> ClientResult<MakedOrder> {
        let value = checked_mul("fill", maker.right, maker.price)?;
        let ((), order) = self.ledger.modify(&maker.id, |order| {
            let right = checked_add("fill", order.executed(), maker.right)?;
            let left = checked_add("fill", order.left_amount_executed, value)?;
            order.apply_execution(right, left)?;
            Ok(())
        })?;

        let fill = Fill {
            right: maker.right,
            left: value,
        };
        self.settle(pair, order.side, fill, order.rate)?;
        Ok(order)
    }

    async fn place(
        &self,
        side: Side,
        symbol: &str,
        amount: Quantity,
        price: Price,
    ) -> ClientResult<MakedOrder> {
        self.ensure_init()?;
        let (pair, native) = self.resolve(symbol)?;
        let decimals = self.read_market(&native, |m| m.decimals)?;
        decimals.check_amount(amount)?;
        decimals.check_price(price)?;
        let (amount, price) = decimals.prepare(amount, price)?;
        let notional = checked_mul("notional", amount, price)?;

        let _gate = self.gate.lock().await;

        let spent = pair.spent_asset(side).to_string();
        let reserve = match side {
            Side::Buy => notional,
            Side::Sell => amount,
        };
        self.lock_funds(&spent, reserve)?;

        let now = self.clock.unix_now();
        let taken = match self.markets.get_mut(&native) {
            Some(mut market) => market.take(side, amount, price, now),
            None => Err(DomainError::InvalidSymbol(symbol.to_string())),
        };
        let take = match taken {
            Ok(take) => take,
            Err(e) => {
                self.release_funds(&spent, reserve);
                self.log.warn(format_args!(
                    "{}: {} {} rejected: {}",
                    self.name, side, native, e
                ));
                return Err(e.into());
            }
        };

        let id = self.next_order_id.fetch_add(1, Ordering::Relaxed).to_string();
        let mut order = MakedOrder::placed(id, side, amount, price)?;
        if !take.fill.is_empty() {
            order.apply_execution(take.fill.right, take.fill.left)?;
            self.settle(&pair, side, take.fill, price)?;
        }
        for maker in &take.makers {
            let resting = self.fill_resting(&pair, maker)?;
            self.log.info(format_args!(
                "{}: resting order {} executed {}, now {}",
                self.name,
                resting.id,
                maker.right,
                resting.status.as_str()
            ));
        }
        if !order.is_terminal() {
            if let Some(mut market) = self.markets.get_mut(&native) {
                market.rest(order.id.clone(), side, price, order.remaining());
            }
        }
        self.ledger.insert(&pair.to_string(), order.clone())?;

        self.log.info(format_args!(
            "{}: {} {} {} @ {} -> order {} {}",
            self.name,
            side,
            native,
            amount,
            price,
            order.id,
            order.status.as_str()
        ));
        Ok(order)
    }
}

#[async_trait]
impl ApiClient for SimulatedExchange {
    async fn init(
        &mut self,
        account_id: &str,
        api_key: &str,
        api_secret: &str,
    ) -> ClientResult<()> {
        self.account_id = account_id.to_string();
        self.api_key = api_key.to_string();
        self.api_secret = api_secret.to_string();
        self.initialized = true;
        self.log.info(format_args!(
            "{}: initialized for account '{}' with {} markets",
            self.name,
            account_id,
            self.markets.len()
        ));
        Ok(())
    }

    async fn get_balances(&self) -> ClientResult<Balances> {
        self.ensure_init()?;
        Ok(self
            .balances
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect())
    }

    async fn get_order_book(&self, symbol: &str) -> ClientResult<OrderBook> {
        self.ensure_init()?;
        let (_, native) = self.resolve(symbol)?;
        let book = self.read_market(&native, Market::visible_book)??;
        self.log.debug(format_args!(
            "{}: {} book {} asks / {} bids",
            self.name,
            native,
            book.asks.len(),
            book.bids.len()
        ));
        Ok(book)
    }

    async fn sell(&self, symbol: &str, amount: Quantity, price: Price) -> ClientResult<MakedOrder> {
        self.place(Side::Sell, symbol, amount, price).await
    }

    async fn buy(&self, symbol: &str, amount: Quantity, price: Price) -> ClientResult<MakedOrder> {
        self.place(Side::Buy, symbol, amount, price).await
    }

    async fn cancel_order(&self, symbol: &str, id: &str) -> ClientResult<()> {
        self.ensure_init()?;
        let (pair, native) = self.resolve(symbol)?;
        let _gate = self.gate.lock().await;

        let current = self.ledger.get_for(&pair.to_string(), id)?;
        let unlocked = match current.side {
            Side::Buy => checked_mul("refund", current.remaining(), current.rate)?,
            Side::Sell => current.remaining(),
        };
        let ((), order) = self.ledger.modify(id, |order| Ok(order.cancel()?))?;

        if let Some(mut market) = self.markets.get_mut(&native) {
            market.unrest(id);
        }
        self.release_funds(pair.spent_asset(order.side), unlocked);
        self.log
            .info(format_args!("{}: order {} cancelled", self.name, id));
        Ok(())
    }

    async fn get_order_status(&self, id: &str, symbol: &str) -> ClientResult<MakedOrder> {
        self.ensure_init()?;
        let (pair, _) = self.resolve(symbol)?;
        self.ledger.get_for(&pair.to_string(), id)
    }

    async fn get_my_open_orders(&self, symbol: &str) -> ClientResult<Vec<MakedOrder>> {
        self.ensure_init()?;
        let (pair, _) = self.resolve(symbol)?;
        Ok(self.ledger.open_for(&pair.to_string()))
    }

    async fn get_my_all_orders(&self, symbol: &str) -> ClientResult<Vec<MakedOrder>> {
        self.ensure_init()?;
        let (pair, _) = self.resolve(symbol)?;
        Ok(self.ledger.all_for(&pair.to_string()))
    }

    async fn withdraw(
        &self,
        asset: &str,
        address: &str,
        amount: Amount,
    ) -> ClientResult<WithdrawalId> {
        self.ensure_init()?;
        if amount <= Decimal::ZERO {
            return Err(DomainError::NonPositive {
                field: "amount",
                value: amount,
            }
            .into());
        }
        if address.trim().is_empty() {
            return Err(ClientError::Rejected("empty withdrawal address".to_string()));
        }
        let asset = asset.to_uppercase();
        let _gate = self.gate.lock().await;

        match self.balances.get_mut(&asset) {
            Some(mut balance) => balance.debit(&asset, amount)?,
            None => {
                return Err(DomainError::InsufficientBalance {
                    asset,
                    required: amount,
                    available: Decimal::ZERO,
                }
                .into());
            }
        }

        let id = Uuid::new_v4().to_string();
        self.log.info(format_args!(
            "{}: withdrawal {} of {} {} to {}",
            self.name, id, amount, asset, address
        ));
        Ok(id)
    }

    async fn get_kline(&self, symbol: &str, candle_period_minutes: u32) -> ClientResult<KLine> {
        self.ensure_init()?;
        let (_, native) = self.resolve(symbol)?;
        let trades = self.read_market(&native, |m| m.trades.clone())?;
        Ok(build_kline(&trades, candle_period_minutes, &self.window())?)
    }

    async fn get_trade_history(&self, symbol: &str) -> ClientResult<TradeHistory> {
        self.ensure_init()?;
        let (_, native) = self.resolve(symbol)?;
        let market = self.read_market(&native, Market::clone)?;

        collect_trailing_trades(&self.window(), MAX_TRADE_PAGES, |cursor| {
            let page = market.trade_page(cursor, TRADE_PAGE_SIZE);
            async move { Ok::<_, ClientError>(page) }
        })
        .await
    }

    async fn get_decs(&self, symbol: &str) -> ClientResult<Decimals> {
        self.ensure_init()?;
        let (_, native) = self.resolve(symbol)?;
        self.read_market(&native, |m| m.decimals)
    }

    fn prop_root(&self) -> &str {
        &self.root
    }

    fn prop_key(&self) -> &str {
        &self.api_key
    }

    fn prop_secret(&self) -> &str {
        &self.api_secret
    }

    fn prop_id(&self) -> &str {
        &self.account_id
    }

    fn prop_logger(&self) -> LogSink {
        self.logger.clone()
    }
}

impl std::fmt::Debug for SimulatedExchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedExchange")
            .field("name", &self.name)
            .field("markets", &self.markets.len())
            .field("orders", &self.ledger.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;
    use xbridge_clock::ManualClock;
    use xbridge_core::{Order, Status};

    async fn exchange() -> SimulatedExchange {
        let clock = ManualClock::at(Utc.timestamp_opt(1_700_000_000, 0).unwrap());
        let mut exchange = SimulatedExchange::new("sim", Arc::new(clock));
        exchange.add_market("BTC_ETH", Decimals::new(2, 4)).unwrap();
        exchange.set_balance("BTC", dec!(1000)).unwrap();
        exchange.set_balance("ETH", dec!(10)).unwrap();
        exchange
            .seed_book(
                "BTC_ETH",
                OrderBook {
                    asks: vec![Order::new(dec!(105), dec!(2)), Order::new(dec!(101), dec!(1))],
                    bids: vec![Order::new(dec!(95), dec!(3)), Order::new(dec!(100), dec!(1))],
                },
            )
            .unwrap();
        exchange.init("acct", "key", "secret").await.unwrap();
        exchange
    }

    fn balance(balances: &Balances, asset: &str) -> Balance {
        balances.get(asset).copied().unwrap_or_default()
    }

    #[tokio::test]
    async fn test_uninitialized_connector_refuses_calls() {
        let clock = ManualClock::frozen_now();
        let exchange = SimulatedExchange::new("sim", Arc::new(clock));
        assert_eq!(
            exchange.get_balances().await.unwrap_err(),
            ClientError::NotInitialized
        );
        assert_eq!(exchange.prop_id(), "");
    }

    #[tokio::test]
    async fn test_markets_held_under_native_symbol() {
        let exchange = exchange().await;
        assert!(exchange.markets.contains_key("ETHBTC"));
        assert_eq!(exchange.symbols(), vec!["BTC_ETH".to_string()]);
        assert!(exchange.get_order_book("btc_eth").await.is_ok());
        assert!(matches!(
            exchange.get_order_book("LTC_ETH").await,
            Err(ClientError::UnknownSymbol(_))
        ));
        assert!(matches!(
            exchange.get_order_book("BTCETH").await,
            Err(ClientError::Domain(DomainError::InvalidSymbol(_)))
        ));
    }

    #[tokio::test]
    async fn test_crossing_buy_settles_with_price_improvement() {
        let exchange = exchange().await;
        // limit 103 crosses the 101 ask only
        let order = exchange.buy("BTC_ETH", dec!(2), dec!(103)).await.unwrap();
        assert_eq!(order.status, Status::PartiallyFilled);
        assert_eq!(order.executed(), dec!(1));
        assert_eq!(order.rate_executed, dec!(101));

        let balances = exchange.get_balances().await.unwrap();
        // 206 reserved, 101 spent, 2 refunded, 103 still locked
        assert_eq!(balance(&balances, "BTC").free, dec!(794) + dec!(2));
        assert_eq!(balance(&balances, "BTC").locked, dec!(103));
        assert_eq!(balance(&balances, "ETH").free, dec!(11));

        exchange.cancel_order("BTC_ETH", &order.id).await.unwrap();
        let balances = exchange.get_balances().await.unwrap();
        assert_eq!(balance(&balances, "BTC").locked, dec!(0));
        assert_eq!(balance(&balances, "BTC").free, dec!(899));
    }

    #[tokio::test]
    async fn test_resting_sell_filled_later() {
        let exchange = exchange().await;
        let order = exchange.sell("BTC_ETH", dec!(4), dec!(102)).await.unwrap();
        assert_eq!(order.status, Status::NotFilled);
        assert_eq!(
            balance(&exchange.get_balances().await.unwrap(), "ETH").locked,
            dec!(4)
        );

        let order = exchange.execute(&order.id, dec!(4)).await.unwrap();
        assert_eq!(order.status, Status::Filled);
        assert!(order.closed);

        let balances = exchange.get_balances().await.unwrap();
        assert_eq!(balance(&balances, "ETH").total(), dec!(6));
        assert_eq!(balance(&balances, "BTC").free, dec!(1408));
        assert!(exchange.execute(&order.id, dec!(1)).await.is_err());
    }

    #[tokio::test]
    async fn test_orders_checked_against_precision_and_funds() {
        let exchange = exchange().await;
        let err = exchange.buy("BTC_ETH", dec!(1), dec!(100.123)).await.unwrap_err();
        assert!(err.is_validation());

        let err = exchange.sell("BTC_ETH", dec!(11), dec!(120)).await.unwrap_err();
        assert_eq!(err.kind(), xbridge_ports::ErrorKind::Account);
        assert!(exchange.get_my_all_orders("BTC_ETH").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_market_precision_must_fit_decimals() {
        let exchange = exchange().await;
        let err = exchange
            .add_market("LTC_ETH", Decimals::new(2, 29))
            .unwrap_err();
        assert!(err.is_validation());
        assert!(exchange.get_decs("LTC_ETH").await.is_err());
    }

    #[tokio::test]
    async fn test_withdraw_debits_free_balance() {
        let exchange = exchange().await;
        let id = exchange.withdraw("eth", "0xabc", dec!(2.5)).await.unwrap();
        assert!(!id.is_empty());
        let balances = exchange.get_balances().await.unwrap();
        assert_eq!(balance(&balances, "ETH").free, dec!(7.5));

        assert!(exchange.withdraw("ETH", "0xabc", dec!(100)).await.is_err());
        assert!(exchange.withdraw("DOGE", "0xabc", dec!(1)).await.is_err());
        assert!(exchange.withdraw("ETH", " ", dec!(1)).await.is_err());
        assert!(exchange.withdraw("ETH", "0xabc", dec!(0)).await.is_err());
    }
}
