//! One monitoring cycle over a connector
//!
//! Mirrors the call pattern a trading engine follows: balances, book, an
//! order, its status, then market history.

use log::{info, warn};
use xbridge_core::{MakedOrder, Price, Symbol};
use xbridge_ports::{ApiClient, ClientResult};

use crate::utils::{ConnectorInfo, refresh_after_fill};

/// Candle period used by the cycle
pub const CYCLE_CANDLE_MINUTES: u32 = 5;

/// What one cycle observed
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub symbol: Symbol,
    pub assets: usize,
    pub best_bid: Option<Price>,
    pub best_ask: Option<Price>,
    pub order: Option<MakedOrder>,
    pub candles: usize,
    pub trades: usize,
}

/// Run one cycle on `symbol`
///
/// Places the smallest accepted buy at the best bid (so it rests), reads it
/// back and cancels it. Skipped when the book has no bids.
pub async fn run_cycle(client: &dyn ApiClient, symbol: &str) -> ClientResult<CycleReport> {
    let info = ConnectorInfo::of(client);
    info!(
        "Cycle on {} via {} (account '{}', key {})",
        symbol, info.root, info.account_id, info.masked_key
    );

    let balances = client.get_balances().await?;
    let book = client.get_order_book(symbol).await?;
    let best_bid = book.best_bid().map(|o| o.price);
    let best_ask = book.best_ask().map(|o| o.price);
    info!(
        "{}: bid {:?} ask {:?} spread {:?}",
        symbol,
        best_bid,
        best_ask,
        book.spread()
    );

    let order = match best_bid {
        Some(price) => Some(resting_test_order(client, symbol, price).await?),
        None => {
            warn!("{}: no bids, skipping test order", symbol);
            None
        }
    };

    let kline = client.get_kline(symbol, CYCLE_CANDLE_MINUTES).await?;
    let history = client.get_trade_history(symbol).await?;
    info!(
        "{}: {} candles, {} trades in window",
        symbol,
        kline.len(),
        history.len()
    );

    Ok(CycleReport {
        symbol: symbol.to_string(),
        assets: balances.len(),
        best_bid,
        best_ask,
        order,
        candles: kline.len(),
        trades: history.len(),
    })
}

async fn resting_test_order(
    client: &dyn ApiClient,
    symbol: &str,
    price: Price,
) -> ClientResult<MakedOrder> {
    let decimals = client.get_decs(symbol).await?;
    let placed = client.buy(symbol, decimals.amount_step()?, price).await?;

    let mut order = client.get_order_status(&placed.id, symbol).await?;
    if !order.is_terminal() {
        client.cancel_order(symbol, &order.id).await?;
        order.reconcile(client.get_order_status(&placed.id, symbol).await?)?;
    }
    refresh_after_fill(client, &order).await?;
    Ok(order)
}
