//! Helpers that work with any connector through the [`ApiClient`] port only

use std::time::Duration;

use log::{debug, info};
use rust_decimal::Decimal;
use xbridge_core::{Balances, MakedOrder, Price, Quantity, Side};
use xbridge_ports::{ApiClient, ClientResult};

/// Accessor snapshot of a connector, safe to log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectorInfo {
    pub root: String,
    pub account_id: String,
    pub masked_key: String,
    pub has_secret: bool,
}

impl ConnectorInfo {
    pub fn of(client: &dyn ApiClient) -> Self {
        Self {
            root: client.prop_root().to_string(),
            account_id: client.prop_id().to_string(),
            masked_key: mask(client.prop_key()),
            has_secret: !client.prop_secret().is_empty(),
        }
    }
}

/// Keep the first four characters of a credential
fn mask(key: &str) -> String {
    if key.is_empty() {
        return String::new();
    }
    let visible: String = key.chars().take(4).collect();
    if visible.len() == key.len() {
        return "****".to_string();
    }
    format!("{visible}****")
}

/// Submit a limit order brought to the symbol's precision
///
/// Fetches the accepted decimals first, rounds the price and truncates the
/// amount, then places the order.
pub async fn place_limit(
    client: &dyn ApiClient,
    side: Side,
    symbol: &str,
    amount: Quantity,
    price: Price,
) -> ClientResult<MakedOrder> {
    let decimals = client.get_decs(symbol).await?;
    let (amount, price) = decimals.prepare(amount, price)?;
    debug!("{} {} {} @ {}", side, symbol, amount, price);

    match side {
        Side::Buy => client.buy(symbol, amount, price).await,
        Side::Sell => client.sell(symbol, amount, price).await,
    }
}

/// Polling budget for [`await_terminal`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_polls: usize,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(500),
            max_polls: 20,
        }
    }
}

/// Poll an order until it is filled or closed, or the budget runs out
///
/// Every snapshot is reconciled against the previous one, so an exchange
/// reporting a regressed status fails the wait. Returns the last state;
/// callers check [`MakedOrder::is_terminal`].
pub async fn await_terminal(
    client: &dyn ApiClient,
    id: &str,
    symbol: &str,
    policy: PollPolicy,
) -> ClientResult<MakedOrder> {
    let mut tracked = client.get_order_status(id, symbol).await?;
    for _ in 1..policy.max_polls {
        if tracked.is_terminal() {
            break;
        }
        tokio::time::sleep(policy.interval).await;
        let observed = client.get_order_status(id, symbol).await?;
        tracked.reconcile(observed)?;
    }
    Ok(tracked)
}

/// Re-read balances once an order executed anything
pub async fn refresh_after_fill(
    client: &dyn ApiClient,
    order: &MakedOrder,
) -> ClientResult<Option<Balances>> {
    if order.executed() <= Decimal::ZERO {
        return Ok(None);
    }
    let balances = client.get_balances().await?;
    info!(
        "Order {} {}: refreshed {} balances",
        order.id,
        order.status.as_str(),
        balances.len()
    );
    Ok(Some(balances))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask() {
        assert_eq!(mask(""), "");
        assert_eq!(mask("abc"), "****");
        assert_eq!(mask("abcdefgh"), "abcd****");
    }
}
