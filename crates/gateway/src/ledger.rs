//! Per-connector order tracking
//!
//! Holds every order a connector placed, in submission order. Snapshots are
//! accepted through [`MakedOrder::reconcile`], so a tracked order never moves
//! backwards in its lifecycle.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use xbridge_core::{MakedOrder, OrderId, Symbol};
use xbridge_ports::{ClientError, ClientResult};

#[derive(Debug, Clone)]
struct TrackedOrder {
    sequence: u64,
    symbol: Symbol,
    order: MakedOrder,
}

/// Concurrent map of tracked orders
#[derive(Debug, Default)]
pub struct OrderLedger {
    orders: DashMap<OrderId, TrackedOrder>,
    sequence: AtomicU64,
}

impl OrderLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking `order`; an already known id is reconciled instead
    pub fn insert(&self, symbol: &str, order: MakedOrder) -> ClientResult<()> {
        match self.orders.entry(order.id.clone()) {
            Entry::Occupied(mut tracked) => tracked.get_mut().order.reconcile(order)?,
            Entry::Vacant(slot) => {
                slot.insert(TrackedOrder {
                    sequence: self.sequence.fetch_add(1, Ordering::Relaxed),
                    symbol: symbol.to_string(),
                    order,
                });
            }
        }
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<MakedOrder> {
        self.orders.get(id).map(|t| t.order.clone())
    }

    /// Tracked order, only if it belongs to `symbol`
    pub fn get_for(&self, symbol: &str, id: &str) -> ClientResult<MakedOrder> {
        match self.orders.get(id) {
            Some(tracked) if tracked.symbol == symbol => Ok(tracked.order.clone()),
            _ => Err(ClientError::OrderNotFound(id.to_string())),
        }
    }

    pub fn symbol_of(&self, id: &str) -> Option<Symbol> {
        self.orders.get(id).map(|t| t.symbol.clone())
    }

    /// Accept a polled snapshot; fails on regression or unknown id
    pub fn update(&self, observed: MakedOrder) -> ClientResult<MakedOrder> {
        let mut tracked = self
            .orders
            .get_mut(&observed.id)
            .ok_or_else(|| ClientError::OrderNotFound(observed.id.clone()))?;
        tracked.order.reconcile(observed)?;
        Ok(tracked.order.clone())
    }

    /// Apply `change` to a tracked order in place
    ///
    /// The order is left untouched if `change` fails.
    pub fn modify<R>(
        &self,
        id: &str,
        change: impl FnOnce(&mut MakedOrder) -> ClientResult<R>,
    ) -> ClientResult<(R, MakedOrder)> {
        let mut tracked = self
            .orders
            .get_mut(id)
            .ok_or_else(|| ClientError::OrderNotFound(id.to_string()))?;
        let mut draft = tracked.order.clone();
        let result = change(&mut draft)?;
        tracked.order = draft.clone();
        Ok((result, draft))
    }

    /// Orders for `symbol` still resting on the book, oldest first
    pub fn open_for(&self, symbol: &str) -> Vec<MakedOrder> {
        self.collect(symbol, |order| !order.is_terminal())
    }

    /// Every order ever placed for `symbol`, oldest first
    pub fn all_for(&self, symbol: &str) -> Vec<MakedOrder> {
        self.collect(symbol, |_| true)
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    fn collect(&self, symbol: &str, keep: impl Fn(&MakedOrder) -> bool) -> Vec<MakedOrder> {
        let mut matching: Vec<(u64, MakedOrder)> = self
            .orders
            .iter()
            .filter(|t| t.symbol == symbol && keep(&t.order))
            .map(|t| (t.sequence, t.order.clone()))
            .collect();
        matching.sort_by_key(|(sequence, _)| *sequence);
        matching.into_iter().map(|(_, order)| order).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use xbridge_core::{DomainError, Side, Status};

    #[test]
    fn test_submission_order_preserved() {
        let ledger = OrderLedger::new();
        for id in ["9", "3", "5"] {
            ledger
                .insert("BTC_ETH", MakedOrder::placed(id, Side::Buy, dec!(1), dec!(10)).unwrap())
                .unwrap();
        }
        ledger
            .insert("LTC_ETH", MakedOrder::pending("1", Side::Sell))
            .unwrap();

        let ids: Vec<_> = ledger.all_for("BTC_ETH").into_iter().map(|o| o.id).collect();
        assert_eq!(ids, vec!["9", "3", "5"]);
        assert_eq!(ledger.all_for("LTC_ETH").len(), 1);
        assert_eq!(ledger.len(), 4);
    }

    #[test]
    fn test_open_orders_exclude_terminal() {
        let ledger = OrderLedger::new();
        ledger
            .insert("BTC_ETH", MakedOrder::placed("1", Side::Buy, dec!(1), dec!(10)).unwrap())
            .unwrap();
        ledger
            .insert("BTC_ETH", MakedOrder::placed("2", Side::Buy, dec!(1), dec!(10)).unwrap())
            .unwrap();

        ledger
            .modify("1", |order| Ok(order.cancel()?))
            .unwrap();
        let open: Vec<_> = ledger.open_for("BTC_ETH").into_iter().map(|o| o.id).collect();
        assert_eq!(open, vec!["2"]);
        assert_eq!(ledger.all_for("BTC_ETH").len(), 2);
    }

    #[test]
    fn test_update_rejects_regression() {
        let ledger = OrderLedger::new();
        let placed = MakedOrder::placed("1", Side::Sell, dec!(2), dec!(10)).unwrap();
        ledger.insert("BTC_ETH", placed.clone()).unwrap();

        let mut filled = placed.clone();
        filled.apply_execution(dec!(2), dec!(20)).unwrap();
        assert_eq!(ledger.update(filled).unwrap().status, Status::Filled);

        assert!(matches!(
            ledger.update(placed),
            Err(ClientError::Domain(DomainError::StatusRegression { .. }))
        ));
        assert_eq!(ledger.get("1").map(|o| o.status), Some(Status::Filled));
    }

    #[test]
    fn test_failed_change_leaves_order_untouched() {
        let ledger = OrderLedger::new();
        ledger
            .insert("BTC_ETH", MakedOrder::placed("1", Side::Buy, dec!(1), dec!(10)).unwrap())
            .unwrap();

        let result = ledger.modify("1", |order| {
            order.closed = true;
            Err::<(), _>(ClientError::Rejected("nope".into()))
        });
        assert!(result.is_err());
        assert_eq!(ledger.get("1").map(|o| o.closed), Some(false));
    }

    #[test]
    fn test_lookup_is_scoped_by_symbol() {
        let ledger = OrderLedger::new();
        ledger
            .insert("BTC_ETH", MakedOrder::pending("1", Side::Buy))
            .unwrap();
        assert!(ledger.get_for("BTC_ETH", "1").is_ok());
        assert!(matches!(
            ledger.get_for("LTC_ETH", "1"),
            Err(ClientError::OrderNotFound(_))
        ));
        assert_eq!(ledger.symbol_of("1").as_deref(), Some("BTC_ETH"));
        assert!(ledger.update(MakedOrder::pending("404", Side::Buy)).is_err());
    }
}
