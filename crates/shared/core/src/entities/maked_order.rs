use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Side, Status};
use crate::error::{DomainError, DomainResult};
use crate::values::{Amount, OrderId, Price, Quantity, checked_mul};

/// An order placed by this account
///
/// `right_amount` is the requested quantity in the right currency of the
/// pair, `left_amount` its counter-value (`right_amount * rate`). The
/// `*_executed` fields track fill progress. Right after submission an
/// exchange may only report the id; every other numeric field is then zero
/// and the order reads as `NotFilled`, which is not an error.
///
/// Lifecycle: `NotFilled -> PartiallyFilled -> Filled`, plus the orthogonal
/// `closed` flag (no longer resting on the book).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MakedOrder {
    pub id: OrderId,
    pub status: Status,
    pub closed: bool,
    #[serde(with = "rust_decimal::serde::float")]
    pub left_amount: Amount,
    #[serde(with = "rust_decimal::serde::float")]
    pub right_amount: Quantity,
    #[serde(with = "rust_decimal::serde::float")]
    pub left_amount_executed: Amount,
    #[serde(with = "rust_decimal::serde::float")]
    pub right_amount_executed: Quantity,
    #[serde(with = "rust_decimal::serde::float")]
    pub commission: Amount,
    #[serde(with = "rust_decimal::serde::float")]
    pub rate: Price,
    #[serde(with = "rust_decimal::serde::float")]
    pub rate_executed: Price,
    pub side: Side,
}

impl MakedOrder {
    /// Order accepted by the exchange with nothing but its id known
    pub fn pending(id: impl Into<OrderId>, side: Side) -> Self {
        Self {
            id: id.into(),
            status: Status::NotFilled,
            closed: false,
            left_amount: Decimal::ZERO,
            right_amount: Decimal::ZERO,
            left_amount_executed: Decimal::ZERO,
            right_amount_executed: Decimal::ZERO,
            commission: Decimal::ZERO,
            rate: Decimal::ZERO,
            rate_executed: Decimal::ZERO,
            side,
        }
    }

    /// Freshly placed limit order with known amount and price
    ///
    /// Fails if the counter-value `amount * price` is not representable.
    pub fn placed(
        id: impl Into<OrderId>,
        side: Side,
        amount: Quantity,
        price: Price,
    ) -> DomainResult<Self> {
        Ok(Self {
            left_amount: checked_mul("leftAmount", amount, price)?,
            right_amount: amount,
            rate: price,
            ..Self::pending(id, side)
        })
    }

    /// Requested quantity (zero while unknown)
    pub fn requested(&self) -> Quantity {
        self.right_amount
    }

    /// Executed quantity
    pub fn executed(&self) -> Quantity {
        self.right_amount_executed
    }

    /// Quantity still to execute
    pub fn remaining(&self) -> Quantity {
        (self.right_amount - self.right_amount_executed).max(Decimal::ZERO)
    }

    /// Returns true if no further state change is expected
    pub fn is_terminal(&self) -> bool {
        self.closed || self.status.is_filled()
    }

    /// Record cumulative execution and advance the status.
    ///
    /// Executed amounts are cumulative and may never decrease or exceed the
    /// requested quantity. A fully executed order is closed.
    pub fn apply_execution(
        &mut self,
        right_executed: Quantity,
        left_executed: Amount,
    ) -> DomainResult<Status> {
        if self.closed {
            return Err(DomainError::OrderClosed {
                id: self.id.clone(),
                status: self.status,
            });
        }
        if right_executed < self.right_amount_executed
            || left_executed < self.left_amount_executed
        {
            return Err(DomainError::ExecutionRegression {
                id: self.id.clone(),
            });
        }
        if self.right_amount > Decimal::ZERO && right_executed > self.right_amount {
            return Err(DomainError::OverFill {
                id: self.id.clone(),
                requested: self.right_amount,
                executed: right_executed,
            });
        }

        if right_executed > Decimal::ZERO {
            self.rate_executed = left_executed
                .checked_div(right_executed)
                .ok_or(DomainError::Overflow {
                    field: "rateExecuted",
                })?;
        }
        self.right_amount_executed = right_executed;
        self.left_amount_executed = left_executed;
        self.status = Status::from_progress(self.right_amount, right_executed);
        if self.status.is_filled() {
            self.closed = true;
        }
        Ok(self.status)
    }

    /// Take the order off the book.
    ///
    /// Keeps the fill status as is: a cancelled order that never executed
    /// stays `NotFilled`. Cancelling a filled or already closed order fails.
    pub fn cancel(&mut self) -> DomainResult<()> {
        if self.is_terminal() {
            return Err(DomainError::OrderClosed {
                id: self.id.clone(),
                status: self.status,
            });
        }
        self.closed = true;
        Ok(())
    }

    /// Accept a freshly polled snapshot of this order.
    ///
    /// The snapshot replaces the local state only if it does not move the
    /// order backwards: status, executed quantity and `closed` are monotonic.
    pub fn reconcile(&mut self, observed: MakedOrder) -> DomainResult<()> {
        if observed.id != self.id {
            return Err(DomainError::IdMismatch {
                expected: self.id.clone(),
                observed: observed.id,
            });
        }
        if observed.status < self.status {
            return Err(DomainError::StatusRegression {
                id: self.id.clone(),
                from: self.status,
                to: observed.status,
            });
        }
        if observed.right_amount_executed < self.right_amount_executed
            || (self.closed && !observed.closed)
        {
            return Err(DomainError::ExecutionRegression {
                id: self.id.clone(),
            });
        }

        *self = observed;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_pending_order_is_not_an_error_state() {
        let order = MakedOrder::pending("42", Side::Buy);
        assert_eq!(order.status, Status::NotFilled);
        assert!(!order.closed);
        assert_eq!(order.requested(), dec!(0));
        assert!(!order.is_terminal());
    }

    #[test]
    fn test_placed_legs() {
        let order = MakedOrder::placed("1", Side::Buy, dec!(2), dec!(0.05)).unwrap();
        assert_eq!(order.right_amount, dec!(2));
        assert_eq!(order.left_amount, dec!(0.10));
        assert_eq!(order.rate, dec!(0.05));
    }

    #[test]
    fn test_unrepresentable_notional_is_an_error() {
        assert_eq!(
            MakedOrder::placed("1", Side::Buy, Decimal::MAX, dec!(2)),
            Err(DomainError::Overflow {
                field: "leftAmount"
            })
        );
    }

    #[test]
    fn test_lifecycle_progression() {
        let mut order = MakedOrder::placed("1", Side::Sell, dec!(2), dec!(10)).unwrap();

        assert_eq!(
            order.apply_execution(dec!(0.5), dec!(5)).unwrap(),
            Status::PartiallyFilled
        );
        assert!(!order.closed);
        assert_eq!(order.remaining(), dec!(1.5));

        assert_eq!(
            order.apply_execution(dec!(2), dec!(21)).unwrap(),
            Status::Filled
        );
        assert!(order.closed);
        assert_eq!(order.rate_executed, dec!(10.5));
    }

    #[test]
    fn test_execution_cannot_regress_or_overfill() {
        let mut order = MakedOrder::placed("1", Side::Buy, dec!(2), dec!(10)).unwrap();
        order.apply_execution(dec!(1), dec!(10)).unwrap();

        assert!(matches!(
            order.apply_execution(dec!(0.5), dec!(5)),
            Err(DomainError::ExecutionRegression { .. })
        ));
        assert!(matches!(
            order.apply_execution(dec!(3), dec!(30)),
            Err(DomainError::OverFill { .. })
        ));
    }

    #[test]
    fn test_cancel_keeps_status() {
        let mut order = MakedOrder::placed("7", Side::Buy, dec!(1), dec!(10)).unwrap();
        order.cancel().unwrap();
        assert!(order.closed);
        assert_eq!(order.status, Status::NotFilled);

        // second cancel is a reportable failure
        assert!(matches!(
            order.cancel(),
            Err(DomainError::OrderClosed { .. })
        ));
    }

    #[test]
    fn test_cancel_filled_order_fails() {
        let mut order = MakedOrder::placed("123", Side::Buy, dec!(1), dec!(10)).unwrap();
        order.apply_execution(dec!(1), dec!(10)).unwrap();
        assert_eq!(
            order.cancel(),
            Err(DomainError::OrderClosed {
                id: "123".to_string(),
                status: Status::Filled
            })
        );
    }

    #[test]
    fn test_reconcile_is_monotonic() {
        let mut local = MakedOrder::placed("9", Side::Buy, dec!(2), dec!(10)).unwrap();
        let mut filled = local.clone();
        filled.apply_execution(dec!(2), dec!(20)).unwrap();

        local.reconcile(filled.clone()).unwrap();
        assert_eq!(local, filled);

        // idempotent
        local.reconcile(filled.clone()).unwrap();
        assert_eq!(local, filled);

        let stale = MakedOrder::placed("9", Side::Buy, dec!(2), dec!(10)).unwrap();
        assert!(matches!(
            local.reconcile(stale),
            Err(DomainError::StatusRegression {
                from: Status::Filled,
                to: Status::NotFilled,
                ..
            })
        ));
        assert_eq!(local.status, Status::Filled);
    }

    #[test]
    fn test_reconcile_rejects_foreign_snapshot() {
        let mut local = MakedOrder::pending("1", Side::Sell);
        let other = MakedOrder::pending("2", Side::Sell);
        assert!(matches!(
            local.reconcile(other),
            Err(DomainError::IdMismatch { .. })
        ));
    }

    #[test]
    fn test_wire_format() {
        let order = MakedOrder::placed("abc", Side::Sell, dec!(1), dec!(2)).unwrap();
        let json = serde_json::to_value(&order).unwrap();
        for key in [
            "id",
            "status",
            "closed",
            "leftAmount",
            "rightAmount",
            "leftAmountExecuted",
            "rightAmountExecuted",
            "commission",
            "rate",
            "rateExecuted",
            "side",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert_eq!(json["status"], "NotFilled");
        assert_eq!(json["side"], "SELL");
        assert_eq!(json["leftAmount"], 2.0);
    }
}
