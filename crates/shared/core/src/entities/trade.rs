use serde::{Deserialize, Serialize};

use super::Side;
use super::candle::first_descending;
use crate::error::{DomainError, DomainResult};
use crate::values::{Price, Quantity, UnixTime};

/// Public market trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub time: UnixTime,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Quantity,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Price,
    pub side: Side,
}

impl Trade {
    pub fn new(time: UnixTime, amount: Quantity, price: Price, side: Side) -> Self {
        Self {
            time,
            amount,
            price,
            side,
        }
    }

    /// Returns the notional value of the trade (price * amount)
    pub fn notional(&self) -> rust_decimal::Decimal {
        self.price * self.amount
    }
}

/// Trades over the trailing window, oldest first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeHistory {
    pub history: Vec<Trade>,
}

impl TradeHistory {
    pub fn new(history: Vec<Trade>) -> Self {
        Self { history }
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn first_time(&self) -> Option<UnixTime> {
        self.history.first().map(|t| t.time)
    }

    pub fn last_time(&self) -> Option<UnixTime> {
        self.history.last().map(|t| t.time)
    }

    /// Check the chronological ordering
    pub fn validate(&self) -> DomainResult<()> {
        match first_descending(self.history.iter().map(|t| t.time)) {
            Some(index) => Err(DomainError::NonChronological {
                series: "history",
                index,
            }),
            None => Ok(()),
        }
    }
}
