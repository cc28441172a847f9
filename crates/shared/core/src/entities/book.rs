use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::values::{Price, Quantity};

/// A resting market order as seen in the book (price + quantity)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    #[serde(with = "rust_decimal::serde::float")]
    pub quantity: Quantity,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Price,
}

impl Order {
    pub fn new(price: Price, quantity: Quantity) -> Self {
        Self { quantity, price }
    }

    /// Value of the level in the left currency (price * quantity)
    pub fn notional(&self) -> Decimal {
        self.price * self.quantity
    }
}

/// Normalized order book snapshot
///
/// Invariants (checked by [`OrderBook::validate`]):
/// - asks sorted ascending by price, bids sorted descending by price
/// - every ask price is strictly above every bid price
/// - every price and quantity is positive
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBook {
    pub asks: Vec<Order>,
    pub bids: Vec<Order>,
}

impl OrderBook {
    /// Best ask (lowest sell order)
    pub fn best_ask(&self) -> Option<&Order> {
        self.asks.first()
    }

    /// Best bid (highest buy order)
    pub fn best_bid(&self) -> Option<&Order> {
        self.bids.first()
    }

    /// Spread between best ask and best bid
    pub fn spread(&self) -> Option<Price> {
        match (self.best_ask(), self.best_bid()) {
            (Some(ask), Some(bid)) => Some(ask.price - bid.price),
            _ => None,
        }
    }

    /// Mid price between best bid and ask
    pub fn mid_price(&self) -> Option<Price> {
        match (self.best_ask(), self.best_bid()) {
            (Some(ask), Some(bid)) => Some((ask.price + bid.price) / Decimal::TWO),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.asks.is_empty() && self.bids.is_empty()
    }

    /// Check every book invariant
    pub fn validate(&self) -> DomainResult<()> {
        for level in self.asks.iter().chain(self.bids.iter()) {
            ensure_positive("price", level.price)?;
            ensure_positive("quantity", level.quantity)?;
        }

        if let Some(index) = self.asks.windows(2).position(|w| w[0].price > w[1].price) {
            return Err(DomainError::UnsortedBook {
                side: "asks",
                index: index + 1,
            });
        }
        if let Some(index) = self.bids.windows(2).position(|w| w[0].price < w[1].price) {
            return Err(DomainError::UnsortedBook {
                side: "bids",
                index: index + 1,
            });
        }

        if let (Some(ask), Some(bid)) = (self.best_ask(), self.best_bid()) {
            if ask.price <= bid.price {
                return Err(DomainError::CrossedBook {
                    best_ask: ask.price,
                    best_bid: bid.price,
                });
            }
        }

        Ok(())
    }
}

pub(crate) fn ensure_positive(field: &'static str, value: Decimal) -> DomainResult<()> {
    if value <= Decimal::ZERO {
        return Err(DomainError::NonPositive { field, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn reference_book() -> OrderBook {
        OrderBook {
            asks: vec![Order::new(dec!(101), dec!(1)), Order::new(dec!(105), dec!(2))],
            bids: vec![Order::new(dec!(100), dec!(1)), Order::new(dec!(95), dec!(3))],
        }
    }

    #[test]
    fn test_reference_book_is_valid() {
        let book = reference_book();
        assert!(book.validate().is_ok());
        assert_eq!(book.spread(), Some(dec!(1)));
        assert_eq!(book.mid_price(), Some(dec!(100.5)));
    }

    #[test]
    fn test_unsorted_asks_rejected() {
        let mut book = reference_book();
        book.asks.reverse();
        assert_eq!(
            book.validate(),
            Err(DomainError::UnsortedBook {
                side: "asks",
                index: 1
            })
        );
    }

    #[test]
    fn test_crossed_book_rejected() {
        let mut book = reference_book();
        book.bids[0].price = dec!(101);
        assert!(matches!(
            book.validate(),
            Err(DomainError::CrossedBook { .. })
        ));
    }

    #[test]
    fn test_one_sided_book_is_valid() {
        let book = OrderBook {
            asks: vec![Order::new(dec!(10), dec!(1))],
            bids: vec![],
        };
        assert!(book.validate().is_ok());
        assert_eq!(book.spread(), None);
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let mut book = reference_book();
        book.bids[1].quantity = dec!(0);
        assert!(matches!(
            book.validate(),
            Err(DomainError::NonPositive {
                field: "quantity",
                ..
            })
        ));
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_value(reference_book()).unwrap();
        assert_eq!(json["asks"][0]["price"], 101.0);
        assert_eq!(json["bids"][1]["quantity"], 3.0);
    }
}
