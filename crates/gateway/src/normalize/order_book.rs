use rust_decimal::Decimal;
use xbridge_core::{DomainError, DomainResult, Order, OrderBook};

/// Bring a raw book into canonical shape
///
/// Drops empty levels, sorts asks ascending and bids descending by price
/// (stable, so equal prices keep venue order) and checks every book
/// invariant. A crossed book is reported, never reordered away.
pub fn normalize_order_book(raw: OrderBook) -> DomainResult<OrderBook> {
    let mut asks = retain_levels(raw.asks)?;
    let mut bids = retain_levels(raw.bids)?;

    asks.sort_by(|a, b| a.price.cmp(&b.price));
    bids.sort_by(|a, b| b.price.cmp(&a.price));

    let book = OrderBook { asks, bids };
    book.validate()?;
    Ok(book)
}

fn retain_levels(levels: Vec<Order>) -> DomainResult<Vec<Order>> {
    let mut kept = Vec::with_capacity(levels.len());
    for level in levels {
        if level.quantity < Decimal::ZERO {
            return Err(DomainError::Negative {
                field: "quantity",
                value: level.quantity,
            });
        }
        if !level.quantity.is_zero() {
            kept.push(level);
        }
    }
    Ok(kept)
}
