//! xbridge Core Domain
//!
//! Pure domain types for the uniform exchange client model.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod entities;
pub mod error;
pub mod instruments;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{
    // Account state
    Balance,
    Balances,
    // Market data
    Color,
    Decimals,
    KLine,
    // Order lifecycle
    MakedOrder,
    Order,
    OrderBook,
    PriceCandle,
    Side,
    Status,
    Trade,
    TradeHistory,
    VolumeCandle,
};
pub use error::{DomainError, DomainResult};
pub use instruments::{CurrencyPair, PairNotation};
pub use values::{
    Amount, Asset, OrderId, Price, Quantity, Symbol, UnixTime, WithdrawalId, checked_add,
    checked_mul,
};
