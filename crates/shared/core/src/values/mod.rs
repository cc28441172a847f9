use rust_decimal::Decimal;

use crate::error::{DomainError, DomainResult};

/// Price value, quoted in the left currency per unit of the right currency
pub type Price = Decimal;

/// Quantity value, denominated in the right currency of a pair
pub type Quantity = Decimal;

/// Generic amount of a single asset (balances, withdrawals)
pub type Amount = Decimal;

/// UNIX time in seconds
pub type UnixTime = i64;

/// Asset ticker in upper case, e.g. "BTC"
pub type Asset = String;

/// Canonical pair identifier, e.g. "BTC_ETH"
pub type Symbol = String;

/// Exchange-assigned order identifier
pub type OrderId = String;

/// Exchange-assigned withdrawal request identifier
pub type WithdrawalId = String;

/// `a * b`, failing instead of leaving the decimal range
pub fn checked_mul(field: &'static str, a: Decimal, b: Decimal) -> DomainResult<Decimal> {
    a.checked_mul(b).ok_or(DomainError::Overflow { field })
}

/// `a + b`, failing instead of leaving the decimal range
pub fn checked_add(field: &'static str, a: Decimal, b: Decimal) -> DomainResult<Decimal> {
    a.checked_add(b).ok_or(DomainError::Overflow { field })
}
