use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{DomainError, DomainResult};
use crate::values::{Amount, Asset, checked_add};

/// Balances keyed by asset ticker
pub type Balances = HashMap<Asset, Balance>;

/// Holdings of a single asset
///
/// `free + locked` is the total held. Both parts are never negative and the
/// total always fits the decimal range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Balance {
    /// Available for new orders
    #[serde(with = "rust_decimal::serde::float")]
    pub free: Amount,
    /// Reserved by open orders or pending withdrawals
    #[serde(with = "rust_decimal::serde::float")]
    pub locked: Amount,
}

impl Balance {
    /// Create a balance, rejecting negative parts
    pub fn new(free: Amount, locked: Amount) -> DomainResult<Self> {
        ensure_not_negative("free", free)?;
        ensure_not_negative("locked", locked)?;
        checked_add("total", free, locked)?;
        Ok(Self { free, locked })
    }

    /// Balance with everything available
    pub fn available(free: Amount) -> DomainResult<Self> {
        Self::new(free, Decimal::ZERO)
    }

    pub fn total(&self) -> Amount {
        self.free + self.locked
    }

    pub fn is_empty(&self) -> bool {
        self.total().is_zero()
    }

    /// Move `amount` from free to locked
    pub fn lock(&mut self, asset: &str, amount: Amount) -> DomainResult<()> {
        self.ensure_free(asset, amount)?;
        self.free -= amount;
        self.locked += amount;
        Ok(())
    }

    /// Move up to `amount` from locked back to free
    pub fn release(&mut self, amount: Amount) {
        let amount = amount.min(self.locked).max(Decimal::ZERO);
        self.locked -= amount;
        self.free += amount;
    }

    /// Remove up to `amount` from the locked part (it left the account)
    pub fn consume_locked(&mut self, amount: Amount) {
        let amount = amount.min(self.locked).max(Decimal::ZERO);
        self.locked -= amount;
    }

    /// Remove `amount` from the free part
    pub fn debit(&mut self, asset: &str, amount: Amount) -> DomainResult<()> {
        self.ensure_free(asset, amount)?;
        self.free -= amount;
        Ok(())
    }

    /// Add `amount` to the free part
    pub fn credit(&mut self, amount: Amount) -> DomainResult<()> {
        let amount = amount.max(Decimal::ZERO);
        checked_add("total", self.total(), amount)?;
        self.free += amount;
        Ok(())
    }

    fn ensure_free(&self, asset: &str, amount: Amount) -> DomainResult<()> {
        ensure_not_negative("amount", amount)?;
        if amount > self.free {
            return Err(DomainError::InsufficientBalance {
                asset: asset.to_string(),
                required: amount,
                available: self.free,
            });
        }
        Ok(())
    }
}

fn ensure_not_negative(field: &'static str, value: Decimal) -> DomainResult<()> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(DomainError::Negative { field, value });
    }
    Ok(())
}
