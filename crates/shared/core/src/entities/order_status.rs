use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Fill progress of a placed order
///
/// Variants are declared in lifecycle order, so `Ord` reflects progress:
/// `NotFilled < PartiallyFilled < Filled`. Whether the order still rests on
/// the book is tracked separately by `MakedOrder::closed`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum Status {
    /// Nothing executed yet
    #[default]
    NotFilled,
    /// Some, but not all, of the requested amount executed
    PartiallyFilled,
    /// Requested amount fully executed
    #[serde(rename = "FILLED")]
    Filled,
}

impl Status {
    /// Derive the status from requested and executed amounts.
    ///
    /// A zero `requested` means the requested amount is not known yet
    /// (order accepted, details pending), so any execution counts as partial.
    pub fn from_progress(requested: Decimal, executed: Decimal) -> Self {
        if executed <= Decimal::ZERO {
            Status::NotFilled
        } else if requested > Decimal::ZERO && executed >= requested {
            Status::Filled
        } else {
            Status::PartiallyFilled
        }
    }

    /// Returns true once the order has fully executed
    pub fn is_filled(&self) -> bool {
        matches!(self, Status::Filled)
    }

    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::NotFilled => "NotFilled",
            Status::PartiallyFilled => "PartiallyFilled",
            Status::Filled => "FILLED",
        }
    }
}
