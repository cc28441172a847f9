use rust_decimal::Decimal;
use thiserror::Error;

use crate::entities::Status;

/// Domain-level errors raised by the pure model
///
/// These are data-integrity and lifecycle violations. Transport concerns
/// never appear here; connectors convert them at the port boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    #[error("{field} {value} exceeds {decimals} decimal places")]
    Precision {
        field: &'static str,
        value: Decimal,
        decimals: u32,
    },

    #[error("{field} supports at most 28 decimal places, got {decimals}")]
    Scale { field: &'static str, decimals: u32 },

    #[error("{field} overflows the decimal range")]
    Overflow { field: &'static str },

    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: Decimal },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: Decimal },

    #[error("Crossed book: best ask {best_ask} <= best bid {best_bid}")]
    CrossedBook { best_ask: Decimal, best_bid: Decimal },

    #[error("{side} are not sorted at level {index}")]
    UnsortedBook { side: &'static str, index: usize },

    #[error("{series} is not chronological at index {index}")]
    NonChronological { series: &'static str, index: usize },

    #[error("Candle series mismatch: {0}")]
    CandleMismatch(String),

    #[error("Order {id} regressed from {from:?} to {to:?}")]
    StatusRegression { id: String, from: Status, to: Status },

    #[error("Order {id} execution went backwards")]
    ExecutionRegression { id: String },

    #[error("Order {id} executed {executed} exceeds requested {requested}")]
    OverFill {
        id: String,
        requested: Decimal,
        executed: Decimal,
    },

    #[error("Order {id} is already closed ({status:?})")]
    OrderClosed { id: String, status: Status },

    #[error("Snapshot for order {observed} does not match order {expected}")]
    IdMismatch { expected: String, observed: String },

    #[error("Insufficient {asset}: required {required}, available {available}")]
    InsufficientBalance {
        asset: String,
        required: Decimal,
        available: Decimal,
    },
}

impl DomainError {
    /// Returns true for data-integrity faults (precision, sorting, crossing)
    /// as opposed to order lifecycle or account state failures
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            DomainError::InvalidSymbol(_)
                | DomainError::Precision { .. }
                | DomainError::Scale { .. }
                | DomainError::Overflow { .. }
                | DomainError::NonPositive { .. }
                | DomainError::Negative { .. }
                | DomainError::CrossedBook { .. }
                | DomainError::UnsortedBook { .. }
                | DomainError::NonChronological { .. }
                | DomainError::CandleMismatch(_)
                | DomainError::StatusRegression { .. }
                | DomainError::ExecutionRegression { .. }
                | DomainError::OverFill { .. }
                | DomainError::IdMismatch { .. }
        )
    }
}

pub type DomainResult<T> = std::result::Result<T, DomainError>;
