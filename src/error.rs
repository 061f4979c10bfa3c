//! Error types for ledger operations
//!
//! Every mutator validates and fails fast before touching aggregate state;
//! a rejected mutation leaves the profile unchanged. All failures surface
//! as typed variants so callers can react to each case.

use rust_decimal::Decimal;
use thiserror::Error;

/// Failures raised by the ledger core and the totalizer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("profile name must not be blank")]
    EmptyName,

    #[error("quantity must be greater than zero, got {0}")]
    InvalidQuantity(Decimal),

    #[error("amount must not be negative, got {0}")]
    InvalidAmount(Decimal),

    #[error("profile {0} not found")]
    ProfileNotFound(i64),

    #[error("line {0} not found in profile")]
    LineNotFound(i64),

    #[error("line {line_id}: selling {requested} units but only {available} held")]
    Oversell {
        line_id: i64,
        requested: Decimal,
        available: Decimal,
    },

    #[error("profiles use different currencies: {0} and {1}")]
    MixedCurrency(String, String),
}

/// Result type alias for ledger core operations
pub type Result<T> = std::result::Result<T, LedgerError>;
