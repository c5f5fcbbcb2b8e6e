//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure. Balance
//! operations themselves never fail with these: they report outcomes through
//! `ResultType`. These cover account management and input resolution.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// An account already exists for this identifier
    #[error("Account already exists: {0}")]
    AccountExists(Uuid),

    /// No account exists for this identifier
    #[error("Account not found: {0}")]
    AccountNotFound(Uuid),

    /// Currency name does not match any registered currency
    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),

    /// Invalid amount (negative or malformed)
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
}

impl DomainError {
    /// Check if this is a lookup failure (the resource is missing)
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::AccountNotFound(_))
    }
}

impl From<super::AmountError> for DomainError {
    fn from(err: super::AmountError) -> Self {
        Self::InvalidAmount(err.to_string())
    }
}
