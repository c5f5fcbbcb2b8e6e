//! Domain module
//!
//! Core domain types: amounts, currencies, contexts and transaction results.

pub mod amount;
pub mod context;
pub mod currency;
pub mod error;
pub mod events;

pub use amount::{truncate_to_cents, Amount, AmountError, FRACTION_DIGITS};
pub use context::{Context, ContextSet};
pub use currency::Currency;
pub use error::DomainError;
pub use events::{EconomyEvent, ResultType, TransactionResult, TransactionType, TransferResult};
