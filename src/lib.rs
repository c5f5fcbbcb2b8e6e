//! Total Economy Library
//!
//! Re-exports modules for integration testing and external use.

pub mod api;
pub mod domain;
pub mod economy;
pub mod profile;
pub mod store;

pub mod config;
mod error;

pub use config::{Config, EconomyConfig};
pub use error::{AppError, AppResult};
pub use domain::{Amount, AmountError, Context, ContextSet, Currency, DomainError};
pub use domain::{EconomyEvent, ResultType, TransactionResult, TransactionType, TransferResult};
pub use economy::{Account, EconomyService, EventPublisher};
pub use profile::{InMemoryProfiles, ProfileError, ProfileLookup};
