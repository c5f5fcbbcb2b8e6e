//! Account Store module
//!
//! Persistence layer for account balances.
//! Holds the balance tree in memory and writes it to a JSON accounts file.

mod account_store;
mod error;

pub use account_store::{AccountStore, BalanceTree};
pub use error::StoreError;
