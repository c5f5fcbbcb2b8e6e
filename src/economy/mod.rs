//! Economy module
//!
//! The economy service owns the account store and hands out account
//! handles. All balance operations run through those handles.

mod account;
mod publisher;
mod service;

pub use account::Account;
pub use publisher::EventPublisher;
pub use service::EconomyService;
