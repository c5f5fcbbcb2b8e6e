//! Economy Service
//!
//! Owns the account store, the registered currencies, the event publisher
//! and the profile lookup. Creates and looks up accounts.

use rust_decimal::Decimal;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex, MutexGuard};
use uuid::Uuid;

use crate::config::EconomyConfig;
use crate::domain::{truncate_to_cents, Currency, DomainError, EconomyEvent};
use crate::error::AppResult;
use crate::profile::ProfileLookup;
use crate::store::{AccountStore, StoreError};

use super::{Account, EventPublisher};

/// Handle to the economy. Cheap to clone; clones share the same store.
#[derive(Clone)]
pub struct EconomyService {
    inner: Arc<Inner>,
}

struct Inner {
    store: Mutex<AccountStore>,
    config: EconomyConfig,
    currencies: Vec<Currency>,
    publisher: EventPublisher,
    profiles: Arc<dyn ProfileLookup>,
}

impl EconomyService {
    pub fn new(
        store: AccountStore,
        config: EconomyConfig,
        profiles: Arc<dyn ProfileLookup>,
    ) -> Self {
        let publisher = EventPublisher::new(config.event_channel_capacity);
        let currencies = config.currencies();

        Self {
            inner: Arc::new(Inner {
                store: Mutex::new(store),
                config,
                currencies,
                publisher,
                profiles,
            }),
        }
    }

    /// Load the accounts file and build the service around it
    pub async fn open(
        accounts_file: impl Into<PathBuf>,
        config: EconomyConfig,
        profiles: Arc<dyn ProfileLookup>,
    ) -> Result<Self, StoreError> {
        let store = AccountStore::open(accounts_file).await?;
        Ok(Self::new(store, config, profiles))
    }

    pub fn config(&self) -> &EconomyConfig {
        &self.inner.config
    }

    pub fn default_currency(&self) -> &Currency {
        &self.inner.config.currency
    }

    /// Registered currencies, default first
    pub fn currencies(&self) -> &[Currency] {
        &self.inner.currencies
    }

    /// Find a registered currency by singular or plural name, ignoring case
    pub fn currency(&self, name: &str) -> Option<&Currency> {
        self.inner.currencies.iter().find(|c| c.matches(name))
    }

    /// Resolve an optional currency name, falling back to the default
    pub fn resolve_currency(&self, name: Option<&str>) -> Result<&Currency, DomainError> {
        match name {
            None => Ok(self.default_currency()),
            Some(name) => self
                .currency(name)
                .ok_or_else(|| DomainError::UnknownCurrency(name.to_string())),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EconomyEvent> {
        self.inner.publisher.subscribe()
    }

    pub fn profiles(&self) -> &dyn ProfileLookup {
        self.inner.profiles.as_ref()
    }

    pub async fn has_account(&self, id: Uuid) -> bool {
        self.lock_store().await.contains_account(&id)
    }

    pub async fn account_count(&self) -> usize {
        self.lock_store().await.account_count()
    }

    /// Get a handle to an existing account
    pub async fn account(&self, id: Uuid) -> Option<Account> {
        if self.has_account(id).await {
            Some(Account::new(id, self.clone()))
        } else {
            None
        }
    }

    /// Create an account holding the starting balance in every registered currency
    pub async fn create_account(&self, id: Uuid) -> AppResult<Account> {
        let mut store = self.lock_store().await;

        if store.contains_account(&id) {
            return Err(DomainError::AccountExists(id).into());
        }

        let starting_balance = truncate_to_cents(self.inner.config.starting_balance);
        let keys: Vec<String> = self.inner.currencies.iter().map(Currency::balance_key).collect();
        let previous: Vec<Option<Decimal>> = keys
            .iter()
            .map(|key| store.set(id, key, starting_balance))
            .collect();

        if let Err(e) = store.save().await {
            for (key, value) in keys.iter().zip(previous).rev() {
                store.restore(id, key, value);
            }
            tracing::error!(account_id = %id, "Failed to persist new account: {}", e);
            return Err(e.into());
        }

        tracing::info!(
            account_id = %id,
            starting_balance = %starting_balance,
            "Account created"
        );

        Ok(Account::new(id, self.clone()))
    }

    /// Get an account, creating it first if needed
    pub async fn get_or_create_account(&self, id: Uuid) -> AppResult<Account> {
        match self.account(id).await {
            Some(account) => Ok(account),
            None => match self.create_account(id).await {
                // Lost a race with another creator
                Err(crate::AppError::Domain(DomainError::AccountExists(_))) => {
                    Ok(Account::new(id, self.clone()))
                }
                other => other,
            },
        }
    }

    pub(super) async fn lock_store(&self) -> MutexGuard<'_, AccountStore> {
        self.inner.store.lock().await
    }

    pub(super) fn publisher(&self) -> &EventPublisher {
        &self.inner.publisher
    }

    pub(super) fn same_economy(&self, other: &EconomyService) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for EconomyService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EconomyService")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}
