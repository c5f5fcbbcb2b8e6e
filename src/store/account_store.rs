//! Account Store
//!
//! Balance tree keyed by account identifier, then by currency balance key.
//! The whole tree is rewritten on every save: it is serialized to a
//! temporary file which then replaces the accounts file with a rename.

use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use super::StoreError;

/// identifier -> balance key -> balance
pub type BalanceTree = BTreeMap<Uuid, BTreeMap<String, Decimal>>;

#[derive(Debug, Default)]
pub struct AccountStore {
    /// Accounts file. `None` keeps the store in memory only.
    path: Option<PathBuf>,
    tree: BalanceTree,
}

impl AccountStore {
    /// Create a store that is never written to disk
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open the accounts file at `path`.
    ///
    /// A missing file yields an empty store; the file is created on the first
    /// save. Missing parent directories are created here.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::io(parent, e))?;
        }

        let tree = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => BalanceTree::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BalanceTree::new(),
            Err(e) => return Err(StoreError::io(&path, e)),
        };

        tracing::info!(
            "Loaded {} accounts from {}",
            tree.len(),
            path.display()
        );

        Ok(Self {
            path: Some(path),
            tree,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn contains_account(&self, account_id: &Uuid) -> bool {
        self.tree.contains_key(account_id)
    }

    pub fn account_count(&self) -> usize {
        self.tree.len()
    }

    /// All balances stored for one account
    pub fn balances(&self, account_id: &Uuid) -> Option<&BTreeMap<String, Decimal>> {
        self.tree.get(account_id)
    }

    /// Read a single balance entry
    pub fn get(&self, account_id: &Uuid, key: &str) -> Option<Decimal> {
        self.tree
            .get(account_id)
            .and_then(|balances| balances.get(key))
            .copied()
    }

    /// Write a balance entry, returning the previous value for rollback
    pub fn set(&mut self, account_id: Uuid, key: &str, value: Decimal) -> Option<Decimal> {
        self.tree
            .entry(account_id)
            .or_default()
            .insert(key.to_string(), value)
    }

    /// Put back a value returned by [`AccountStore::set`].
    ///
    /// `None` removes the entry, and the account node with it once empty.
    pub fn restore(&mut self, account_id: Uuid, key: &str, previous: Option<Decimal>) {
        match previous {
            Some(value) => {
                self.set(account_id, key, value);
            }
            None => {
                if let Some(balances) = self.tree.get_mut(&account_id) {
                    balances.remove(key);
                    if balances.is_empty() {
                        self.tree.remove(&account_id);
                    }
                }
            }
        }
    }

    /// Persist the whole tree to the accounts file.
    pub async fn save(&self) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let json = serde_json::to_vec_pretty(&self.tree)?;
        let tmp_path = path.with_extension("tmp");

        let mut file = tokio::fs::File::create(&tmp_path)
            .await
            .map_err(|e| StoreError::io(&tmp_path, e))?;
        file.write_all(&json)
            .await
            .map_err(|e| StoreError::io(&tmp_path, e))?;
        file.sync_all()
            .await
            .map_err(|e| StoreError::io(&tmp_path, e))?;
        drop(file);

        tokio::fs::rename(&tmp_path, path)
            .await
            .map_err(|e| StoreError::io(path, e))?;

        tracing::trace!("Saved {} accounts to {}", self.tree.len(), path.display());

        Ok(())
    }
}
