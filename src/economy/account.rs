//! Account
//!
//! Per-player account handle. Holds no balances itself: every read and
//! write goes through the economy's account store, keyed by the account
//! identifier and the currency balance key.
//!
//! Each mutating operation runs under the store lock from the first read
//! until the accounts file has been written. If the write fails, the
//! in-memory change is undone and the operation reports `Failed`. The
//! result is published on the event channel after the lock is released,
//! then returned.

use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::{
    truncate_to_cents, ContextSet, Currency, ResultType, TransactionResult, TransactionType,
    TransferResult,
};
use crate::profile::resolve_display_name;
use crate::store::AccountStore;

use super::EconomyService;

#[derive(Clone)]
pub struct Account {
    id: Uuid,
    economy: EconomyService,
}

/// Balance writes made during one operation, in order
#[derive(Default)]
struct UndoLog {
    entries: Vec<(Uuid, String, Option<Decimal>)>,
}

impl UndoLog {
    fn write(&mut self, store: &mut AccountStore, account_id: Uuid, key: &str, value: Decimal) {
        let previous = store.set(account_id, key, value);
        self.entries.push((account_id, key.to_string(), previous));
    }

    fn rollback(self, store: &mut AccountStore) {
        for (account_id, key, previous) in self.entries.into_iter().rev() {
            store.restore(account_id, &key, previous);
        }
    }

    /// Persist the writes, undoing them if the accounts file cannot be saved
    async fn commit(self, store: &mut AccountStore) -> ResultType {
        match store.save().await {
            Ok(()) => ResultType::Success,
            Err(e) => {
                tracing::error!("Failed to persist balance change, rolling back: {}", e);
                self.rollback(store);
                ResultType::Failed
            }
        }
    }
}

/// Clamp a balance to the money cap, when one is set
fn apply_cap(balance: Decimal, cap: Option<Decimal>) -> Decimal {
    match cap {
        Some(cap) if balance > cap => truncate_to_cents(cap),
        _ => balance,
    }
}

impl Account {
    pub(super) fn new(id: Uuid, economy: EconomyService) -> Self {
        Self { id, economy }
    }

    // =========================================================================
    // Identity
    // =========================================================================

    pub fn identifier(&self) -> String {
        self.id.to_string()
    }

    pub fn unique_id(&self) -> Uuid {
        self.id
    }

    pub fn active_contexts(&self) -> ContextSet {
        ContextSet::new()
    }

    /// Player name from the profile lookup, or `"ERROR"` when it fails
    pub async fn display_name(&self) -> String {
        resolve_display_name(self.economy.profiles(), self.id).await
    }

    // =========================================================================
    // Balance accessors
    // =========================================================================

    pub fn get_default_balance(&self, _currency: &Currency) -> Decimal {
        self.economy.config().starting_balance
    }

    /// Whether a balance entry exists for this currency
    pub async fn has_balance(&self, currency: &Currency, _contexts: &ContextSet) -> bool {
        self.economy
            .lock_store()
            .await
            .get(&self.id, &currency.balance_key())
            .is_some()
    }

    /// Stored balance, or zero when there is no entry
    pub async fn get_balance(&self, currency: &Currency, _contexts: &ContextSet) -> Decimal {
        self.economy
            .lock_store()
            .await
            .get(&self.id, &currency.balance_key())
            .unwrap_or(Decimal::ZERO)
    }

    /// Balances are not tracked per context, so this is always empty.
    pub fn get_balances(&self, _contexts: &ContextSet) -> HashMap<Currency, Decimal> {
        HashMap::new()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Overwrite an existing balance entry with `amount`, truncated to cents
    pub async fn set_balance(
        &self,
        currency: &Currency,
        amount: Decimal,
        contexts: &ContextSet,
    ) -> TransactionResult {
        let result = {
            let mut store = self.economy.lock_store().await;
            let key = currency.balance_key();

            if amount < Decimal::ZERO || store.get(&self.id, &key).is_none() {
                ResultType::Failed
            } else {
                let mut undo = UndoLog::default();
                undo.write(&mut store, self.id, &key, truncate_to_cents(amount));
                undo.commit(&mut store).await
            }
        };

        self.finish(currency, amount, contexts, result, TransactionType::Deposit)
    }

    /// Set the balance to zero. The caller's contexts are not carried into the result.
    pub async fn reset_balance(&self, currency: &Currency, _contexts: &ContextSet) -> TransactionResult {
        self.set_balance(currency, Decimal::ZERO, &ContextSet::new())
            .await
    }

    /// Bulk reset is not supported: nothing is changed and a failure is
    /// reported for the default currency.
    pub fn reset_balances(&self, contexts: &ContextSet) -> HashMap<Currency, TransactionResult> {
        let currency = self.economy.default_currency().clone();
        let result = self.finish(
            &currency,
            Decimal::ZERO,
            contexts,
            ResultType::Failed,
            TransactionType::Withdraw,
        );

        HashMap::from([(currency, result)])
    }

    /// Add `amount` to an existing balance entry, clamping to the money cap
    pub async fn deposit(
        &self,
        currency: &Currency,
        amount: Decimal,
        contexts: &ContextSet,
    ) -> TransactionResult {
        let result = {
            let mut store = self.economy.lock_store().await;
            let key = currency.balance_key();

            match store.get(&self.id, &key) {
                Some(current) if amount >= Decimal::ZERO => match current.checked_add(amount) {
                    Some(total) => {
                        let balance = apply_cap(
                            truncate_to_cents(total),
                            self.economy.config().effective_cap(),
                        );
                        let mut undo = UndoLog::default();
                        undo.write(&mut store, self.id, &key, balance);
                        undo.commit(&mut store).await
                    }
                    None => {
                        tracing::warn!(account_id = %self.id, "Deposit overflows balance");
                        ResultType::Failed
                    }
                },
                _ => ResultType::Failed,
            }
        };

        self.finish(currency, amount, contexts, result, TransactionType::Deposit)
    }

    /// Take `amount` from an existing balance entry if it covers it
    pub async fn withdraw(
        &self,
        currency: &Currency,
        amount: Decimal,
        contexts: &ContextSet,
    ) -> TransactionResult {
        let result = {
            let mut store = self.economy.lock_store().await;
            let key = currency.balance_key();

            match store.get(&self.id, &key) {
                Some(current) if amount >= Decimal::ZERO => match current.checked_sub(amount) {
                    Some(remaining) if remaining >= Decimal::ZERO => {
                        let mut undo = UndoLog::default();
                        undo.write(&mut store, self.id, &key, truncate_to_cents(remaining));
                        undo.commit(&mut store).await
                    }
                    Some(_) => ResultType::AccountNoFunds,
                    None => ResultType::Failed,
                },
                _ => ResultType::Failed,
            }
        };

        // Only successful withdrawals are typed Withdraw.
        let transaction_type = if result.is_success() {
            TransactionType::Withdraw
        } else {
            TransactionType::Deposit
        };

        self.finish(currency, amount, contexts, result, transaction_type)
    }

    /// Move `amount` from this account to `to` in one step.
    ///
    /// Either both balances change or neither does. On success the withdraw
    /// leg, the deposit leg and then the transfer itself are published.
    pub async fn transfer(
        &self,
        to: &Account,
        currency: &Currency,
        amount: Decimal,
        contexts: &ContextSet,
    ) -> TransferResult {
        if !self.economy.same_economy(&to.economy) {
            tracing::warn!(
                from = %self.id,
                to = %to.id,
                "Transfer between accounts of different economies"
            );
            return self.finish_transfer(to, currency, amount, contexts, ResultType::Failed);
        }

        let result = {
            let mut store = self.economy.lock_store().await;
            self.move_funds(&mut store, to.id, &currency.balance_key(), amount)
                .await
        };

        if result.is_success() {
            let publisher = self.economy.publisher();
            publisher.publish(TransactionResult::new(
                self.id,
                currency.clone(),
                amount,
                contexts.clone(),
                ResultType::Success,
                TransactionType::Withdraw,
            ));
            publisher.publish(TransactionResult::new(
                to.id,
                currency.clone(),
                amount,
                contexts.clone(),
                ResultType::Success,
                TransactionType::Deposit,
            ));
        }

        self.finish_transfer(to, currency, amount, contexts, result)
    }

    async fn move_funds(
        &self,
        store: &mut AccountStore,
        to: Uuid,
        key: &str,
        amount: Decimal,
    ) -> ResultType {
        let Some(from_balance) = store.get(&self.id, key) else {
            return ResultType::Failed;
        };
        if amount < Decimal::ZERO {
            return ResultType::Failed;
        }

        let remaining = match from_balance.checked_sub(amount) {
            Some(remaining) if remaining >= Decimal::ZERO => remaining,
            Some(_) => return ResultType::AccountNoFunds,
            None => return ResultType::Failed,
        };

        if store.get(&to, key).is_none() {
            tracing::debug!(from = %self.id, to = %to, "Transfer destination has no balance entry");
            return ResultType::Failed;
        }

        let mut undo = UndoLog::default();
        undo.write(store, self.id, key, truncate_to_cents(remaining));

        // Read after the withdrawal: source and destination may be the same account.
        let Some(total) = store
            .get(&to, key)
            .and_then(|balance| balance.checked_add(amount))
        else {
            undo.rollback(store);
            return ResultType::Failed;
        };

        let balance = apply_cap(truncate_to_cents(total), self.economy.config().effective_cap());
        undo.write(store, to, key, balance);
        undo.commit(store).await
    }

    fn finish(
        &self,
        currency: &Currency,
        amount: Decimal,
        contexts: &ContextSet,
        result: ResultType,
        transaction_type: TransactionType,
    ) -> TransactionResult {
        tracing::debug!(
            account_id = %self.id,
            currency = %currency,
            amount = %amount,
            result = ?result,
            transaction_type = ?transaction_type,
            "Balance operation finished"
        );

        let transaction = TransactionResult::new(
            self.id,
            currency.clone(),
            amount,
            contexts.clone(),
            result,
            transaction_type,
        );
        self.economy.publisher().publish(transaction.clone());
        transaction
    }

    fn finish_transfer(
        &self,
        to: &Account,
        currency: &Currency,
        amount: Decimal,
        contexts: &ContextSet,
        result: ResultType,
    ) -> TransferResult {
        tracing::debug!(
            from = %self.id,
            to = %to.id,
            currency = %currency,
            amount = %amount,
            result = ?result,
            "Transfer finished"
        );

        let transfer = TransferResult::new(
            self.id,
            to.id,
            currency.clone(),
            amount,
            contexts.clone(),
            result,
        );
        self.economy.publisher().publish(transfer.clone());
        transfer
    }
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account").field("id", &self.id).finish()
    }
}
