//! Transaction results and economy events
//!
//! Every balance operation produces an immutable result. The same result is
//! published on the event channel and returned to the caller.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ContextSet, Currency};

/// Outcome of a balance operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResultType {
    Success,
    /// Preconditions not met, most often a missing balance entry
    Failed,
    /// The operation would have left a negative balance
    AccountNoFunds,
}

impl ResultType {
    pub fn is_success(&self) -> bool {
        matches!(self, ResultType::Success)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    Deposit,
    Withdraw,
    Transfer,
}

/// Immutable record of a single balance mutation attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionResult {
    account_id: Uuid,
    currency: Currency,
    amount: Decimal,
    contexts: ContextSet,
    result: ResultType,
    transaction_type: TransactionType,
    occurred_at: DateTime<Utc>,
}

impl TransactionResult {
    pub fn new(
        account_id: Uuid,
        currency: Currency,
        amount: Decimal,
        contexts: ContextSet,
        result: ResultType,
        transaction_type: TransactionType,
    ) -> Self {
        Self {
            account_id,
            currency,
            amount,
            contexts,
            result,
            transaction_type,
            occurred_at: Utc::now(),
        }
    }

    pub fn account_id(&self) -> Uuid {
        self.account_id
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn contexts(&self) -> &ContextSet {
        &self.contexts
    }

    pub fn result(&self) -> ResultType {
        self.result
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

/// Immutable record of a movement between two accounts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferResult {
    #[serde(flatten)]
    transaction: TransactionResult,
    to_account_id: Uuid,
}

impl TransferResult {
    pub fn new(
        from_account_id: Uuid,
        to_account_id: Uuid,
        currency: Currency,
        amount: Decimal,
        contexts: ContextSet,
        result: ResultType,
    ) -> Self {
        Self {
            transaction: TransactionResult::new(
                from_account_id,
                currency,
                amount,
                contexts,
                result,
                TransactionType::Transfer,
            ),
            to_account_id,
        }
    }

    pub fn account_id(&self) -> Uuid {
        self.transaction.account_id()
    }

    pub fn to_account_id(&self) -> Uuid {
        self.to_account_id
    }

    pub fn currency(&self) -> &Currency {
        self.transaction.currency()
    }

    pub fn amount(&self) -> Decimal {
        self.transaction.amount()
    }

    pub fn contexts(&self) -> &ContextSet {
        self.transaction.contexts()
    }

    pub fn result(&self) -> ResultType {
        self.transaction.result()
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.transaction.transaction_type()
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.transaction.occurred_at()
    }
}

/// Notification published for every balance operation, successful or not
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "result")]
pub enum EconomyEvent {
    Transaction(TransactionResult),
    Transfer(TransferResult),
}

impl EconomyEvent {
    /// Get the event type as a string
    pub fn event_type(&self) -> &'static str {
        match self {
            EconomyEvent::Transaction(_) => "Transaction",
            EconomyEvent::Transfer(_) => "Transfer",
        }
    }

    /// Account that initiated the operation
    pub fn account_id(&self) -> Uuid {
        match self {
            EconomyEvent::Transaction(result) => result.account_id(),
            EconomyEvent::Transfer(result) => result.account_id(),
        }
    }

    pub fn result(&self) -> ResultType {
        match self {
            EconomyEvent::Transaction(result) => result.result(),
            EconomyEvent::Transfer(result) => result.result(),
        }
    }
}

impl From<TransactionResult> for EconomyEvent {
    fn from(result: TransactionResult) -> Self {
        EconomyEvent::Transaction(result)
    }
}

impl From<TransferResult> for EconomyEvent {
    fn from(result: TransferResult) -> Self {
        EconomyEvent::Transfer(result)
    }
}
