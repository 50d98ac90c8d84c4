use serde::{Deserialize, Serialize};
use std::fmt;

/// Settlement status requested for a ledger transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Complete,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &str {
        match self {
            TransactionStatus::Complete => "complete",
        }
    }
}

/// Credit issued to a single user, e.g. a chat reward
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreditRequest {
    pub handle: String,
    pub amount_minor: u64,
    pub currency: String,
    pub status: TransactionStatus,
}

impl CreditRequest {
    /// A credit that settles immediately
    pub fn complete(handle: impl Into<String>, amount_minor: u64, currency: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            amount_minor,
            currency: currency.into(),
            status: TransactionStatus::Complete,
        }
    }
}

/// Peer-to-peer transfer between two handles. Submitted once, never retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub from_handle: String,
    pub to_handle: String,
    pub amount_minor: u64,
    pub currency: String,
}

/// A transaction acknowledged by the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerTransaction {
    pub id: String,
    pub status: Option<String>,
}

impl LedgerTransaction {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: None,
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}

/// The ledger mutation an event ended up performing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerMutation {
    Credit(LedgerTransaction),
    Transfer(LedgerTransaction),
}

/// Result of a successful `pay` command, in the units the user typed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOutcome {
    pub amount: u64,
    pub currency: String,
    pub recipient: String,
    pub transaction: LedgerTransaction,
}

impl fmt::Display for TransferOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sent {} {} to user {}.", self.amount, self.currency, self.recipient)
    }
}
