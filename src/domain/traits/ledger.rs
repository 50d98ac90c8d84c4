use async_trait::async_trait;
use crate::domain::entities::{CreditRequest, LedgerIdentity, LedgerTransaction, TransferRequest};
use crate::application::errors::LedgerError;

/// Outcome of looking up an account by handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserLookup {
    Found(LedgerIdentity),
    NotFound,
    /// More than one account carries the handle
    Ambiguous { count: usize },
}

/// Ledger trait - abstraction for the accounts/transactions service of record
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Backend name, for logs
    fn name(&self) -> &str;

    /// Find the account whose username equals `handle`
    async fn find_user_by_handle(&self, handle: &str) -> Result<UserLookup, LedgerError>;

    /// Create an account with `handle` as username
    async fn create_user(
        &self,
        handle: &str,
        metadata: serde_json::Value,
    ) -> Result<LedgerIdentity, LedgerError>;

    /// Credit a user's account
    async fn create_credit(&self, request: &CreditRequest) -> Result<LedgerTransaction, LedgerError>;

    /// Move value from one user to another
    async fn create_transfer(&self, request: &TransferRequest) -> Result<LedgerTransaction, LedgerError>;
}
