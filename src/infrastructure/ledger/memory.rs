//! In-memory ledger for development and tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::entities::{CreditRequest, LedgerIdentity, LedgerTransaction, TransferRequest};
use crate::domain::traits::{Ledger, UserLookup};
use crate::application::errors::LedgerError;

/// Call counters, one per ledger operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerStats {
    pub lookups: usize,
    pub users_created: usize,
    pub credits: usize,
    pub transfers: usize,
}

struct StoredUser {
    identity: LedgerIdentity,
    metadata: serde_json::Value,
}

/// Ledger kept in process memory.
///
/// Usernames are not forced unique, like a ledger whose username filter can
/// match several accounts. Transfers check both parties exist and that the
/// sender can cover the amount.
#[derive(Default)]
pub struct InMemoryLedger {
    users: Arc<RwLock<Vec<StoredUser>>>,
    balances: Arc<RwLock<HashMap<(String, String), u64>>>,
    credits: Arc<RwLock<Vec<CreditRequest>>>,
    transfers: Arc<RwLock<Vec<TransferRequest>>>,
    stats: Arc<RwLock<LedgerStats>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an account directly, bypassing the call counters
    pub async fn seed_user(&self, handle: &str) -> LedgerIdentity {
        let identity = LedgerIdentity::new(uuid::Uuid::new_v4().to_string(), handle);
        self.users.write().await.push(StoredUser {
            identity: identity.clone(),
            metadata: serde_json::Value::Null,
        });
        identity
    }

    pub async fn seed_balance(&self, handle: &str, currency: &str, amount_minor: u64) {
        self.balances
            .write()
            .await
            .insert((handle.to_string(), currency.to_string()), amount_minor);
    }

    pub async fn balance(&self, handle: &str, currency: &str) -> u64 {
        self.balances
            .read()
            .await
            .get(&(handle.to_string(), currency.to_string()))
            .copied()
            .unwrap_or(0)
    }

    pub async fn metadata(&self, ledger_user_id: &str) -> Option<serde_json::Value> {
        self.users
            .read()
            .await
            .iter()
            .find(|u| u.identity.ledger_user_id == ledger_user_id)
            .map(|u| u.metadata.clone())
    }

    pub async fn credits(&self) -> Vec<CreditRequest> {
        self.credits.read().await.clone()
    }

    /// Transfers that were accepted
    pub async fn transfers(&self) -> Vec<TransferRequest> {
        self.transfers.read().await.clone()
    }

    pub async fn stats(&self) -> LedgerStats {
        *self.stats.read().await
    }

    async fn user_exists(&self, handle: &str) -> bool {
        self.users.read().await.iter().any(|u| u.identity.handle == handle)
    }

    fn new_transaction(status: &str) -> LedgerTransaction {
        LedgerTransaction::new(uuid::Uuid::new_v4().to_string()).with_status(status)
    }
}

#[async_trait]
impl Ledger for InMemoryLedger {
    fn name(&self) -> &str {
        "memory"
    }

    async fn find_user_by_handle(&self, handle: &str) -> Result<UserLookup, LedgerError> {
        self.stats.write().await.lookups += 1;

        let users = self.users.read().await;
        let mut matches = users.iter().filter(|u| u.identity.handle == handle);

        let lookup = match (matches.next(), matches.count()) {
            (None, _) => UserLookup::NotFound,
            (Some(user), 0) => UserLookup::Found(user.identity.clone()),
            (Some(_), rest) => UserLookup::Ambiguous { count: rest + 1 },
        };
        Ok(lookup)
    }

    async fn create_user(&self, handle: &str, metadata: serde_json::Value) -> Result<LedgerIdentity, LedgerError> {
        self.stats.write().await.users_created += 1;

        let identity = LedgerIdentity::new(uuid::Uuid::new_v4().to_string(), handle);
        self.users.write().await.push(StoredUser {
            identity: identity.clone(),
            metadata,
        });
        Ok(identity)
    }

    async fn create_credit(&self, request: &CreditRequest) -> Result<LedgerTransaction, LedgerError> {
        self.stats.write().await.credits += 1;

        if !self.user_exists(&request.handle).await {
            return Err(LedgerError::NotFound(format!("user {}", request.handle)));
        }

        let mut balances = self.balances.write().await;
        let balance = balances
            .entry((request.handle.clone(), request.currency.clone()))
            .or_insert(0);
        *balance = balance.saturating_add(request.amount_minor);

        self.credits.write().await.push(request.clone());
        Ok(Self::new_transaction(request.status.as_str()))
    }

    async fn create_transfer(&self, request: &TransferRequest) -> Result<LedgerTransaction, LedgerError> {
        self.stats.write().await.transfers += 1;

        for handle in [&request.from_handle, &request.to_handle] {
            if !self.user_exists(handle).await {
                return Err(LedgerError::NotFound(format!("user {}", handle)));
            }
        }

        let mut balances = self.balances.write().await;
        let from_key = (request.from_handle.clone(), request.currency.clone());
        let available = balances.get(&from_key).copied().unwrap_or(0);
        if available < request.amount_minor {
            return Err(LedgerError::Api {
                status: 400,
                message: format!("insufficient {} balance", request.currency),
            });
        }

        balances.insert(from_key, available - request.amount_minor);
        let to = balances
            .entry((request.to_handle.clone(), request.currency.clone()))
            .or_insert(0);
        *to = to.saturating_add(request.amount_minor);

        self.transfers.write().await.push(request.clone());
        Ok(Self::new_transaction("complete"))
    }
}
