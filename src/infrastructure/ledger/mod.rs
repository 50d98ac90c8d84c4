//! Ledger backends

pub mod memory;
pub mod rehive;

pub use memory::{InMemoryLedger, LedgerStats};
pub use rehive::RehiveLedger;

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::entities::{CreditRequest, LedgerIdentity, LedgerTransaction, TransferRequest};
use crate::domain::traits::{Ledger, UserLookup};
use crate::application::errors::{ConfigError, LedgerError};
use crate::infrastructure::config::{LedgerBackend, LedgerConfig};

/// Bounds every call of the wrapped ledger by a fixed timeout
pub struct TimeoutLedger<L> {
    inner: L,
    timeout: Duration,
}

impl<L: Ledger> TimeoutLedger<L> {
    pub fn new(inner: L, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    async fn bounded<T>(&self, call: impl Future<Output = Result<T, LedgerError>> + Send) -> Result<T, LedgerError> {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| LedgerError::Timeout(self.timeout))?
    }
}

#[async_trait]
impl<L: Ledger> Ledger for TimeoutLedger<L> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn find_user_by_handle(&self, handle: &str) -> Result<UserLookup, LedgerError> {
        self.bounded(self.inner.find_user_by_handle(handle)).await
    }

    async fn create_user(&self, handle: &str, metadata: serde_json::Value) -> Result<LedgerIdentity, LedgerError> {
        self.bounded(self.inner.create_user(handle, metadata)).await
    }

    async fn create_credit(&self, request: &CreditRequest) -> Result<LedgerTransaction, LedgerError> {
        self.bounded(self.inner.create_credit(request)).await
    }

    async fn create_transfer(&self, request: &TransferRequest) -> Result<LedgerTransaction, LedgerError> {
        self.bounded(self.inner.create_transfer(request)).await
    }
}

/// Build the configured ledger, wrapped in the configured timeout
pub fn build_ledger(config: &LedgerConfig) -> Result<Arc<dyn Ledger>, ConfigError> {
    let timeout = Duration::from_millis(config.timeout_ms);

    let ledger: Arc<dyn Ledger> = match config.backend {
        LedgerBackend::Memory => Arc::new(TimeoutLedger::new(InMemoryLedger::new(), timeout)),
        LedgerBackend::Rehive => {
            let api_key = config
                .api_key
                .as_deref()
                .ok_or_else(|| ConfigError::MissingField("ledger.api-key".to_string()))?;

            let mut rehive = RehiveLedger::new(api_key, timeout)
                .map_err(|e| ConfigError::InvalidValue(format!("ledger client: {}", e)))?;
            if let Some(base_url) = &config.base_url {
                rehive = rehive.with_base_url(base_url);
            }
            Arc::new(TimeoutLedger::new(rehive, timeout))
        }
    };

    tracing::info!(backend = ledger.name(), timeout_ms = config.timeout_ms, "Ledger configured");
    Ok(ledger)
}
