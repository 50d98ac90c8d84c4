//! Shared fixtures for dispatcher integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::{Arc, Mutex, Once};

use chatpay_bot::application::errors::{BotError, LedgerError};
use chatpay_bot::application::messaging::{DispatchSettings, DispatcherContext, EventDispatcher};
use chatpay_bot::domain::entities::{CreditRequest, LedgerIdentity, LedgerTransaction, TransferRequest};
use chatpay_bot::domain::traits::{ChatTransport, Ledger, UserLookup};
use chatpay_bot::infrastructure::ledger::InMemoryLedger;

static INIT: Once = Once::new();

pub fn ensure_init() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Transport that keeps every notice it is asked to send
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingTransport {
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn start(&self) -> Result<(), BotError> {
        Ok(())
    }

    async fn send_message(&self, channel: &str, text: &str) -> Result<(), BotError> {
        self.sent.lock().unwrap().push((channel.to_string(), text.to_string()));
        Ok(())
    }
}

/// In-memory ledger whose lookups fail with a fixed error
pub struct BrokenLookups {
    pub inner: InMemoryLedger,
    pub error: LedgerError,
}

#[async_trait]
impl Ledger for BrokenLookups {
    fn name(&self) -> &str {
        "broken-lookups"
    }

    async fn find_user_by_handle(&self, _handle: &str) -> Result<UserLookup, LedgerError> {
        Err(self.error.clone())
    }

    async fn create_user(&self, handle: &str, metadata: serde_json::Value) -> Result<LedgerIdentity, LedgerError> {
        self.inner.create_user(handle, metadata).await
    }

    async fn create_credit(&self, request: &CreditRequest) -> Result<LedgerTransaction, LedgerError> {
        self.inner.create_credit(request).await
    }

    async fn create_transfer(&self, request: &TransferRequest) -> Result<LedgerTransaction, LedgerError> {
        self.inner.create_transfer(request).await
    }
}

pub struct Harness {
    pub ledger: Arc<InMemoryLedger>,
    pub transport: Arc<RecordingTransport>,
    pub dispatcher: Arc<EventDispatcher>,
}

pub fn harness() -> Harness {
    ensure_init();

    let ledger = Arc::new(InMemoryLedger::new());
    let transport = Arc::new(RecordingTransport::default());
    let dispatcher = Arc::new(EventDispatcher::new(DispatcherContext {
        ledger: ledger.clone(),
        transport: transport.clone(),
        settings: DispatchSettings::default(),
    }));

    Harness {
        ledger,
        transport,
        dispatcher,
    }
}
