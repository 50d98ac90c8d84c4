use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::domain::entities::LedgerIdentity;
use crate::domain::traits::{Ledger, UserLookup};
use crate::application::errors::IdentityError;

/// Metadata key the transport id is stored under on new accounts
pub const DEFAULT_METADATA_KEY: &str = "twitch_id";

type LockMap = Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>;

/// One async lock per handle, created on demand and dropped once unused
#[derive(Default)]
struct HandleLocks {
    locks: LockMap,
}

impl HandleLocks {
    async fn acquire(&self, handle: &str) -> HandleGuard {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            locks
                .entry(handle.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };

        HandleGuard {
            handle: handle.to_string(),
            guard: Some(lock.lock_owned().await),
            locks: self.locks.clone(),
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

struct HandleGuard {
    handle: String,
    guard: Option<OwnedMutexGuard<()>>,
    locks: LockMap,
}

impl Drop for HandleGuard {
    fn drop(&mut self) {
        self.guard.take();

        // Only the map itself still references the lock: nobody holds or waits on it
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        if locks
            .get(&self.handle)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.handle);
        }
    }
}

/// Maps chat handles to ledger accounts, creating the account on first sight.
///
/// The ledger is the source of truth; nothing is cached here. Lookup-then-create
/// for one handle runs under that handle's lock, so two concurrent first
/// messages from a new chatter create a single account.
pub struct IdentityResolver {
    ledger: Arc<dyn Ledger>,
    metadata_key: String,
    locks: HandleLocks,
}

impl IdentityResolver {
    pub fn new(ledger: Arc<dyn Ledger>) -> Self {
        Self {
            ledger,
            metadata_key: DEFAULT_METADATA_KEY.to_string(),
            locks: HandleLocks::default(),
        }
    }

    pub fn with_metadata_key(mut self, key: impl Into<String>) -> Self {
        self.metadata_key = key.into();
        self
    }

    /// Resolve `handle` to its ledger account, creating one if the ledger
    /// explicitly reports it missing. Any other lookup failure is returned
    /// as-is and never leads to creation.
    pub async fn resolve(&self, handle: &str, transport_id: &str) -> Result<LedgerIdentity, IdentityError> {
        let _guard = self.locks.acquire(handle).await;

        let lookup = match self.ledger.find_user_by_handle(handle).await {
            Ok(lookup) => lookup,
            Err(e) if e.is_not_found() => UserLookup::NotFound,
            Err(e) => {
                tracing::warn!(handle, error = %e, "Ledger lookup failed");
                return Err(e.into());
            }
        };

        match lookup {
            UserLookup::Found(identity) => Ok(identity),
            UserLookup::Ambiguous { count } => Err(IdentityError::Ambiguous {
                handle: handle.to_string(),
                count,
            }),
            UserLookup::NotFound => {
                let mut metadata = serde_json::Map::new();
                metadata.insert(self.metadata_key.clone(), transport_id.into());

                let identity = self
                    .ledger
                    .create_user(handle, serde_json::Value::Object(metadata))
                    .await?;
                tracing::info!(handle, ledger_user_id = %identity.ledger_user_id, "Created ledger account");
                Ok(identity)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use crate::application::errors::LedgerError;
    use crate::domain::entities::{CreditRequest, LedgerTransaction, TransferRequest};
    use crate::infrastructure::ledger::InMemoryLedger;

    /// Ledger whose lookups always return the scripted outcome
    struct ScriptedLookup {
        lookup: Result<UserLookup, LedgerError>,
        creates: AtomicUsize,
    }

    impl ScriptedLookup {
        fn new(lookup: Result<UserLookup, LedgerError>) -> Self {
            Self { lookup, creates: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl Ledger for ScriptedLookup {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn find_user_by_handle(&self, _handle: &str) -> Result<UserLookup, LedgerError> {
            self.lookup.clone()
        }

        async fn create_user(&self, handle: &str, _metadata: serde_json::Value) -> Result<LedgerIdentity, LedgerError> {
            self.creates.fetch_add(1, Ordering::SeqCst);
            Ok(LedgerIdentity::new("new-id", handle))
        }

        async fn create_credit(&self, _request: &CreditRequest) -> Result<LedgerTransaction, LedgerError> {
            Ok(LedgerTransaction::new("credit"))
        }

        async fn create_transfer(&self, _request: &TransferRequest) -> Result<LedgerTransaction, LedgerError> {
            Ok(LedgerTransaction::new("transfer"))
        }
    }

    #[tokio::test]
    async fn test_resolve_creates_once_then_finds() {
        let ledger = Arc::new(InMemoryLedger::new());
        let resolver = IdentityResolver::new(ledger.clone());

        let first = resolver.resolve("alice", "1001").await.unwrap();
        let second = resolver.resolve("alice", "1001").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.handle, "alice");
        assert_eq!(ledger.stats().await.users_created, 1);
    }

    #[tokio::test]
    async fn test_new_account_carries_transport_id() {
        let ledger = Arc::new(InMemoryLedger::new());
        let resolver = IdentityResolver::new(ledger.clone()).with_metadata_key("chat_id");

        let identity = resolver.resolve("alice", "1001").await.unwrap();
        let metadata = ledger.metadata(&identity.ledger_user_id).await.unwrap();
        assert_eq!(metadata["chat_id"], "1001");
    }

    #[tokio::test]
    async fn test_existing_account_is_returned_without_create() {
        let existing = LedgerIdentity::new("u-42", "bob");
        let ledger = Arc::new(ScriptedLookup::new(Ok(UserLookup::Found(existing.clone()))));
        let resolver = IdentityResolver::new(ledger.clone());

        assert_eq!(resolver.resolve("bob", "7").await.unwrap(), existing);
        assert_eq!(ledger.creates.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_explicit_not_found_error_creates() {
        let ledger = Arc::new(ScriptedLookup::new(Err(LedgerError::NotFound("bob".into()))));
        let resolver = IdentityResolver::new(ledger.clone());

        let identity = resolver.resolve("bob", "7").await.unwrap();
        assert_eq!(identity.handle, "bob");
        assert_eq!(ledger.creates.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_other_lookup_failure_never_creates() {
        for failure in [
            LedgerError::Transport("connection reset".into()),
            LedgerError::Api { status: 401, message: "bad token".into() },
            LedgerError::Timeout(std::time::Duration::from_millis(10)),
        ] {
            let ledger = Arc::new(ScriptedLookup::new(Err(failure.clone())));
            let resolver = IdentityResolver::new(ledger.clone());

            let err = resolver.resolve("bob", "7").await.unwrap_err();
            assert_eq!(err, IdentityError::Ledger(failure));
            assert_eq!(ledger.creates.load(Ordering::SeqCst), 0);
        }
    }

    #[tokio::test]
    async fn test_ambiguous_lookup_fails() {
        let ledger = Arc::new(ScriptedLookup::new(Ok(UserLookup::Ambiguous { count: 2 })));
        let resolver = IdentityResolver::new(ledger.clone());

        let err = resolver.resolve("bob", "7").await.unwrap_err();
        assert_eq!(err, IdentityError::Ambiguous { handle: "bob".into(), count: 2 });
        assert_eq!(ledger.creates.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_sight_creates_one_account() {
        let ledger = Arc::new(InMemoryLedger::new());
        let resolver = Arc::new(IdentityResolver::new(ledger.clone()));

        let mut tasks = Vec::new();
        for _ in 0..16 {
            let resolver = resolver.clone();
            tasks.push(tokio::spawn(async move { resolver.resolve("newbie", "55").await }));
        }

        let mut ids = Vec::new();
        for task in tasks {
            ids.push(task.await.unwrap().unwrap().ledger_user_id);
        }
        ids.dedup();

        assert_eq!(ids.len(), 1);
        assert_eq!(ledger.stats().await.users_created, 1);
        assert_eq!(resolver.locks.len(), 0);
    }
}
