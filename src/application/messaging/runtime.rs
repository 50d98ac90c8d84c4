//! Dispatch runtime - Feeds transport events to the handler on per-handle workers

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::domain::entities::ChatEvent;
use crate::domain::traits::EventHandler;

/// Shards events by sender handle onto serial workers.
///
/// Events from one handle are handled in arrival order by a single worker;
/// distinct handles may run in parallel. With one worker everything is
/// sequential. When the inbound channel closes, queued events are drained and
/// in-flight ledger calls finish before `run` returns.
pub struct DispatchRuntime {
    handler: Arc<dyn EventHandler>,
    workers: usize,
    queue_size: usize,
}

impl DispatchRuntime {
    pub fn new(handler: Arc<dyn EventHandler>) -> Self {
        Self {
            handler,
            workers: 1,
            queue_size: 64,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_queue_size(mut self, queue_size: usize) -> Self {
        self.queue_size = queue_size.max(1);
        self
    }

    /// Run until `events` closes. Returns the number of events handled.
    pub async fn run(self, mut events: mpsc::Receiver<ChatEvent>) -> usize {
        let mut shards = Vec::with_capacity(self.workers);
        let mut tasks = JoinSet::new();

        for worker in 0..self.workers {
            let (tx, mut rx) = mpsc::channel::<ChatEvent>(self.queue_size);
            let handler = self.handler.clone();
            tasks.spawn(async move {
                let mut handled = 0usize;
                while let Some(event) = rx.recv().await {
                    handler.on_event(event).await;
                    handled += 1;
                }
                tracing::debug!(worker, handled, "Worker drained");
                handled
            });
            shards.push(tx);
        }

        tracing::info!(workers = self.workers, "Dispatch runtime started");

        while let Some(event) = events.recv().await {
            let shard = shard_for(&event.sender_handle, self.workers);
            if shards[shard].send(event).await.is_err() {
                tracing::error!(worker = shard, "Worker stopped, dropping event");
            }
        }

        // Inbound closed: no new events, let workers finish what they have
        drop(shards);

        let mut handled = 0;
        while let Some(result) = tasks.join_next().await {
            match result {
                Ok(count) => handled += count,
                Err(e) => tracing::error!(error = %e, "Worker task failed"),
            }
        }

        tracing::info!(handled, "Dispatch runtime stopped");
        handled
    }
}

fn shard_for(handle: &str, workers: usize) -> usize {
    let mut hasher = DefaultHasher::new();
    handle.hash(&mut hasher);
    (hasher.finish() % workers as u64) as usize
}
