use async_trait::async_trait;
use crate::domain::entities::ChatEvent;
use crate::application::errors::BotError;

/// Chat transport - abstraction for the chat network the relay listens on
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Connect and get ready to deliver events
    async fn start(&self) -> Result<(), BotError>;

    /// Send a plain-text notice to a channel
    async fn send_message(&self, channel: &str, text: &str) -> Result<(), BotError>;
}

/// Receiver of transport events. Called at most once per physical chat message.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn on_event(&self, event: ChatEvent);
}
