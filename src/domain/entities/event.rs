use chrono::{DateTime, Utc};

/// One chat message as handed over by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEvent {
    /// Display handle of the sender
    pub sender_handle: String,
    /// Stable platform-assigned user id
    pub sender_transport_id: String,
    pub text: String,
    /// Channel the message arrived on; notices are sent back here
    pub channel: String,
    pub received_at: DateTime<Utc>,
}

impl ChatEvent {
    pub fn new(
        sender_handle: impl Into<String>,
        sender_transport_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            sender_handle: sender_handle.into(),
            sender_transport_id: sender_transport_id.into(),
            text: text.into(),
            channel: String::new(),
            received_at: Utc::now(),
        }
    }

    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = channel.into();
        self
    }
}
