use async_trait::async_trait;
use crate::domain::entities::{Command, LedgerMutation};
use crate::application::errors::CommandError;

/// What a command handler sends back to chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReply {
    pub text: String,
    pub mutation: Option<LedgerMutation>,
}

impl CommandReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            mutation: None,
        }
    }

    pub fn with_mutation(mut self, mutation: LedgerMutation) -> Self {
        self.mutation = Some(mutation);
        self
    }
}

/// Handler for one command verb. Validates its own arguments.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    fn verb(&self) -> &str;

    /// Argument synopsis shown by `help` and on arity errors
    fn usage(&self) -> &str;

    fn description(&self) -> &str {
        ""
    }

    async fn run(&self, sender_handle: &str, command: &Command) -> Result<CommandReply, CommandError>;
}
