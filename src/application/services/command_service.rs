use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::entities::Command;
use crate::domain::traits::{CommandExecutor, CommandReply};
use crate::application::errors::CommandError;

const HELP_VERB: &str = "help";

/// Routes parsed commands to the executor registered for their verb
pub struct CommandService {
    registry: BTreeMap<String, Arc<dyn CommandExecutor>>,
    marker: char,
}

impl CommandService {
    pub fn new(marker: char) -> Self {
        Self {
            registry: BTreeMap::new(),
            marker,
        }
    }

    pub fn register(&mut self, executor: Arc<dyn CommandExecutor>) {
        self.registry.insert(executor.verb().to_lowercase(), executor);
    }

    pub fn find(&self, verb: &str) -> Option<&Arc<dyn CommandExecutor>> {
        self.registry.get(&verb.to_lowercase())
    }

    /// Run the command. Unknown verbs fail with `Unrecognized` before any ledger call.
    pub async fn handle(&self, sender_handle: &str, command: &Command) -> Result<CommandReply, CommandError> {
        if command.matches(HELP_VERB) {
            return Ok(CommandReply::text(self.get_help()));
        }

        let executor = self
            .find(&command.verb)
            .ok_or_else(|| CommandError::Unrecognized(command.verb.clone()))?;

        executor.run(sender_handle, command).await
    }

    /// Chat notice for a failed command
    pub fn notice_for(&self, error: &CommandError) -> String {
        match error {
            CommandError::Arity { verb, .. } => match self.find(verb) {
                Some(executor) => format!("{}. Usage: {}{} {}", error, self.marker, executor.verb(), executor.usage()),
                None => error.to_string(),
            },
            _ => error.to_string(),
        }
    }

    pub fn get_help(&self) -> String {
        let mut help = "Available commands:".to_string();
        for executor in self.registry.values() {
            help.push_str(&format!(" {}{} {}", self.marker, executor.verb(), executor.usage()));
            if !executor.description().is_empty() {
                help.push_str(&format!(" ({})", executor.description()));
            }
            help.push(';');
        }
        help.push_str(&format!(" {}{}", self.marker, HELP_VERB));
        help
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Echo;

    #[async_trait]
    impl CommandExecutor for Echo {
        fn verb(&self) -> &str {
            "echo"
        }

        fn usage(&self) -> &str {
            "<word>"
        }

        async fn run(&self, sender_handle: &str, command: &Command) -> Result<CommandReply, CommandError> {
            let word = command.arg(0).ok_or_else(|| CommandError::Arity {
                verb: "echo".into(),
                expected: 1,
                got: 0,
            })?;
            Ok(CommandReply::text(format!("{sender_handle}: {word}")))
        }
    }

    fn service() -> CommandService {
        let mut service = CommandService::new('!');
        service.register(Arc::new(Echo));
        service
    }

    #[tokio::test]
    async fn test_routes_by_verb_case_insensitively() {
        let service = service();
        let reply = service.handle("alice", &Command::new("ECHO", vec!["hi".into()])).await.unwrap();
        assert_eq!(reply.text, "alice: hi");
        assert!(reply.mutation.is_none());
    }

    #[tokio::test]
    async fn test_unknown_verb_is_unrecognized() {
        let err = service().handle("alice", &Command::new("dance", vec![])).await.unwrap_err();
        assert_eq!(err, CommandError::Unrecognized("dance".into()));
        assert_eq!(err.to_string(), "Did not understand command: dance");
    }

    #[tokio::test]
    async fn test_help_lists_registered_verbs() {
        let reply = service().handle("alice", &Command::new("help", vec![])).await.unwrap();
        assert!(reply.text.contains("!echo <word>"));
        assert!(reply.text.ends_with("!help"));
    }

    #[test]
    fn test_arity_notice_includes_usage() {
        let err = CommandError::Arity { verb: "echo".into(), expected: 1, got: 0 };
        assert_eq!(
            service().notice_for(&err),
            "Not enough arguments for echo: expected 1, got 0. Usage: !echo <word>"
        );
    }
}
