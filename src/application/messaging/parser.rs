//! Command parser - Turns marker-prefixed chat text into a verb and arguments

use crate::domain::entities::Command;
use crate::application::errors::CommandError;

/// Default command marker
pub const DEFAULT_MARKER: char = '!';

/// Tokenizes command messages. Argument count and types are left to each
/// command's executor.
#[derive(Debug, Clone)]
pub struct CommandParser {
    marker: char,
}

impl CommandParser {
    pub fn new(marker: char) -> Self {
        Self { marker }
    }

    /// A message is a command iff its first character is the marker
    pub fn is_command(&self, text: &str) -> bool {
        text.starts_with(self.marker)
    }

    /// Verb is everything between the marker and the first whitespace;
    /// the rest splits on whitespace into arguments, order preserved.
    pub fn parse(&self, text: &str) -> Result<Command, CommandError> {
        let body = text
            .strip_prefix(self.marker)
            .ok_or_else(|| CommandError::Malformed(text.to_string()))?;

        let verb_end = body.find(char::is_whitespace).unwrap_or(body.len());
        let (verb, rest) = body.split_at(verb_end);
        if verb.is_empty() {
            return Err(CommandError::Malformed(text.to_string()));
        }

        let args = rest.split_whitespace().map(str::to_string).collect();
        Ok(Command::new(verb, args))
    }
}

impl Default for CommandParser {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER)
    }
}
