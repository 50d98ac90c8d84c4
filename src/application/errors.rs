//! Application layer errors

use std::time::Duration;
use thiserror::Error;

/// General bot errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failures reported by the ledger service
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Ledger call timed out after {0:?}")]
    Timeout(Duration),
}

impl LedgerError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, LedgerError::NotFound(_))
    }
}

impl From<reqwest::Error> for LedgerError {
    fn from(err: reqwest::Error) -> Self {
        LedgerError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Parse(err.to_string())
    }
}

/// Identity resolution errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("{count} ledger accounts share the handle {handle}")]
    Ambiguous { handle: String, count: usize },

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Command execution errors. The `Display` text is what the chat sees.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Malformed command: {0}")]
    Malformed(String),

    #[error("Not enough arguments for {verb}: expected {expected}, got {got}")]
    Arity {
        verb: String,
        expected: usize,
        got: usize,
    },

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Did not understand command: {0}")]
    Unrecognized(String),

    #[error("Failed to send {amount} {currency} to {recipient}: {reason}")]
    TransferFailed {
        amount: u64,
        currency: String,
        recipient: String,
        #[source]
        reason: LedgerError,
    },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
