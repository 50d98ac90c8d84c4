use std::fmt;

/// A chat user's account as known to the ledger
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LedgerIdentity {
    /// Opaque id assigned by the ledger
    pub ledger_user_id: String,
    pub handle: String,
}

impl LedgerIdentity {
    pub fn new(ledger_user_id: impl Into<String>, handle: impl Into<String>) -> Self {
        Self {
            ledger_user_id: ledger_user_id.into(),
            handle: handle.into(),
        }
    }
}

impl fmt::Display for LedgerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.handle, self.ledger_user_id)
    }
}
