use std::sync::Arc;

use crate::domain::entities::{CreditRequest, LedgerTransaction};
use crate::domain::traits::Ledger;
use crate::application::errors::LedgerError;

/// Default reward currency
pub const DEFAULT_REWARD_CURRENCY: &str = "XLM";

/// Grants a fixed, immediately settled credit for each plain chat message
pub struct RewardIssuer {
    ledger: Arc<dyn Ledger>,
    amount_minor: u64,
    currency: String,
}

impl RewardIssuer {
    pub fn new(ledger: Arc<dyn Ledger>, amount_minor: u64, currency: impl Into<String>) -> Self {
        Self {
            ledger,
            amount_minor,
            currency: currency.into(),
        }
    }

    /// One credit per call. Failures are returned, never retried.
    pub async fn grant_message_reward(&self, handle: &str) -> Result<LedgerTransaction, LedgerError> {
        let request = CreditRequest::complete(handle, self.amount_minor, &self.currency);
        let tx = self.ledger.create_credit(&request).await?;

        tracing::info!(
            handle,
            amount_minor = self.amount_minor,
            currency = %self.currency,
            tx = %tx.id,
            "Rewarded message"
        );
        Ok(tx)
    }
}
