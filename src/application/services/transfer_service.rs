use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::entities::{
    parse_whole_units, AmountScale, Command, LedgerMutation, TransferOutcome, TransferRequest,
};
use crate::domain::traits::{CommandExecutor, CommandReply, Ledger};
use crate::application::errors::CommandError;

const PAY_VERB: &str = "pay";
const PAY_ARITY: usize = 3;

/// Executes `pay <amount> <currency> <recipient>`.
///
/// Arguments are validated before any ledger call. A valid command produces
/// exactly one transfer request; failures go back to the sender and are never
/// retried. There is no idempotency key, so a replayed chat message pays twice.
pub struct TransferExecutor {
    ledger: Arc<dyn Ledger>,
    scale: AmountScale,
}

impl TransferExecutor {
    pub fn new(ledger: Arc<dyn Ledger>, scale: AmountScale) -> Self {
        Self { ledger, scale }
    }

    pub async fn execute(&self, sender_handle: &str, args: &[String]) -> Result<TransferOutcome, CommandError> {
        let [amount, currency, recipient] = match args {
            [amount, currency, recipient, ..] => [amount, currency, recipient],
            _ => {
                return Err(CommandError::Arity {
                    verb: PAY_VERB.to_string(),
                    expected: PAY_ARITY,
                    got: args.len(),
                })
            }
        };

        let whole = parse_whole_units(amount)
            .ok_or_else(|| CommandError::InvalidAmount(amount.clone()))?;
        let amount_minor = self
            .scale
            .to_minor(whole, currency)
            .ok_or_else(|| CommandError::InvalidAmount(amount.clone()))?;

        let request = TransferRequest {
            from_handle: sender_handle.to_string(),
            to_handle: recipient.clone(),
            amount_minor,
            currency: currency.clone(),
        };

        match self.ledger.create_transfer(&request).await {
            Ok(transaction) => {
                tracing::info!(
                    from = sender_handle,
                    to = %recipient,
                    amount_minor,
                    currency = %currency,
                    tx = %transaction.id,
                    "Transfer submitted"
                );
                Ok(TransferOutcome {
                    amount: whole,
                    currency: currency.clone(),
                    recipient: recipient.clone(),
                    transaction,
                })
            }
            Err(reason) => {
                tracing::warn!(from = sender_handle, to = %recipient, error = %reason, "Transfer failed");
                Err(CommandError::TransferFailed {
                    amount: whole,
                    currency: currency.clone(),
                    recipient: recipient.clone(),
                    reason,
                })
            }
        }
    }
}

#[async_trait]
impl CommandExecutor for TransferExecutor {
    fn verb(&self) -> &str {
        PAY_VERB
    }

    fn usage(&self) -> &str {
        "<amount> <currency> <recipient>"
    }

    fn description(&self) -> &str {
        "Send whole units of a currency to another chatter"
    }

    async fn run(&self, sender_handle: &str, command: &Command) -> Result<CommandReply, CommandError> {
        let outcome = self.execute(sender_handle, &command.args).await?;
        Ok(CommandReply::text(outcome.to_string())
            .with_mutation(LedgerMutation::Transfer(outcome.transaction)))
    }
}
