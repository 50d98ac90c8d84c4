//! Event dispatcher - Classifies chat events and routes them to ledger actions

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::entities::{AmountScale, ChatEvent, LedgerMutation, DEFAULT_MINOR_UNITS_PER_UNIT};
use crate::domain::traits::{ChatTransport, EventHandler, Ledger};
use crate::application::services::identity_service::DEFAULT_METADATA_KEY;
use crate::application::services::reward_service::DEFAULT_REWARD_CURRENCY;
use crate::application::services::{CommandService, IdentityResolver, RewardIssuer, TransferExecutor};
use super::parser::{CommandParser, DEFAULT_MARKER};

/// Tunables for the dispatcher and the services it builds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchSettings {
    pub marker: char,
    pub reward_amount_minor: u64,
    pub reward_currency: String,
    pub scale: AmountScale,
    /// Account metadata key that stores the sender's transport id
    pub metadata_key: String,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER,
            reward_amount_minor: DEFAULT_MINOR_UNITS_PER_UNIT,
            reward_currency: DEFAULT_REWARD_CURRENCY.to_string(),
            scale: AmountScale::default(),
            metadata_key: DEFAULT_METADATA_KEY.to_string(),
        }
    }
}

/// Everything the dispatcher needs, handed over at construction
pub struct DispatcherContext {
    pub ledger: Arc<dyn Ledger>,
    pub transport: Arc<dyn ChatTransport>,
    pub settings: DispatchSettings,
}

/// Which path an event took
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventPath {
    Command,
    Message,
}

/// Result of dispatching one event: at most one notice, at most one ledger mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatched {
    pub path: EventPath,
    pub notice: Option<String>,
    pub mutation: Option<LedgerMutation>,
}

impl Dispatched {
    fn command(notice: String, mutation: Option<LedgerMutation>) -> Self {
        Self {
            path: EventPath::Command,
            notice: Some(notice),
            mutation,
        }
    }

    fn message(mutation: Option<LedgerMutation>) -> Self {
        Self {
            path: EventPath::Message,
            notice: None,
            mutation,
        }
    }
}

/// Routes each chat event to exactly one path.
///
/// Commands go through the parser and the command service and always answer
/// in chat. Plain messages resolve the sender's account and earn a reward;
/// their failures go to the operator log only. Holds no state between events.
pub struct EventDispatcher {
    parser: CommandParser,
    commands: CommandService,
    resolver: IdentityResolver,
    rewards: RewardIssuer,
    transport: Arc<dyn ChatTransport>,
}

impl EventDispatcher {
    pub fn new(ctx: DispatcherContext) -> Self {
        let DispatcherContext { ledger, transport, settings } = ctx;

        let mut commands = CommandService::new(settings.marker);
        commands.register(Arc::new(TransferExecutor::new(ledger.clone(), settings.scale.clone())));

        tracing::debug!(ledger = ledger.name(), marker = %settings.marker, "Dispatcher ready");

        Self {
            parser: CommandParser::new(settings.marker),
            commands,
            resolver: IdentityResolver::new(ledger.clone()).with_metadata_key(settings.metadata_key),
            rewards: RewardIssuer::new(ledger, settings.reward_amount_minor, settings.reward_currency),
            transport,
        }
    }

    /// Classify and process one event without sending anything to chat
    pub async fn dispatch(&self, event: &ChatEvent) -> Dispatched {
        if self.parser.is_command(&event.text) {
            self.command_path(event).await
        } else {
            self.message_path(event).await
        }
    }

    async fn command_path(&self, event: &ChatEvent) -> Dispatched {
        let command = match self.parser.parse(&event.text) {
            Ok(command) => command,
            Err(e) => {
                tracing::debug!(handle = %event.sender_handle, error = %e, "Malformed command");
                return Dispatched::command(self.commands.notice_for(&e), None);
            }
        };

        tracing::info!(handle = %event.sender_handle, verb = %command.verb, "Received command");

        match self.commands.handle(&event.sender_handle, &command).await {
            Ok(reply) => Dispatched::command(reply.text, reply.mutation),
            Err(e) => {
                tracing::warn!(handle = %event.sender_handle, verb = %command.verb, error = %e, "Command failed");
                Dispatched::command(self.commands.notice_for(&e), None)
            }
        }
    }

    async fn message_path(&self, event: &ChatEvent) -> Dispatched {
        let handle = event.sender_handle.as_str();

        if let Err(e) = self.resolver.resolve(handle, &event.sender_transport_id).await {
            tracing::error!(handle, error = %e, "Could not resolve ledger account, skipping reward");
            return Dispatched::message(None);
        }

        match self.rewards.grant_message_reward(handle).await {
            Ok(tx) => Dispatched::message(Some(LedgerMutation::Credit(tx))),
            Err(e) => {
                tracing::error!(handle, error = %e, "Error rewarding message");
                Dispatched::message(None)
            }
        }
    }
}

#[async_trait]
impl EventHandler for EventDispatcher {
    async fn on_event(&self, event: ChatEvent) {
        let dispatched = self.dispatch(&event).await;

        if let Some(notice) = dispatched.notice {
            if let Err(e) = self.transport.send_message(&event.channel, &notice).await {
                tracing::warn!(channel = %event.channel, error = %e, "Failed to send notice");
            }
        }
    }
}
