//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::application::errors::ConfigError;
use crate::application::messaging::DispatchSettings;
use crate::application::services::identity_service::DEFAULT_METADATA_KEY;
use crate::application::services::reward_service::DEFAULT_REWARD_CURRENCY;
use crate::domain::entities::{AmountScale, DEFAULT_MINOR_UNITS_PER_UNIT};

/// Bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub bot: BotConfig,
    pub chat: ChatConfig,
    pub ledger: LedgerConfig,
    pub rewards: RewardConfig,
    #[serde(default)]
    pub amounts: AmountScale,
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BotConfig {
    pub name: String,
    /// Single character that marks a chat message as a command
    pub prefix: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ChatConfig {
    pub channel: String,
    /// Account metadata key for the sender's transport id
    pub metadata_key: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerBackend {
    Rehive,
    Memory,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct LedgerConfig {
    pub backend: LedgerBackend,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    /// Upper bound for any single ledger call
    pub timeout_ms: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            backend: LedgerBackend::Memory,
            base_url: None,
            api_key: None,
            timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct RewardConfig {
    pub amount_minor: u64,
    pub currency: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct DispatchConfig {
    /// Serial workers; events are sharded onto them by sender handle
    pub workers: usize,
    pub queue_size: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            workers: 1,
            queue_size: 64,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                name: "chatpay-bot".to_string(),
                prefix: "!".to_string(),
            },
            chat: ChatConfig {
                channel: "#general".to_string(),
                metadata_key: DEFAULT_METADATA_KEY.to_string(),
            },
            ledger: LedgerConfig::default(),
            rewards: RewardConfig {
                amount_minor: DEFAULT_MINOR_UNITS_PER_UNIT,
                currency: DEFAULT_REWARD_CURRENCY.to_string(),
            },
            amounts: AmountScale::default(),
            dispatch: DispatchConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self)
            .map_err(|e| ConfigError::Parse(format!("Failed to serialize config: {}", e)))
    }

    /// Load `path` when it exists, otherwise start from defaults; environment
    /// overrides apply either way. A file that exists but does not parse is
    /// an error, never a silent fallback.
    pub fn load_or_env(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!("No config at {}, using defaults", path.display());
            return Ok(Self::load_env());
        }

        let mut config = Self::load(path)?;
        config.apply_env();
        Ok(config)
    }

    pub fn load_env() -> Self {
        // Load from environment variables
        let mut config = Config::default();
        config.apply_env();
        config
    }

    /// Environment overrides on top of whatever was loaded
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("REHIVE_API_KEY") {
            self.ledger.api_key = Some(key);
            self.ledger.backend = LedgerBackend::Rehive;
        }

        if let Ok(backend) = std::env::var("LEDGER_BACKEND") {
            match backend.to_lowercase().as_str() {
                "rehive" => self.ledger.backend = LedgerBackend::Rehive,
                "memory" => self.ledger.backend = LedgerBackend::Memory,
                other => tracing::warn!("Ignoring unknown LEDGER_BACKEND: {}", other),
            }
        }

        if let Ok(channel) = std::env::var("CHAT_CHANNEL") {
            self.chat.channel = channel;
        }

        if let Ok(prefix) = std::env::var("BOT_PREFIX") {
            self.bot.prefix = prefix;
        }
    }

    /// The command marker; the prefix must be exactly one character
    pub fn command_marker(&self) -> Result<char, ConfigError> {
        let mut chars = self.bot.prefix.chars();
        match (chars.next(), chars.next()) {
            (Some(marker), None) if !marker.is_whitespace() => Ok(marker),
            _ => Err(ConfigError::InvalidValue(format!(
                "bot.prefix must be a single non-space character, got {:?}",
                self.bot.prefix
            ))),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.command_marker()?;

        if self.ledger.backend == LedgerBackend::Rehive && self.ledger.api_key.is_none() {
            return Err(ConfigError::MissingField("ledger.api-key".to_string()));
        }
        if self.ledger.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue("ledger.timeout-ms must be positive".to_string()));
        }
        if self.rewards.currency.is_empty() {
            return Err(ConfigError::MissingField("rewards.currency".to_string()));
        }
        if self.amounts.default_scale == 0 {
            return Err(ConfigError::InvalidValue("amounts.default-scale must be positive".to_string()));
        }
        if self.dispatch.workers == 0 {
            return Err(ConfigError::InvalidValue("dispatch.workers must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn dispatch_settings(&self) -> Result<DispatchSettings, ConfigError> {
        Ok(DispatchSettings {
            marker: self.command_marker()?,
            reward_amount_minor: self.rewards.amount_minor,
            reward_currency: self.rewards.currency.clone(),
            scale: self.amounts.clone(),
            metadata_key: self.chat.metadata_key.clone(),
        })
    }
}
