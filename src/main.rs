use clap::{Parser, Subcommand};
use std::sync::Arc;
use tokio::sync::mpsc;

use chatpay_bot::application::errors::BotError;
use chatpay_bot::application::messaging::{DispatchRuntime, DispatcherContext, EventDispatcher};
use chatpay_bot::domain::traits::ChatTransport;
use chatpay_bot::infrastructure::adapters::ConsoleAdapter;
use chatpay_bot::infrastructure::config::{Config, LedgerBackend};
use chatpay_bot::infrastructure::ledger::build_ledger;

#[derive(Parser)]
#[command(name = "chatpay-bot")]
#[command(about = "Chat rewards and peer-to-peer payments backed by a ledger", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot
    Run {
        /// Ledger API key (overrides config)
        #[arg(long)]
        api_key: Option<String>,

        /// Chat channel (overrides config)
        #[arg(long)]
        channel: Option<String>,
    },
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { api_key, channel } => run_bot(&cli.config, api_key, channel),
        Commands::Version => {
            println!("chatpay-bot v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::InitConfig => init_config(&cli.config),
    };

    if let Err(e) = result {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run_bot(config_path: &str, api_key: Option<String>, channel: Option<String>) -> Result<(), BotError> {
    let mut config = Config::load_or_env(config_path)?;
    if let Some(key) = api_key {
        config.ledger.api_key = Some(key);
        config.ledger.backend = LedgerBackend::Rehive;
    }
    if let Some(channel) = channel {
        config.chat.channel = channel;
    }
    config.validate()?;

    tracing::info!("Starting {} on {}", config.bot.name, config.chat.channel);

    let ledger = build_ledger(&config.ledger)?;
    let transport = Arc::new(ConsoleAdapter::new(&config.bot.name));
    let dispatcher = Arc::new(EventDispatcher::new(DispatcherContext {
        ledger,
        transport: transport.clone(),
        settings: config.dispatch_settings()?,
    }));

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(serve(&config, transport, dispatcher))
}

async fn serve(config: &Config, transport: Arc<ConsoleAdapter>, dispatcher: Arc<EventDispatcher>) -> Result<(), BotError> {
    transport.start().await?;

    let (events_tx, events_rx) = mpsc::channel(config.dispatch.queue_size.max(1));
    let runtime = DispatchRuntime::new(dispatcher)
        .with_workers(config.dispatch.workers)
        .with_queue_size(config.dispatch.queue_size);
    let dispatching = tokio::spawn(runtime.run(events_rx));

    let listened = transport.listen(&config.chat.channel, events_tx).await;

    // Input is closed; in-flight ledger calls finish before we exit
    let handled = dispatching
        .await
        .map_err(|e| BotError::Internal(format!("dispatcher task failed: {}", e)))?;
    tracing::info!("Stopped after {} events", handled);

    listened
}

fn init_config(config_path: &str) -> Result<(), BotError> {
    if std::path::Path::new(config_path).exists() {
        println!("{} already exists, not overwriting", config_path);
        return Ok(());
    }

    let yaml = Config::default().to_yaml()?;
    std::fs::write(config_path, yaml)?;
    println!("Wrote default config to {}", config_path);
    Ok(())
}
