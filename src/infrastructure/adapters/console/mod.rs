//! Console adapter for development/testing

use async_trait::async_trait;
use std::future::Future;
use std::io::BufRead;
use tokio::sync::mpsc;

use crate::domain::entities::ChatEvent;
use crate::domain::traits::ChatTransport;
use crate::application::errors::BotError;

/// Console chat adapter for local development.
///
/// Each stdin line `handle: text` becomes a chat event from `handle`; a line
/// without a handle is attributed to `console`. Notices are printed to stdout.
pub struct ConsoleAdapter {
    name: String,
}

impl ConsoleAdapter {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Read stdin until EOF or Ctrl-C, forwarding events. Dropping `events`
    /// on return tells the dispatcher no more input is coming.
    pub async fn listen(&self, channel: &str, events: mpsc::Sender<ChatEvent>) -> Result<(), BotError> {
        let lines = spawn_stdin_reader()?;
        let interrupted = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("Cannot listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        };

        let forwarded = forward_lines(channel, lines, events, interrupted).await;
        tracing::debug!(forwarded, "Console input closed");
        Ok(())
    }
}

/// Blocking stdin reads live on their own thread so shutdown never waits on
/// a pending read; the thread ends with the process.
fn spawn_stdin_reader() -> Result<mpsc::Receiver<String>, BotError> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::Builder::new()
        .name("console-stdin".to_string())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        tracing::warn!("Failed to read stdin: {}", e);
                        break;
                    }
                };
                if tx.blocking_send(line).is_err() {
                    break;
                }
            }
        })?;
    Ok(rx)
}

/// Forward console lines as chat events until the input ends, the
/// dispatcher goes away, or `shutdown` resolves. Returns the number of
/// events forwarded.
pub async fn forward_lines<F>(
    channel: &str,
    mut lines: mpsc::Receiver<String>,
    events: mpsc::Sender<ChatEvent>,
    shutdown: F,
) -> usize
where
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut forwarded = 0;

    loop {
        let line = tokio::select! {
            line = lines.recv() => line,
            _ = &mut shutdown => {
                tracing::info!("Interrupted, closing console input");
                break;
            }
        };

        let Some(line) = line else { break };
        let Some(event) = parse_line(&line, channel) else { continue };

        if events.send(event).await.is_err() {
            tracing::warn!("Dispatcher gone, stopping console input");
            break;
        }
        forwarded += 1;
    }

    forwarded
}

impl Default for ConsoleAdapter {
    fn default() -> Self {
        Self::new("chatpay-bot")
    }
}

/// Turn a console line into a chat event; blank lines are skipped
pub fn parse_line(line: &str, channel: &str) -> Option<ChatEvent> {
    let line = line.trim_end_matches(&['\r', '\n'][..]);
    if line.trim().is_empty() {
        return None;
    }

    let (handle, text) = match line.split_once(": ") {
        Some((handle, text)) if !handle.is_empty() && !handle.contains(char::is_whitespace) => (handle, text),
        _ => ("console", line),
    };

    Some(ChatEvent::new(handle, format!("console-{}", handle), text).with_channel(channel))
}

#[async_trait]
impl ChatTransport for ConsoleAdapter {
    async fn start(&self) -> Result<(), BotError> {
        tracing::info!("Starting {} on the console (dev mode). Type `handle: message`, Ctrl-D to quit", self.name);
        Ok(())
    }

    async fn send_message(&self, channel: &str, text: &str) -> Result<(), BotError> {
        println!("[BOT {}] {}", channel, text);
        Ok(())
    }
}
