//! Domain traits - Abstractions for infrastructure implementations

pub mod bot;
pub mod executor;
pub mod ledger;

pub use bot::{ChatTransport, EventHandler};
pub use executor::{CommandExecutor, CommandReply};
pub use ledger::{Ledger, UserLookup};
