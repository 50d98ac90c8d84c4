//! Domain layer - Core business objects and the seams to the outside world
//!
//! This layer contains:
//! - Entities: Chat events, ledger identities, commands, transfer requests
//! - Traits: Abstractions for infrastructure (Ledger, ChatTransport, CommandExecutor)

pub mod entities;
pub mod traits;
