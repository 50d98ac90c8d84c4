//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: Configuration loading
//! - Ledger: Ledger backends (Rehive, in-memory)
//! - Adapters: Chat transports (console)

pub mod config;
pub mod ledger;
pub mod adapters;
