//! Application layer - Use cases and business logic
//!
//! This layer contains:
//! - Services: identity resolution, rewards, transfers, command routing
//! - Errors: Domain-specific errors
//! - Messaging: Command parsing, event dispatching, the worker runtime

pub mod errors;
pub mod services;
pub mod messaging;
