//! Message handling - Event-driven dispatching of chat events

pub mod dispatcher;
pub mod parser;
pub mod runtime;

pub use dispatcher::{Dispatched, DispatchSettings, DispatcherContext, EventDispatcher, EventPath};
pub use parser::CommandParser;
pub use runtime::DispatchRuntime;
