//! Chat transport adapters

pub mod console;

pub use console::ConsoleAdapter;
