//! Interactive chat module
//!
//! Provides a reedline-based interactive chat interface for a group.

mod repl;

pub use repl::{ChatRepl, compose_message};
