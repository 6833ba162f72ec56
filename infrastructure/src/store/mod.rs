//! Message log adapters.

mod memory_log;

pub use memory_log::InMemoryMessageLog;
