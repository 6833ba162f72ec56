//! Infrastructure layer for huddle
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: configuration loading, the worker registry and
//! executor adapters, the message log and context assembly.

pub mod config;
pub mod context;
pub mod logging;
pub mod memory;
pub mod store;
pub mod workers;

// Re-export commonly used types
pub use config::{ConfigLoader, FileConfig, FileGroupConfig, FileLoggingConfig, FileMemoryConfig};
pub use context::TranscriptContextAssembler;
pub use logging::JsonlConversationLogger;
pub use memory::WorkspaceMemory;
pub use store::InMemoryMessageLog;
pub use workers::{
    AdapterError, ClaudeCliAdapter, ExecutorAdapter, GenericCliAdapter, WorkerRegistry,
    WorkerRuntime,
};
