//! Worker execution: registry, prompt rendering, executor adapters and the
//! runtime that ties them together.

pub mod adapters;
pub mod prompt;
pub mod registry;
pub mod runtime;

pub use adapters::{AdapterError, ClaudeCliAdapter, ExecutorAdapter, GenericCliAdapter};
pub use registry::WorkerRegistry;
pub use runtime::WorkerRuntime;
