//! Memory adapters.

mod workspace;

pub use workspace::WorkspaceMemory;
