//! Context assembly adapters.

mod transcript;

pub use transcript::{DEFAULT_WINDOW, TranscriptContextAssembler};
