//! Port for structured conversation logging.
//!
//! Defines the [`ConversationLogger`] trait for recording turn loop events
//! (incoming messages, worker invocations, chain outcomes) to a structured log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures the full
//! conversation transcript in a machine-readable format (JSONL).

use serde_json::Value;

/// Event types written by the turn loop.
pub mod event_types {
    pub const MESSAGE_RECEIVED: &str = "message_received";
    pub const TURN_STARTED: &str = "turn_started";
    pub const WORKER_INVOCATION: &str = "worker_invocation";
    pub const CHAIN_FINISHED: &str = "chain_finished";
}

/// A structured conversation event for logging.
///
/// The logger adds the event type and a UTC timestamp to the payload.
#[derive(Debug, Clone)]
pub struct ConversationEvent {
    /// Event type identifier (see [`event_types`]).
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging conversation events to a structured log.
///
/// Synchronous and non-fallible: logging failures never disturb the turn loop.
pub trait ConversationLogger: Send + Sync {
    /// Record a conversation event.
    fn log(&self, event: ConversationEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}
