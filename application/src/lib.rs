//! Application layer for huddle
//!
//! This crate contains the turn orchestration use cases and the ports they
//! depend on. It depends only on the domain layer.

pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use ports::{
    context_assembler::{ContextAssembler, ContextError},
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    memory::{MemoryPort, NoMemory},
    message_log::{MessageLog, StoreError},
    notification::{NoNotifications, NotificationSink},
    worker_invoker::{InvokeError, WorkerInvoker, failed_invocation},
};
pub use use_cases::orchestrator::{CHAIN_LIMIT_NOTICE, Orchestrator};
pub use use_cases::turn_executor::{NO_COMMENT_REPLY, TurnExecutor};
