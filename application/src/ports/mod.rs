//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod context_assembler;
pub mod conversation_logger;
pub mod memory;
pub mod message_log;
pub mod notification;
pub mod worker_invoker;
