//! Domain layer for huddle
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Group
//!
//! A group is a shared conversation between humans and AI workers. Every
//! member has a stable id; worker members are backed by a worker profile.
//!
//! ## Turn
//!
//! A turn is one round of worker invocations triggered by a message:
//!
//! - **must-respond**: workers that were mentioned; always produce a reply
//! - **may-respond**: the remaining workers; may decline with `SKIP`
//!
//! Replies can mention further workers, which chains another turn until the
//! conversation goes quiet or the chain depth limit is reached.

pub mod config;
pub mod conversation;
pub mod core;
pub mod group;
pub mod mention;
pub mod turn;
pub mod worker;

// Re-export commonly used types
pub use config::validation::{ConfigIssue, ConfigIssueCode, Severity, has_errors};
pub use conversation::message::{AuthorKind, Message, SYSTEM_AUTHOR};
pub use core::{
    error::DomainError,
    ids::{GroupId, MemberId, MessageId, TurnId, WorkerId},
};
pub use group::{
    config::GroupConfig,
    entities::{Group, Member, MemberKind},
};
pub use mention::resolver::{
    EVERYONE_TOKENS, MentionResolution, resolve, resolve_attached, resolve_mentions,
};
pub use turn::{
    entities::{CHAIN_TRIGGER, ChainState, InvocationKind, Turn},
    planning::TurnPlan,
    value_objects::{ChainReport, InvocationStatus, TurnOutcome, WorkerInvocationResult},
};
pub use worker::{
    directives::{MemoryNote, SKIP_KEYWORD, WorkerReply, parse_reply},
    input::{Peer, TranscriptLine, WorkerInput},
    profile::{ExecutorConfig, ExecutorKind, WorkerProfile},
    status::WorkerStatus,
};
