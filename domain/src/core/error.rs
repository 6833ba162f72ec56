//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Duplicate member id in group: {0}")]
    DuplicateMember(String),

    #[error("Worker member '{0}' has no worker id")]
    MissingWorkerId(String),

    #[error("Invalid group configuration: {0}")]
    InvalidConfig(String),

    #[error("Message content cannot be empty")]
    EmptyMessage,
}
