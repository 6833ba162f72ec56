//! Core domain concepts shared across all subdomains.
//!
//! - [`ids`] - identifier value objects (groups, members, workers, messages, turns)
//! - [`error::DomainError`] - domain-level errors
//! - [`string`] - UTF-8 safe string helpers

pub mod error;
pub mod ids;
pub mod string;
