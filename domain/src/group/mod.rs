//! Group domain: who is in a conversation and how it is orchestrated.

pub mod config;
pub mod entities;
