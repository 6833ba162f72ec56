//! Conversation domain: the messages exchanged inside a group.

pub mod message;
