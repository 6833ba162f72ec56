//! Mention resolution domain.

pub mod resolver;
