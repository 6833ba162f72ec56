//! Worker domain: registry profiles, invocation input, reply directives and
//! live status.

pub mod directives;
pub mod input;
pub mod profile;
pub mod status;
