//! Turn domain: planning, the transient turn value and its results.

pub mod entities;
pub mod planning;
pub mod value_objects;
