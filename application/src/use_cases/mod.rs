//! Use cases (application services)

pub mod orchestrator;
pub mod turn_executor;

#[cfg(test)]
pub(crate) mod test_support;
