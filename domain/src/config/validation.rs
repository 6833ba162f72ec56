//! Configuration issues reported at start-up.
//!
//! Validation never fails fast: it collects every issue so the operator
//! sees them all at once. Errors abort start-up, warnings are printed.

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: the configuration works but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// Two `[[workers]]` entries share an id.
    DuplicateWorker { worker_id: String },
    /// A group member references a worker the registry does not know.
    UnknownWorker { group_id: String, worker_id: String },
    /// Two members of one group share an id.
    DuplicateMember { group_id: String, member_id: String },
    /// The supervisor is not a worker member of its group.
    SupervisorNotMember { group_id: String, supervisor: String },
    /// A `generic` executor has no command.
    MissingCommand { worker_id: String },
    /// A field holds a value the orchestrator cannot use.
    InvalidValue { field: String, value: String },
}

/// A detected configuration issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Whether any issue is fatal.
pub fn has_errors(issues: &[ConfigIssue]) -> bool {
    issues.iter().any(ConfigIssue::is_error)
}
