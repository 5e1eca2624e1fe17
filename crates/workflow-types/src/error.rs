use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical category for a workflow-level failure.
///
/// Coarse-grained on purpose: used for policy decisions (retry eligibility)
/// and as an observability dimension, not for matching in application code.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// User workflow code returned or threw an error.
    Application { non_retryable: bool },
    /// Workflow or scope cancellation.
    Cancellation,
    /// A forbidden primitive was touched, or replay diverged from history.
    Nondeterminism,
    /// API misuse: operation invoked out of order, or a protocol invariant broke.
    IllegalState,
    /// Decoded message shape did not match expectations.
    TypeMismatch,
}

/// Structured failure payload attached to `FailWorkflowExecution` and to
/// errors returned across the core's public API.
///
/// `category` mirrors the label the host surfaces to users (e.g. the
/// `ReferenceError` label used for workflow-type-not-found); it is optional
/// free text layered on top of the coarser [`FailureKind`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowFailure {
    pub kind: FailureKind,
    pub message: String,
    pub category: Option<String>,
    pub detail: Option<String>,
}

impl WorkflowFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            category: None,
            detail: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// A non-retryable application failure categorized `ReferenceError`,
    /// used when `init_runtime` cannot resolve the named workflow type.
    ///
    /// The detail is truncated to its first line: stack traces are not
    /// reproducible across replay and have no business in a failure record.
    pub fn workflow_type_not_found(workflow_type: &str, detail: &str) -> Self {
        let one_line = detail.lines().next().unwrap_or_default().to_string();
        Self::new(
            FailureKind::Application {
                non_retryable: true,
            },
            format!("workflow type '{workflow_type}' is not registered"),
        )
        .with_category("ReferenceError")
        .with_detail(one_line)
    }
}

impl fmt::Display for WorkflowFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)?;
        if let Some(ref category) = self.category {
            write!(f, " [{category}]")?;
        }
        if let Some(ref detail) = self.detail {
            write!(f, " ({detail})")?;
        }
        Ok(())
    }
}

/// Errors the core's public API can return synchronously.
///
/// This is the taxonomy from the error-handling design: each variant names
/// *why* a call failed, not *what* failed, so callers can branch on kind
/// without parsing strings.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CoreError {
    /// An operation was invoked out of order, or referenced a sequence that
    /// was never allocated or was already consumed.
    #[error("illegal state: {0}")]
    IllegalState(String),

    /// A decoded message did not have the shape the dispatcher expects.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    /// Workflow code touched a forbidden primitive.
    #[error("determinism violation: {0}")]
    DeterminismViolation(String),
}

impl CoreError {
    pub fn illegal_state(msg: impl Into<String>) -> Self {
        Self::IllegalState(msg.into())
    }

    pub fn type_mismatch(msg: impl Into<String>) -> Self {
        Self::TypeMismatch(msg.into())
    }

    pub fn determinism_violation(msg: impl Into<String>) -> Self {
        Self::DeterminismViolation(msg.into())
    }

    /// Project this error onto the coarser [`FailureKind`] used in workflow
    /// failure records.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::IllegalState(_) => FailureKind::IllegalState,
            Self::TypeMismatch(_) => FailureKind::TypeMismatch,
            Self::DeterminismViolation(_) => FailureKind::Nondeterminism,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workflow_type_not_found_truncates_detail_to_one_line() {
        let failure = WorkflowFailure::workflow_type_not_found(
            "sleeper",
            "ReferenceError: sleeper is not defined\n    at lookup (runtime.rs:12)",
        );
        assert_eq!(failure.category.as_deref(), Some("ReferenceError"));
        assert_eq!(
            failure.detail.as_deref(),
            Some("ReferenceError: sleeper is not defined")
        );
        assert!(matches!(
            failure.kind,
            FailureKind::Application {
                non_retryable: true
            }
        ));
    }

    #[test]
    fn core_error_kind_projects_onto_failure_kind() {
        assert_eq!(
            CoreError::illegal_state("x").kind(),
            FailureKind::IllegalState
        );
        assert_eq!(
            CoreError::type_mismatch("x").kind(),
            FailureKind::TypeMismatch
        );
        assert_eq!(
            CoreError::determinism_violation("x").kind(),
            FailureKind::Nondeterminism
        );
    }
}
