use workflow_types::{Seq, SeqKind};

/// A job delivered out of order relative to what the run has previously
/// allocated or observed.
///
/// Each variant maps to one of the job-stream ordering checks in
/// [`crate::jobstream`]. These surface as [`workflow_types::CoreError::DeterminismViolation`]
/// — an activation that references a sequence the run never allocated is,
/// by definition, not a replay of this run's own history.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JobStreamViolation {
    /// `FireTimer` referenced a sequence `StartTimer` never allocated.
    TimerNotScheduled { seq: Seq },
    /// `ResolveActivity` referenced a sequence `ScheduleActivity` never allocated.
    ActivityNotScheduled { seq: Seq },
    /// `ResolveChildWorkflowExecution` referenced a sequence
    /// `StartChildWorkflowExecution` never allocated.
    ChildWorkflowNotScheduled { seq: Seq },
    /// A resolve/fire job arrived twice for the same `(kind, seq)`.
    DuplicateResolution { kind: SeqKind, seq: Seq },
}

impl std::fmt::Display for JobStreamViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TimerNotScheduled { seq } => {
                write!(f, "FireTimer for seq {seq} with no matching StartTimer")
            }
            Self::ActivityNotScheduled { seq } => write!(
                f,
                "ResolveActivity for seq {seq} with no matching ScheduleActivity"
            ),
            Self::ChildWorkflowNotScheduled { seq } => write!(
                f,
                "ResolveChildWorkflowExecution for seq {seq} with no matching StartChildWorkflowExecution"
            ),
            Self::DuplicateResolution { kind, seq } => {
                write!(f, "duplicate resolution for {kind} seq {seq}")
            }
        }
    }
}

impl std::error::Error for JobStreamViolation {}

impl From<JobStreamViolation> for workflow_types::CoreError {
    fn from(violation: JobStreamViolation) -> Self {
        workflow_types::CoreError::determinism_violation(violation.to_string())
    }
}
