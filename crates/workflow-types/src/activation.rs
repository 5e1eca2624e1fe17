use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::payload::Payload;
use crate::sequence::Seq;

/// One unit of work routed to a per-variant handler by the dispatcher.
///
/// Exactly one variant is ever present on the wire; decoding a message with
/// none (or several) set is a [`crate::CoreError::TypeMismatch`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Job {
    StartWorkflow {
        workflow_type: String,
        arguments: Vec<Payload>,
        randomness_seed: Vec<u8>,
    },
    FireTimer {
        seq: Seq,
    },
    ResolveActivity {
        seq: Seq,
        result: Result<Payload, String>,
    },
    ResolveChildWorkflowExecution {
        seq: Seq,
        result: Result<Payload, String>,
    },
    SignalWorkflow {
        signal_name: String,
        input: Vec<Payload>,
    },
    QueryWorkflow {
        query_id: String,
        query_type: String,
        arguments: Vec<Payload>,
    },
    NotifyHasPatch {
        patch_id: String,
    },
    CancelWorkflow {
        reason: String,
    },
    RemoveFromCache {
        reason: String,
    },
    ResolveSignalExternalWorkflow {
        seq: Seq,
        failure: Option<String>,
    },
    ResolveRequestCancelExternalWorkflow {
        seq: Seq,
        failure: Option<String>,
    },
}

impl Job {
    /// The variant name, used in error messages and tracing fields.
    pub fn name(&self) -> &'static str {
        match self {
            Job::StartWorkflow { .. } => "StartWorkflow",
            Job::FireTimer { .. } => "FireTimer",
            Job::ResolveActivity { .. } => "ResolveActivity",
            Job::ResolveChildWorkflowExecution { .. } => "ResolveChildWorkflowExecution",
            Job::SignalWorkflow { .. } => "SignalWorkflow",
            Job::QueryWorkflow { .. } => "QueryWorkflow",
            Job::NotifyHasPatch { .. } => "NotifyHasPatch",
            Job::CancelWorkflow { .. } => "CancelWorkflow",
            Job::RemoveFromCache { .. } => "RemoveFromCache",
            Job::ResolveSignalExternalWorkflow { .. } => "ResolveSignalExternalWorkflow",
            Job::ResolveRequestCancelExternalWorkflow { .. } => {
                "ResolveRequestCancelExternalWorkflow"
            }
        }
    }

    /// Whether this job must still run after the workflow has completed.
    ///
    /// Only queries survive the post-completion policy (invariant 3):
    /// everything else is silently dropped once `completed` is set.
    pub fn runs_after_completion(&self) -> bool {
        matches!(self, Job::QueryWorkflow { .. })
    }
}

/// A decoded activation: a wall-clock reading (absent for query-only
/// deliveries), the replay flag, and the ordered jobs to dispatch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Activation {
    pub timestamp: Option<DateTime<Utc>>,
    pub is_replaying: bool,
    pub jobs: Vec<Job>,
}

impl Activation {
    pub fn new(timestamp: Option<DateTime<Utc>>, is_replaying: bool, jobs: Vec<Job>) -> Self {
        Self {
            timestamp,
            is_replaying,
            jobs,
        }
    }
}
