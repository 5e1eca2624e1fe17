use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::WorkflowFailure;
use crate::payload::Payload;
use crate::sequence::Seq;

/// A workflow-originated directive, appended to the command buffer and
/// flushed atomically at conclusion (invariant 6).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Command {
    StartTimer {
        seq: Seq,
        duration: Duration,
    },
    CancelTimer {
        seq: Seq,
    },
    ScheduleActivity {
        seq: Seq,
        activity_type: String,
        arguments: Vec<Payload>,
    },
    RequestCancelActivity {
        seq: Seq,
    },
    StartChildWorkflowExecution {
        seq: Seq,
        workflow_type: String,
        workflow_id: String,
        arguments: Vec<Payload>,
    },
    CompleteWorkflowExecution {
        result: Payload,
    },
    FailWorkflowExecution {
        failure: WorkflowFailure,
    },
    ContinueAsNewWorkflowExecution {
        workflow_type: String,
        arguments: Vec<Payload>,
    },
    RespondToQuery {
        query_id: String,
        result: Result<Payload, WorkflowFailure>,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::StartTimer { .. } => "StartTimer",
            Command::CancelTimer { .. } => "CancelTimer",
            Command::ScheduleActivity { .. } => "ScheduleActivity",
            Command::RequestCancelActivity { .. } => "RequestCancelActivity",
            Command::StartChildWorkflowExecution { .. } => "StartChildWorkflowExecution",
            Command::CompleteWorkflowExecution { .. } => "CompleteWorkflowExecution",
            Command::FailWorkflowExecution { .. } => "FailWorkflowExecution",
            Command::ContinueAsNewWorkflowExecution { .. } => "ContinueAsNewWorkflowExecution",
            Command::RespondToQuery { .. } => "RespondToQuery",
        }
    }

    /// Whether this command terminates the workflow execution.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Command::CompleteWorkflowExecution { .. }
                | Command::FailWorkflowExecution { .. }
                | Command::ContinueAsNewWorkflowExecution { .. }
        )
    }
}

/// The completion message produced by `conclude_activation`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActivationCompletion {
    pub run_id: String,
    pub commands: Vec<Command>,
}
