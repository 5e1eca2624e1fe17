use workflow_types::Command;

/// Coarse run status, useful for the host's cache-eviction and
/// query-routing decisions without re-deriving it ad hoc (§10).
///
/// Mirrors the teacher's `derive_status` fold, generalized from journal
/// replay to the live `{completed, blocked_conditions}` state this core
/// already tracks -- no separate journal scan is needed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExecutionStatus {
    Running,
    Blocked { num_blocked_conditions: usize },
    Completed,
    Failed,
    ContinuedAsNew,
}

/// Derive the current status from the terminal command (if any) and the
/// number of still-blocked conditions.
pub fn derive_status(terminal: Option<&Command>, num_blocked_conditions: usize) -> ExecutionStatus {
    match terminal {
        Some(Command::CompleteWorkflowExecution { .. }) => ExecutionStatus::Completed,
        Some(Command::FailWorkflowExecution { .. }) => ExecutionStatus::Failed,
        Some(Command::ContinueAsNewWorkflowExecution { .. }) => ExecutionStatus::ContinuedAsNew,
        Some(_) | None if num_blocked_conditions > 0 => ExecutionStatus::Blocked {
            num_blocked_conditions,
        },
        _ => ExecutionStatus::Running,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use workflow_types::{Codec, Payload};

    #[test]
    fn no_terminal_and_no_blocks_is_running() {
        assert_eq!(derive_status(None, 0), ExecutionStatus::Running);
    }

    #[test]
    fn no_terminal_with_blocks_is_blocked() {
        assert_eq!(
            derive_status(None, 2),
            ExecutionStatus::Blocked {
                num_blocked_conditions: 2
            }
        );
    }

    #[test]
    fn complete_command_is_completed() {
        let command = Command::CompleteWorkflowExecution {
            result: Payload::new(vec![], Codec::Json),
        };
        assert_eq!(derive_status(Some(&command), 0), ExecutionStatus::Completed);
    }

    #[test]
    fn fail_command_is_failed() {
        let command = Command::FailWorkflowExecution {
            failure: workflow_types::WorkflowFailure::new(
                workflow_types::FailureKind::Cancellation,
                "boom",
            ),
        };
        assert_eq!(derive_status(Some(&command), 0), ExecutionStatus::Failed);
    }
}
