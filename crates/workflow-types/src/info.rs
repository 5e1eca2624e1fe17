use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity record for one workflow run.
///
/// Immutable for the run's lifetime except `is_replaying`, which the
/// dispatcher updates from each activation, and `now`, which lives on the
/// runtime state rather than here (it is not part of the run's identity).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowInfo {
    pub workflow_type: String,
    pub run_id: String,
    pub workflow_id: String,
    pub task_queue: String,
    pub namespace: String,
    pub is_replaying: bool,
}

impl WorkflowInfo {
    pub fn new(
        workflow_type: impl Into<String>,
        run_id: impl Into<String>,
        workflow_id: impl Into<String>,
        task_queue: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            workflow_type: workflow_type.into(),
            run_id: run_id.into(),
            workflow_id: workflow_id.into(),
            task_queue: task_queue.into(),
            namespace: namespace.into(),
            is_replaying: false,
        }
    }
}

/// Layered, host-supplied configuration threaded into `init_runtime`.
///
/// None of these values are ever read by workflow code directly; they shape
/// how the core behaves (timeouts are enforced by the isolation capability,
/// not polled here) and how much the ambient logging layer emits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub isolate_execution_timeout_ms: u64,
    pub max_cached_workflows: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            isolate_execution_timeout_ms: 5_000,
            max_cached_workflows: 1_000,
        }
    }
}

/// A parsed randomness seed: exactly the bytes `init_runtime` was handed.
///
/// Kept as a newtype (rather than a bare `Vec<u8>`) so call sites cannot
/// confuse it with an arbitrary byte buffer; the only thing one may do with
/// it is fold it into an [`crate::Alea`] state via `from_seed_bytes`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RandomnessSeed(pub Vec<u8>);

/// Wall-clock instant supplied to `init_runtime`, seeding `state.now` before
/// the first activation arrives.
pub type InitialNow = DateTime<Utc>;
