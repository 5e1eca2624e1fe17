use serde::{Deserialize, Serialize};
use std::fmt;

/// The resource kinds the sequence registry tracks independently.
///
/// Each kind owns its own monotonic counter (invariant 1 in the data model):
/// allocating a `Timer` sequence never consumes an `Activity` sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeqKind {
    Timer,
    Activity,
    ChildWorkflow,
    Signal,
    Dependency,
    CancelWorkflowExternal,
    SignalWorkflowExternal,
    Condition,
}

impl SeqKind {
    pub const ALL: [SeqKind; 8] = [
        SeqKind::Timer,
        SeqKind::Activity,
        SeqKind::ChildWorkflow,
        SeqKind::Signal,
        SeqKind::Dependency,
        SeqKind::CancelWorkflowExternal,
        SeqKind::SignalWorkflowExternal,
        SeqKind::Condition,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SeqKind::Timer => "timer",
            SeqKind::Activity => "activity",
            SeqKind::ChildWorkflow => "child_workflow",
            SeqKind::Signal => "signal",
            SeqKind::Dependency => "dependency",
            SeqKind::CancelWorkflowExternal => "cancel_workflow_external",
            SeqKind::SignalWorkflowExternal => "signal_workflow_external",
            SeqKind::Condition => "condition",
        }
    }
}

impl fmt::Display for SeqKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A sequence number within one [`SeqKind`]'s counter.
///
/// Two `Seq` values from different kinds may carry the same number; they are
/// never compared across kinds, only alongside the kind that minted them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Seq(pub u32);

impl fmt::Display for Seq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
