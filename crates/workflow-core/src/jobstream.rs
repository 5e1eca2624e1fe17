use std::collections::HashSet;

use workflow_types::{Job, SeqKind};

use crate::error::JobStreamViolation;
use crate::registry::SequenceRegistry;

/// Lightweight ordering checks on the incoming job stream (§10), mirroring
/// the teacher's side-effect and control-flow invariant groups: a resolve or
/// fire job must reference a sequence this run actually allocated, and each
/// sequence may be resolved at most once.
#[derive(Default)]
pub struct JobStreamGuard {
    seen: HashSet<(SeqKind, workflow_types::Seq)>,
}

impl JobStreamGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `job` against `registry`'s currently-registered completions.
    /// Call this before dispatching the job, while its completion (if any)
    /// is still registered.
    pub fn check(&mut self, job: &Job, registry: &SequenceRegistry) -> Result<(), JobStreamViolation> {
        let (kind, seq) = match job {
            Job::FireTimer { seq } => (SeqKind::Timer, *seq),
            Job::ResolveActivity { seq, .. } => (SeqKind::Activity, *seq),
            Job::ResolveChildWorkflowExecution { seq, .. } => (SeqKind::ChildWorkflow, *seq),
            _ => return Ok(()),
        };

        if !self.seen.insert((kind, seq)) {
            return Err(JobStreamViolation::DuplicateResolution { kind, seq });
        }

        if !registry.is_registered(kind, seq) {
            return Err(match kind {
                SeqKind::Timer => JobStreamViolation::TimerNotScheduled { seq },
                SeqKind::Activity => JobStreamViolation::ActivityNotScheduled { seq },
                SeqKind::ChildWorkflow => JobStreamViolation::ChildWorkflowNotScheduled { seq },
                _ => unreachable!("only Timer/Activity/ChildWorkflow jobs reach this branch"),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::oneshot;
    use workflow_types::Seq;

    #[test]
    fn fire_timer_for_unscheduled_seq_is_a_violation() {
        let mut guard = JobStreamGuard::new();
        let registry = SequenceRegistry::new();

        let err = guard
            .check(&Job::FireTimer { seq: Seq(0) }, &registry)
            .unwrap_err();

        assert_eq!(err, JobStreamViolation::TimerNotScheduled { seq: Seq(0) });
    }

    #[test]
    fn fire_timer_for_scheduled_seq_passes_once() {
        let mut guard = JobStreamGuard::new();
        let mut registry = SequenceRegistry::new();
        let (tx, _rx) = oneshot::channel();
        let seq = registry.allocate_with_completion(SeqKind::Timer, tx);

        assert!(guard.check(&Job::FireTimer { seq }, &registry).is_ok());

        let err = guard.check(&Job::FireTimer { seq }, &registry).unwrap_err();
        assert_eq!(err, JobStreamViolation::DuplicateResolution { kind: SeqKind::Timer, seq });
    }
}
