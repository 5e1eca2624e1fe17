use std::cell::RefCell;
use std::rc::Rc;

use workflow_types::{ActivationCompletion, Activation, Codec, Command, CoreError, Job, Payload, Seq, SeqKind, WorkflowFailure};

use crate::bridge::PendingExternalCall;
use crate::interceptors::BoxFuture;
use crate::state::WorkflowState;
use crate::workflow::WorkflowContext;

/// What one `activate` call hands back to the host once the job scheduler
/// goes quiescent (§4.3 step 4).
#[derive(Debug)]
pub struct ActivationOutcome {
    pub pending_external_calls: Vec<PendingExternalCall>,
    pub num_blocked_conditions: usize,
}

/// What `conclude_activation` hands back (§4.6).
pub enum ConclusionResult {
    /// The host must service these calls and feed results back before
    /// asking for conclusion again.
    Pending {
        pending_external_calls: Vec<PendingExternalCall>,
        num_blocked_conditions: usize,
    },
    Complete { payload: ActivationCompletion },
}

/// Enqueue the workflow failure as a terminal command and seal the run
/// (§7 propagation policy).
pub fn handle_workflow_failure(state: &mut WorkflowState, failure: WorkflowFailure) {
    tracing::warn!(message = %failure.message, ?failure.kind, "workflow failed");
    state.mark_terminal(Command::FailWorkflowExecution { failure });
}

pub fn try_unblock_conditions(state: &mut WorkflowState) -> usize {
    state.conditions.try_unblock()
}

/// The base `activate` handler: decode, advance the clock, route jobs to
/// their handlers, run the condition unblocker after each, and report
/// quiescence. This is the innermost link the interceptor chain wraps
/// (§4.3 step 1) -- composed with that chain by the runtime facade, not by
/// this function.
///
/// Jobs are dispatched as separate `spawn_local` tasks on the caller's
/// `LocalSet`, one per job as specified, but this implementation awaits each
/// task before spawning the next: `WorkflowState` is shared behind a single
/// `Rc<RefCell<_>>`, and a real concurrent interleaving of two jobs' access
/// to it would be unsound the moment either suspends mid-dispatch. Real
/// engines answer this with a single-threaded, run-to-completion scheduler
/// per microtask; awaiting sequentially here gives the same observable
/// ordering guarantee without requiring a redundant locking layer.
pub async fn activate(
    state: &Rc<RefCell<WorkflowState>>,
    activation: Activation,
    batch_index: usize,
) -> Result<ActivationOutcome, CoreError> {
    if batch_index == 0 {
        let mut guard = state.borrow_mut();
        guard.clock.advance(activation.timestamp);
        guard.info.is_replaying = activation.is_replaying;
    }

    for job in activation.jobs {
        let should_drop = {
            let guard = state.borrow();
            guard.completed && !job.runs_after_completion()
        };
        if should_drop {
            tracing::trace!(job = job.name(), "dropping job after workflow completion");
            continue;
        }

        {
            let mut guard = state.borrow_mut();
            let violation = guard.job_stream_guard.check(&job, &guard.registry).err();
            if let Some(violation) = violation {
                let failure = WorkflowFailure::new(
                    workflow_types::FailureKind::Nondeterminism,
                    violation.to_string(),
                );
                handle_workflow_failure(&mut guard, failure);
                continue;
            }
        }

        tracing::debug!(job = job.name(), "dispatching job");

        let task_state = Rc::clone(state);
        let handle = tokio::task::spawn_local(async move { dispatch_one(task_state, job).await });
        let outcome = handle
            .await
            .unwrap_or_else(|_| Err(WorkflowFailure::new(
                workflow_types::FailureKind::IllegalState,
                "job task panicked",
            )));

        if let Err(failure) = outcome {
            let mut guard = state.borrow_mut();
            handle_workflow_failure(&mut guard, failure);
        }

        state.borrow_mut().conditions.try_unblock();
    }

    let mut guard = state.borrow_mut();
    Ok(ActivationOutcome {
        pending_external_calls: guard.bridge.get_and_reset_pending_external_calls(),
        num_blocked_conditions: guard.conditions.len(),
    })
}

/// Dispatch a single job. Jobs that resolve a previously-registered
/// completion (timer fires, activity/child-workflow/external-workflow
/// resolutions) never reach workflow code directly -- they just wake up
/// whatever future is already suspended on that sequence. Everything else
/// is handed to the workflow.
async fn dispatch_one(
    state: Rc<RefCell<WorkflowState>>,
    job: Job,
) -> Result<(), WorkflowFailure> {
    match job {
        Job::FireTimer { seq } => {
            let completion = state.borrow_mut().registry.consume(SeqKind::Timer, seq);
            if let Ok(completion) = completion {
                let _ = completion.send(Ok(Payload::new(vec![], Codec::Json)));
            }
            Ok(())
        }
        Job::ResolveActivity { seq, result } => {
            let completion = state.borrow_mut().registry.consume(SeqKind::Activity, seq);
            if let Ok(completion) = completion {
                let _ = completion.send(result);
            }
            Ok(())
        }
        Job::ResolveChildWorkflowExecution { seq, result } => {
            let completion = state.borrow_mut().registry.consume(SeqKind::ChildWorkflow, seq);
            if let Ok(completion) = completion {
                let _ = completion.send(result);
            }
            Ok(())
        }
        Job::ResolveSignalExternalWorkflow { seq, failure } => {
            let completion = state
                .borrow_mut()
                .registry
                .consume(SeqKind::SignalWorkflowExternal, seq);
            if let Ok(completion) = completion {
                let _ = completion.send(resolve_or_fail(failure));
            }
            Ok(())
        }
        Job::ResolveRequestCancelExternalWorkflow { seq, failure } => {
            let completion = state
                .borrow_mut()
                .registry
                .consume(SeqKind::CancelWorkflowExternal, seq);
            if let Ok(completion) = completion {
                let _ = completion.send(resolve_or_fail(failure));
            }
            Ok(())
        }
        other => run_workflow_handler(&state, other).await,
    }
}

fn resolve_or_fail(failure: Option<String>) -> Result<Payload, String> {
    match failure {
        Some(message) => Err(message),
        None => Ok(Payload::new(vec![], Codec::Json)),
    }
}

async fn run_workflow_handler(
    state: &Rc<RefCell<WorkflowState>>,
    job: Job,
) -> Result<(), WorkflowFailure> {
    let mut workflow = {
        let mut guard = state.borrow_mut();
        guard
            .workflow
            .take()
            .expect("init_runtime must install a workflow before activate is called")
    };

    let result = {
        let mut guard = state.borrow_mut();
        let mut ctx = WorkflowContext {
            info: &guard.info,
            clock: &guard.clock,
            random: &mut guard.random,
            commands: &mut guard.commands,
            registry: &mut guard.registry,
            conditions: &mut guard.conditions,
            bridge: &mut guard.bridge,
            replay_cache: &mut guard.replay_cache,
        };
        workflow.handle_job(&mut ctx, job).await
    };

    state.borrow_mut().workflow = Some(workflow);
    result
}

/// The base `conclude_activation` handler (§4.6).
pub async fn conclude_activation(state: &Rc<RefCell<WorkflowState>>) -> ConclusionResult {
    let pending = state.borrow_mut().bridge.get_and_reset_pending_external_calls();
    if !pending.is_empty() {
        let num_blocked_conditions = state.borrow().conditions.len();
        return ConclusionResult::Pending {
            pending_external_calls: pending,
            num_blocked_conditions,
        };
    }

    let payload = {
        let mut guard = state.borrow_mut();
        let run_id = guard.info.run_id.clone();
        let commands = guard.commands.drain();
        ActivationCompletion { run_id, commands }
    };

    let future: BoxFuture<ActivationCompletion> = {
        let guard = state.borrow();
        let base = Rc::new(move || {
            let payload = payload.clone();
            Box::pin(async move { payload }) as BoxFuture<ActivationCompletion>
        });
        guard.interceptors.run_conclude(base)
    };
    let completion = future.await;

    ConclusionResult::Complete { payload: completion }
}
