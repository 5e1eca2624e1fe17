//! Deterministic workflow execution core.
//!
//! This crate is the sandboxed half of a durable-execution worker: given a
//! stream of host-decoded activations, it drives user workflow code
//! one job at a time, replaces every source of non-determinism (wall clock,
//! randomness, weak references) with a replay-safe substitute, and hands
//! back the commands the workflow produced. It never performs I/O, never
//! talks to an orchestration service, and is confined to a single
//! `tokio::task::LocalSet` -- workflow state is `!Send` by construction, the
//! same way the teacher's invariant engine keeps its journal off any
//! particular worker thread.
//!
//! Structured logging goes through `tracing`; errors that cross the public
//! API boundary are `CoreError` (see [`workflow_types::CoreError`]), a
//! `thiserror` enum rather than a string. `WorkflowState` and everything it
//! owns deliberately avoids `Send`/`Sync` bounds.

pub mod bridge;
pub mod commands;
pub mod conditions;
pub mod determinism;
pub mod dispatcher;
pub mod error;
pub mod hook;
pub mod interceptors;
pub mod jobstream;
pub mod lifecycle;
pub mod registry;
pub mod replay;
pub mod state;
pub mod status;
pub mod workflow;

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use workflow_types::{Activation, CoreError, Payload, RuntimeConfig, Seq, WorkflowInfo};

pub use bridge::{ApplyMode, CallOutcome, Invoker, PendingExternalCall};
pub use dispatcher::{ActivationOutcome, ConclusionResult};
pub use error::JobStreamViolation;
pub use hook::{HookCapability, NoopHook};
pub use status::{derive_status, ExecutionStatus};
pub use workflow::{Workflow, WorkflowContext, WorkflowLoader};

use state::WorkflowState;

/// The public facade: one run's worth of state plus the operations the host
/// drives it through (§6). Cheaply cloneable -- every clone shares the same
/// underlying run via `Rc`, which is the point: the host keeps one `Runtime`
/// per cached workflow execution and calls into it as activations arrive.
#[derive(Clone)]
pub struct Runtime {
    state: Rc<RefCell<WorkflowState>>,
}

impl Runtime {
    pub fn new(info: WorkflowInfo, now: DateTime<Utc>, randomness_seed: &[u8]) -> Self {
        Self {
            state: Rc::new(RefCell::new(WorkflowState::new(info, now, randomness_seed))),
        }
    }

    pub fn set_workflow_loader(&self, loader: Box<dyn WorkflowLoader>) {
        lifecycle::set_workflow_loader(&self.state, loader);
    }

    pub fn init_runtime(
        &self,
        workflow_type: &str,
        interceptor_module_refs: &[String],
        randomness_seed: &[u8],
        now: DateTime<Utc>,
        hook: Box<dyn HookCapability>,
        config: RuntimeConfig,
    ) -> Result<(), CoreError> {
        lifecycle::init_runtime(
            &self.state,
            workflow_type,
            interceptor_module_refs,
            randomness_seed,
            now,
            hook,
            config,
        )
    }

    pub fn inject(&self, iface_name: impl Into<String>, fn_name: impl Into<String>, invoker: Arc<dyn Invoker>) {
        self.state.borrow_mut().bridge.inject(iface_name, fn_name, invoker);
    }

    /// Run one activation through the composed activate-interceptor chain,
    /// down to the base dispatcher (§4.3, §4.7).
    pub async fn activate(&self, activation: Activation, batch_index: usize) -> Result<ActivationOutcome, CoreError> {
        let dispatch_state = Rc::clone(&self.state);
        let base: Rc<dyn Fn(Activation, usize) -> interceptors::BoxFuture<Result<ActivationOutcome, CoreError>>> =
            Rc::new(move |activation, batch_index| {
                let state = Rc::clone(&dispatch_state);
                Box::pin(async move { dispatcher::activate(&state, activation, batch_index).await })
            });

        let chain_future = {
            let guard = self.state.borrow();
            guard.interceptors.run_activate(activation, batch_index, base)
        };
        chain_future.await
    }

    /// Run the composed conclude-interceptor chain down to the base
    /// conclusion handler (§4.6, §4.7).
    pub async fn conclude_activation(&self) -> ConclusionResult {
        dispatcher::conclude_activation(&self.state).await
    }

    pub fn get_and_reset_pending_external_calls(&self) -> Vec<PendingExternalCall> {
        self.state.borrow_mut().bridge.get_and_reset_pending_external_calls()
    }

    pub fn resolve_external_dependencies(&self, results: Vec<(Seq, Result<Payload, String>)>) -> Result<(), CoreError> {
        let mut guard = self.state.borrow_mut();
        let WorkflowState { bridge, registry, .. } = &mut *guard;
        bridge.resolve_external_dependencies(registry, results)
    }

    pub fn try_unblock_conditions(&self) -> usize {
        dispatcher::try_unblock_conditions(&mut self.state.borrow_mut())
    }

    pub fn status(&self) -> ExecutionStatus {
        let guard = self.state.borrow();
        status::derive_status(guard.terminal_command.as_ref(), guard.conditions.len())
    }

    pub fn is_completed(&self) -> bool {
        self.state.borrow().completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::task::LocalSet;
    use workflow_types::{Codec, Job};

    struct Noop;

    #[async_trait::async_trait(?Send)]
    impl Workflow for Noop {
        async fn handle_job(
            &mut self,
            ctx: &mut WorkflowContext<'_>,
            job: Job,
        ) -> Result<(), workflow_types::WorkflowFailure> {
            if let Job::StartWorkflow { .. } = job {
                ctx.commands.push(workflow_types::Command::CompleteWorkflowExecution {
                    result: Payload::new(vec![], Codec::Json),
                });
            }
            Ok(())
        }
    }

    struct FixedLoader;

    impl WorkflowLoader for FixedLoader {
        fn load_workflow(&self, _workflow_type: &str) -> Option<Box<dyn Workflow>> {
            Some(Box::new(Noop))
        }
        fn load_interceptor_module(&self, _module_ref: &str) -> Result<interceptors::InterceptorModule, String> {
            Ok(interceptors::InterceptorModule {
                activate: None,
                conclude: None,
                inbound: None,
                outbound: None,
                internals: None,
            })
        }
    }

    #[tokio::test]
    async fn end_to_end_start_and_complete() {
        let local = LocalSet::new();
        local
            .run_until(async {
                let info = WorkflowInfo::new("noop", "run-1", "wf-1", "tq", "ns");
                let runtime = Runtime::new(info, Utc::now(), b"seed");
                runtime.set_workflow_loader(Box::new(FixedLoader));
                runtime
                    .init_runtime(
                        "noop",
                        &[],
                        b"seed",
                        Utc::now(),
                        Box::new(NoopHook),
                        RuntimeConfig::default(),
                    )
                    .unwrap();

                let activation = Activation::new(
                    Some(Utc::now()),
                    false,
                    vec![Job::StartWorkflow {
                        workflow_type: "noop".to_string(),
                        arguments: vec![],
                        randomness_seed: b"seed".to_vec(),
                    }],
                );
                let outcome = runtime.activate(activation, 0).await.unwrap();
                assert_eq!(outcome.num_blocked_conditions, 0);
                assert!(outcome.pending_external_calls.is_empty());

                match runtime.conclude_activation().await {
                    ConclusionResult::Complete { payload } => {
                        assert_eq!(payload.run_id, "run-1");
                        assert_eq!(payload.commands.len(), 1);
                    }
                    ConclusionResult::Pending { .. } => panic!("expected Complete"),
                }
                assert!(runtime.is_completed());
            })
            .await;
    }
}
