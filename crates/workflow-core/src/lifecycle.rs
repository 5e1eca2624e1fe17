use std::cell::RefCell;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use workflow_types::{CoreError, RuntimeConfig, WorkflowFailure};

use crate::determinism::Alea;
use crate::dispatcher::handle_workflow_failure;
use crate::hook::HookCapability;
use crate::state::WorkflowState;
use crate::workflow::WorkflowLoader;

/// Install the loader the core consults for workflow code and interceptor
/// modules. Must be called before [`init_runtime`].
pub fn set_workflow_loader(state: &Rc<RefCell<WorkflowState>>, loader: Box<dyn WorkflowLoader>) {
    state.borrow_mut().loader = Some(loader);
}

/// Bring up one workflow run (§4.8).
///
/// Seeds the deterministic clock and PRNG, arms the host's isolation
/// capability, installs every interceptor module the loader contributes, and
/// resolves the named workflow type. A workflow type the loader cannot
/// resolve is not surfaced as an `init_runtime` error: it is routed through
/// the same [`handle_workflow_failure`] path a failure mid-activation would
/// take, carrying the `ReferenceError` category the host surfaces to users,
/// so the run still produces a well-formed terminal command instead of
/// leaving the host with nothing to report back to the orchestration
/// service.
///
/// Touching a forbidden construct (weak references, finalizers) is rejected
/// unconditionally by [`crate::determinism::ForbiddenHandle::new`] itself --
/// there is no separate stub to arm here.
///
/// `config` is the layered, host-constructed [`RuntimeConfig`] (SPEC_FULL
/// §9 ambient stack): none of its fields are ever read by workflow code,
/// but the run carries them so the isolation capability and host-side
/// cache-eviction policy have a single source of truth for this run's
/// budget rather than each reaching for its own copy.
pub fn init_runtime(
    state: &Rc<RefCell<WorkflowState>>,
    workflow_type: &str,
    interceptor_module_refs: &[String],
    randomness_seed: &[u8],
    now: DateTime<Utc>,
    hook: Box<dyn HookCapability>,
    config: RuntimeConfig,
) -> Result<(), CoreError> {
    let mut guard = state.borrow_mut();

    guard.clock.advance(Some(now));
    guard.random = Alea::from_seed_bytes(randomness_seed);

    tracing::debug!(
        isolate_execution_timeout_ms = config.isolate_execution_timeout_ms,
        max_cached_workflows = config.max_cached_workflows,
        "runtime config installed"
    );
    guard.config = config;

    hook.arm();
    guard.hook = hook;

    if guard.loader.is_none() {
        return Err(CoreError::illegal_state(
            "init_runtime called before a workflow loader was installed",
        ));
    }

    let mut modules = Vec::with_capacity(interceptor_module_refs.len());
    for module_ref in interceptor_module_refs {
        let module = guard
            .loader
            .as_ref()
            .expect("checked above")
            .load_interceptor_module(module_ref)
            .map_err(|err| {
                CoreError::illegal_state(format!(
                    "interceptor module '{module_ref}' failed to load: {err}"
                ))
            })?;
        modules.push(module);
    }
    for module in modules {
        guard.interceptors.install(module);
    }

    let workflow = guard.loader.as_ref().expect("checked above").load_workflow(workflow_type);
    match workflow {
        Some(workflow) => guard.workflow = Some(workflow),
        None => {
            tracing::warn!(workflow_type, "workflow type not registered");
            let failure = WorkflowFailure::workflow_type_not_found(
                workflow_type,
                &format!("ReferenceError: workflow type '{workflow_type}' is not registered"),
            );
            handle_workflow_failure(&mut guard, failure);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use workflow_types::{Codec, Command, Payload, RuntimeConfig, WorkflowInfo};

    use crate::interceptors::InterceptorModule;
    use crate::workflow::Workflow;

    struct Echo;

    #[async_trait::async_trait(?Send)]
    impl Workflow for Echo {
        async fn handle_job(
            &mut self,
            _ctx: &mut crate::workflow::WorkflowContext<'_>,
            _job: workflow_types::Job,
        ) -> Result<(), WorkflowFailure> {
            Ok(())
        }
    }

    struct FixedLoader;

    impl WorkflowLoader for FixedLoader {
        fn load_workflow(&self, workflow_type: &str) -> Option<Box<dyn Workflow>> {
            (workflow_type == "echo").then(|| Box::new(Echo) as Box<dyn Workflow>)
        }

        fn load_interceptor_module(&self, _module_ref: &str) -> Result<InterceptorModule, String> {
            Ok(InterceptorModule {
                activate: None,
                conclude: None,
                inbound: None,
                outbound: None,
                internals: None,
            })
        }
    }

    fn state() -> Rc<RefCell<WorkflowState>> {
        let info = WorkflowInfo::new("echo", "run-1", "wf-1", "tq", "ns");
        Rc::new(RefCell::new(WorkflowState::new(info, Utc::now(), b"seed")))
    }

    #[test]
    fn init_runtime_fails_illegal_state_without_a_loader() {
        let state = state();
        let err = init_runtime(
            &state,
            "echo",
            &[],
            b"seed",
            Utc::now(),
            Box::new(crate::hook::NoopHook),
            RuntimeConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), workflow_types::FailureKind::IllegalState);
    }

    #[test]
    fn init_runtime_installs_the_resolved_workflow() {
        let state = state();
        set_workflow_loader(&state, Box::new(FixedLoader));

        init_runtime(
            &state,
            "echo",
            &[],
            b"seed",
            Utc::now(),
            Box::new(crate::hook::NoopHook),
            RuntimeConfig::default(),
        )
        .unwrap();

        assert!(state.borrow().workflow.is_some());
        assert!(!state.borrow().completed);
    }

    #[test]
    fn init_runtime_installs_the_supplied_runtime_config() {
        let state = state();
        set_workflow_loader(&state, Box::new(FixedLoader));
        let config = RuntimeConfig {
            isolate_execution_timeout_ms: 42,
            max_cached_workflows: 7,
        };

        init_runtime(
            &state,
            "echo",
            &[],
            b"seed",
            Utc::now(),
            Box::new(crate::hook::NoopHook),
            config.clone(),
        )
        .unwrap();

        assert_eq!(state.borrow().config, config);
    }

    #[test]
    fn init_runtime_fails_the_workflow_when_type_is_unregistered() {
        let state = state();
        set_workflow_loader(&state, Box::new(FixedLoader));

        init_runtime(
            &state,
            "missing",
            &[],
            b"seed",
            Utc::now(),
            Box::new(crate::hook::NoopHook),
            RuntimeConfig::default(),
        )
        .unwrap();

        let guard = state.borrow();
        assert!(guard.completed);
        assert!(guard.workflow.is_none());
        match guard.terminal_command.as_ref().unwrap() {
            Command::FailWorkflowExecution { failure } => {
                assert_eq!(failure.category.as_deref(), Some("ReferenceError"));
            }
            other => panic!("expected FailWorkflowExecution, got {other:?}"),
        }
    }

    #[test]
    fn init_runtime_installs_interceptor_modules_from_the_loader() {
        let state = state();
        set_workflow_loader(&state, Box::new(FixedLoader));

        init_runtime(
            &state,
            "echo",
            &["module-a".to_string()],
            b"seed",
            Utc::now(),
            Box::new(crate::hook::NoopHook),
            RuntimeConfig::default(),
        )
        .unwrap();

        // no observable effect with an empty module (no activate/conclude
        // interceptor), but load_interceptor_module must not have errored.
        assert!(state.borrow().workflow.is_some());
        let _ = Payload::new(vec![], Codec::Json);
    }
}
