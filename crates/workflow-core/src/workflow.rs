use std::time::Duration;

use tokio::sync::oneshot;
use workflow_types::{Command, Job, Payload, Seq, SeqKind, WorkflowFailure, WorkflowInfo};

use crate::bridge::ExternalBridge;
use crate::commands::CommandBuffer;
use crate::conditions::BlockedConditions;
use crate::determinism::{Alea, Clock};
use crate::registry::SequenceRegistry;
use crate::replay::ReplayCache;

/// The capabilities workflow code is handed to observe and affect its run --
/// never process-global state, always an explicit value passed in (§4.1).
pub struct WorkflowContext<'a> {
    pub info: &'a WorkflowInfo,
    pub clock: &'a Clock,
    pub random: &'a mut Alea,
    pub commands: &'a mut CommandBuffer,
    pub registry: &'a mut SequenceRegistry,
    pub conditions: &'a mut BlockedConditions,
    pub bridge: &'a mut ExternalBridge,
    pub replay_cache: &'a mut ReplayCache,
}

impl<'a> WorkflowContext<'a> {
    /// Register a condition predicate, returning its sequence and the
    /// receiving half of the oneshot the dispatcher resolves once
    /// `try_unblock_conditions` finds it true.
    pub fn await_condition(&mut self, predicate: Box<dyn Fn() -> bool>) -> (Seq, oneshot::Receiver<()>) {
        let seq = self.registry.allocate(SeqKind::Condition);
        let (tx, rx) = oneshot::channel();
        self.conditions.register(seq, predicate, tx);
        (seq, rx)
    }

    /// Sleep/timeout primitive (§4.1): allocate a fresh `Timer` sequence,
    /// register its completion, enqueue `StartTimer{seq, duration}`, and
    /// hand back the sequence as the caller's cancellation handle. The
    /// completion resolves (never rejects) when `FireTimer` dispatches for
    /// this sequence -- see `dispatcher::dispatch_one`.
    pub fn sleep(&mut self, duration: Duration) -> (Seq, oneshot::Receiver<Result<Payload, String>>) {
        let (tx, rx) = oneshot::channel();
        let seq = self.registry.allocate_with_completion(SeqKind::Timer, tx);
        self.emit_scheduling_command(SeqKind::Timer, seq, Command::StartTimer { seq, duration });
        (seq, rx)
    }

    /// Cancel-timeout primitive (§4.1): remove the completion without
    /// resolving it and enqueue `CancelTimer{seq}`. Cancellation is a
    /// silent drop -- the original resolver is discarded, never rejected.
    pub fn cancel_timer(&mut self, seq: Seq) {
        self.registry.drop_completion(SeqKind::Timer, seq);
        self.commands.push(Command::CancelTimer { seq });
    }

    /// Push a scheduling command, suppressing re-emission when this exact
    /// `(kind, seq)` was already recorded as scheduled and the run is
    /// replaying (§10): a replayed `StartTimer` must not re-enqueue a
    /// command the orchestration service already holds a record of. Seq
    /// allocation is deterministic given the same history, so a replay
    /// reaching the same call site allocates the same sequence.
    fn emit_scheduling_command(&mut self, kind: SeqKind, seq: Seq, command: Command) {
        let already_known = self.info.is_replaying && self.replay_cache.was_scheduled(kind, seq);
        if !already_known {
            self.commands.push(command);
        }
        self.replay_cache.record_scheduled(kind, seq);
    }
}

/// User workflow code, modeled as an async trait object rather than a wasm
/// sandbox -- the same shape as temporal-sdk-core's `DrivenWorkflow` /
/// `WorkflowFetcher`: the core drives it by handing over one job at a time
/// and reading back the commands it pushed onto the shared buffer.
#[async_trait::async_trait(?Send)]
pub trait Workflow {
    async fn handle_job(
        &mut self,
        ctx: &mut WorkflowContext<'_>,
        job: Job,
    ) -> Result<(), WorkflowFailure>;
}

/// Resolves workflow types and interceptor module references by name.
///
/// Supplied to `init_runtime` via `set_workflow_loader`; the core never
/// reads workflow code or interceptor modules off disk itself.
pub trait WorkflowLoader {
    fn load_workflow(&self, workflow_type: &str) -> Option<Box<dyn Workflow>>;
    fn load_interceptor_module(&self, module_ref: &str) -> Result<crate::interceptors::InterceptorModule, String>;
}
