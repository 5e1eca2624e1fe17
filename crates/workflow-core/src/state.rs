use chrono::{DateTime, Utc};
use workflow_types::{Command, RuntimeConfig, WorkflowInfo};

use crate::bridge::ExternalBridge;
use crate::commands::CommandBuffer;
use crate::conditions::BlockedConditions;
use crate::determinism::{Alea, Clock};
use crate::hook::{HookCapability, NoopHook};
use crate::interceptors::InterceptorChain;
use crate::jobstream::JobStreamGuard;
use crate::registry::SequenceRegistry;
use crate::replay::ReplayCache;
use crate::workflow::{Workflow, WorkflowLoader};

/// Everything one isolated workflow run owns (§3 `WorkflowState`). Created by
/// `init_runtime`, lives for the run's lifetime across however many
/// activations arrive, destroyed by host disposal.
pub struct WorkflowState {
    pub info: WorkflowInfo,
    pub config: RuntimeConfig,
    pub clock: Clock,
    pub random: Alea,
    pub workflow: Option<Box<dyn Workflow>>,
    pub commands: CommandBuffer,
    pub registry: SequenceRegistry,
    pub conditions: BlockedConditions,
    pub bridge: ExternalBridge,
    pub interceptors: InterceptorChain,
    pub replay_cache: ReplayCache,
    pub job_stream_guard: JobStreamGuard,
    pub completed: bool,
    pub terminal_command: Option<Command>,
    pub loader: Option<Box<dyn WorkflowLoader>>,
    pub hook: Box<dyn HookCapability>,
}

impl WorkflowState {
    pub fn new(info: WorkflowInfo, now: DateTime<Utc>, randomness_seed: &[u8]) -> Self {
        Self {
            info,
            config: RuntimeConfig::default(),
            clock: Clock::new(now),
            random: Alea::from_seed_bytes(randomness_seed),
            workflow: None,
            commands: CommandBuffer::new(),
            registry: SequenceRegistry::new(),
            conditions: BlockedConditions::new(),
            bridge: ExternalBridge::new(),
            interceptors: InterceptorChain::new(),
            replay_cache: ReplayCache::new(),
            job_stream_guard: JobStreamGuard::new(),
            completed: false,
            terminal_command: None,
            loader: None,
            hook: Box::new(NoopHook),
        }
    }

    /// Record a terminal command and seal the run (invariant 3: only
    /// `QueryWorkflow` jobs run from here on).
    pub fn mark_terminal(&mut self, command: Command) {
        self.commands.push(command.clone());
        self.terminal_command = Some(command);
        self.completed = true;
    }
}
