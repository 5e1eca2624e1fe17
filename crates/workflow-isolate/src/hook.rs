use workflow_core::HookCapability;

use crate::engine::WasmEngine;

/// The concrete isolation capability named in §9: a Wasmtime-epoch-based
/// execution budget, handed to `init_runtime` as a `Box<dyn HookCapability>`.
///
/// The core never reaches into this beyond calling [`HookCapability::arm`]
/// once at init (§4.8 step 3) -- the actual interruption ticks on the
/// background thread `EngineConfig::build_engine` already spawned, the same
/// way the teacher's engine increments its epoch independent of whatever
/// guest code happens to be running. `arm` exists only so the host has a
/// deterministic point to log "this run is now budget-enforced" from.
pub struct EpochHook {
    engine: WasmEngine,
}

impl EpochHook {
    pub fn new(engine: WasmEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &WasmEngine {
        &self.engine
    }
}

impl HookCapability for EpochHook {
    fn arm(&self) {
        tracing::debug!("epoch-based isolation budget armed for this run");
    }
}
