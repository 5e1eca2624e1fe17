/// The ambient isolation capability a host installs once per run, before any
/// workflow code executes (§4.8 step 3, §9).
///
/// This core never enforces an execution-time budget itself -- the isolation
/// layer does, out of band, the same way the teacher's Wasmtime
/// epoch-interruption engine ticks a background thread independent of
/// whatever code is currently running. This trait exists purely so
/// `init_runtime` has somewhere to hand the capability off to, without
/// pulling a `wasmtime` dependency into this crate.
pub trait HookCapability {
    /// Called once, at `init_runtime` time, so the capability can arm
    /// whatever timer or interrupt mechanism backs it.
    fn arm(&self);
}

/// The capability installed when the host supplies none: no enforcement.
pub struct NoopHook;

impl HookCapability for NoopHook {
    fn arm(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_hook_arm_does_not_panic() {
        NoopHook.arm();
    }
}
