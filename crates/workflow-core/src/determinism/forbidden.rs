use workflow_types::CoreError;

/// Stand-in for any primitive whose behavior is observable from garbage
/// collection timing (the "weak map / weak set / weak reference" family).
///
/// There is no deterministic substitute for GC timing, so unlike the clock
/// and the PRNG this has no replay-safe implementation — the only correct
/// behavior is to refuse construction.
#[derive(Debug)]
pub struct ForbiddenHandle {
    _private: (),
}

impl ForbiddenHandle {
    /// Always fails. Exists so workflow code that reaches for this family of
    /// primitives gets a typed `DeterminismViolation` instead of silently
    /// running non-deterministically.
    pub fn new() -> Result<Self, CoreError> {
        Err(CoreError::determinism_violation(
            "weak references are not reproducible across replay",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_always_raises_determinism_violation() {
        let err = ForbiddenHandle::new().unwrap_err();
        assert_eq!(err.kind(), workflow_types::FailureKind::Nondeterminism);
    }
}
