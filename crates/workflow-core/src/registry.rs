use std::collections::HashMap;

use tokio::sync::oneshot;
use workflow_types::{CoreError, Payload, Seq, SeqKind};

/// One outstanding completion: the sending half of a oneshot channel whose
/// receiving half is held by whatever workflow-code future is awaiting this
/// sequence. `Ok` resolves it, `Err` rejects it with a message.
pub type Completion = oneshot::Sender<Result<Payload, String>>;

/// Per-kind monotonic sequence counters plus the map from `(kind, seq)` to
/// its pending completion.
///
/// Each [`SeqKind`] owns an independent counter (invariant 1): allocating a
/// `Timer` sequence never consumes an `Activity` sequence. Completions are
/// consumed exactly once (invariant 2) -- [`SequenceRegistry::consume`]
/// removes the entry on success.
#[derive(Default)]
pub struct SequenceRegistry {
    next: HashMap<SeqKind, u32>,
    completions: HashMap<(SeqKind, Seq), Completion>,
}

impl SequenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next sequence for `kind`, without registering a
    /// completion for it. Used for fire-and-forget allocations (e.g.
    /// `AsyncIgnored` dependency calls, which never populate `completions`).
    pub fn allocate(&mut self, kind: SeqKind) -> Seq {
        let counter = self.next.entry(kind).or_insert(0);
        let seq = Seq(*counter);
        *counter += 1;
        seq
    }

    /// Allocate a sequence and register its completion in one step -- the
    /// common case for timers, activities, and dependency calls.
    pub fn allocate_with_completion(&mut self, kind: SeqKind, completion: Completion) -> Seq {
        let seq = self.allocate(kind);
        self.completions.insert((kind, seq), completion);
        seq
    }

    /// Remove a completion without resolving it. Used by timer cancellation,
    /// which is a silent drop (§5): the registry no longer holds an entry for
    /// that sequence, but nothing fires.
    pub fn drop_completion(&mut self, kind: SeqKind, seq: Seq) {
        self.completions.remove(&(kind, seq));
    }

    /// Atomically remove and return the completion registered under
    /// `(kind, seq)`. Fails `IllegalState` if none is found: a protocol bug
    /// or a duplicate resolution (invariant 2, testable property 4).
    pub fn consume(&mut self, kind: SeqKind, seq: Seq) -> Result<Completion, CoreError> {
        self.completions.remove(&(kind, seq)).ok_or_else(|| {
            CoreError::illegal_state(format!("no pending completion for {kind} seq {seq}"))
        })
    }

    pub fn is_registered(&self, kind: SeqKind, seq: Seq) -> bool {
        self.completions.contains_key(&(kind, seq))
    }

    pub fn pending_count(&self) -> usize {
        self.completions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use workflow_types::Codec;

    #[test]
    fn allocate_increments_independently_per_kind() {
        let mut registry = SequenceRegistry::new();

        assert_eq!(registry.allocate(SeqKind::Timer), Seq(0));
        assert_eq!(registry.allocate(SeqKind::Timer), Seq(1));
        assert_eq!(registry.allocate(SeqKind::Activity), Seq(0));
    }

    #[test]
    fn consume_is_exactly_once() {
        let mut registry = SequenceRegistry::new();
        let (tx, _rx) = oneshot::channel();
        let seq = registry.allocate_with_completion(SeqKind::Timer, tx);

        assert!(registry.consume(SeqKind::Timer, seq).is_ok());
        let err = registry.consume(SeqKind::Timer, seq).unwrap_err();
        assert_eq!(err.kind(), workflow_types::FailureKind::IllegalState);
    }

    #[test]
    fn drop_completion_removes_without_resolving() {
        let mut registry = SequenceRegistry::new();
        let (tx, rx) = oneshot::channel();
        let seq = registry.allocate_with_completion(SeqKind::Timer, tx);

        registry.drop_completion(SeqKind::Timer, seq);

        assert!(!registry.is_registered(SeqKind::Timer, seq));
        assert!(rx.blocking_recv().is_err());
    }

    #[test]
    fn consumed_completion_can_resolve_the_awaiting_side() {
        let mut registry = SequenceRegistry::new();
        let (tx, rx) = oneshot::channel();
        let seq = registry.allocate_with_completion(SeqKind::Activity, tx);

        let completion = registry.consume(SeqKind::Activity, seq).unwrap();
        completion
            .send(Ok(Payload::new(vec![1, 2, 3], Codec::Json)))
            .unwrap();

        assert_eq!(
            rx.blocking_recv().unwrap().unwrap(),
            Payload::new(vec![1, 2, 3], Codec::Json)
        );
    }
}
