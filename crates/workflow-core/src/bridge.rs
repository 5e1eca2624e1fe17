use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::oneshot;
use workflow_types::{CoreError, Payload, Seq, SeqKind};

use crate::registry::SequenceRegistry;

/// How a registered dependency call crosses the isolation boundary (§4.5).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyMode {
    /// Queue a host-side call; correlate the result by sequence when it
    /// comes back through `resolve_external_dependencies`.
    Async,
    /// Queue a host-side call whose result is discarded; no sequence is
    /// allocated.
    AsyncIgnored,
    /// Call the in-process invoker directly and await its result.
    Sync,
    /// Call the in-process invoker directly and discard its result.
    SyncIgnored,
}

/// An in-process implementation of one `(iface_name, fn_name)` dependency,
/// used for `Sync` / `SyncIgnored` calls.
#[async_trait::async_trait]
pub trait Invoker: Send + Sync {
    async fn invoke(&self, args: Vec<Payload>) -> Result<Payload, String>;
}

/// One host-side call queued during the current activation.
///
/// `seq` is `None` for `AsyncIgnored` calls -- nothing will ever correlate a
/// result back to them.
#[derive(Clone, Debug)]
pub struct PendingExternalCall {
    pub iface_name: String,
    pub fn_name: String,
    pub args: Vec<Payload>,
    pub seq: Option<Seq>,
}

/// Outcome of dispatching one dependency call, shaped by its `ApplyMode`.
pub enum CallOutcome {
    /// `Async`: await this to observe the eventual result.
    Awaiting(oneshot::Receiver<Result<Payload, String>>),
    /// `Sync`: the invoker already ran; here is its result.
    Immediate(Result<Payload, String>),
    /// `AsyncIgnored` / `SyncIgnored`: fired, nothing to observe.
    Fired,
}

#[derive(Default)]
struct Dependencies {
    invokers: HashMap<(String, String), Arc<dyn Invoker>>,
}

/// The external-dependency bridge: registered invokers, plus the queue of
/// calls the host must still service before the current activation can
/// conclude (invariant 7).
#[derive(Default)]
pub struct ExternalBridge {
    dependencies: Dependencies,
    pending: Vec<PendingExternalCall>,
}

impl ExternalBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inject(&mut self, iface_name: impl Into<String>, fn_name: impl Into<String>, invoker: Arc<dyn Invoker>) {
        self.dependencies
            .invokers
            .insert((iface_name.into(), fn_name.into()), invoker);
    }

    /// Dispatch one dependency call per its `ApplyMode`. `registry` is passed
    /// in rather than owned here so the bridge and the sequence registry can
    /// be borrowed independently by the dispatcher.
    pub async fn call(
        &mut self,
        registry: &mut SequenceRegistry,
        iface_name: &str,
        fn_name: &str,
        args: Vec<Payload>,
        apply_mode: ApplyMode,
    ) -> Result<CallOutcome, CoreError> {
        match apply_mode {
            ApplyMode::Async => {
                let (tx, rx) = oneshot::channel();
                let seq = registry.allocate_with_completion(SeqKind::Dependency, tx);
                self.pending.push(PendingExternalCall {
                    iface_name: iface_name.to_string(),
                    fn_name: fn_name.to_string(),
                    args,
                    seq: Some(seq),
                });
                Ok(CallOutcome::Awaiting(rx))
            }
            ApplyMode::AsyncIgnored => {
                self.pending.push(PendingExternalCall {
                    iface_name: iface_name.to_string(),
                    fn_name: fn_name.to_string(),
                    args,
                    seq: None,
                });
                Ok(CallOutcome::Fired)
            }
            ApplyMode::Sync => {
                let invoker = self.lookup(iface_name, fn_name)?;
                let result = invoker.invoke(args).await;
                Ok(CallOutcome::Immediate(result))
            }
            ApplyMode::SyncIgnored => {
                let invoker = self.lookup(iface_name, fn_name)?;
                let _ = invoker.invoke(args).await;
                Ok(CallOutcome::Fired)
            }
        }
    }

    fn lookup(&self, iface_name: &str, fn_name: &str) -> Result<Arc<dyn Invoker>, CoreError> {
        self.dependencies
            .invokers
            .get(&(iface_name.to_string(), fn_name.to_string()))
            .cloned()
            .ok_or_else(|| {
                CoreError::illegal_state(format!(
                    "no invoker registered for {iface_name}.{fn_name}"
                ))
            })
    }

    /// Resolve or reject each pending `Async` call named by sequence.
    /// Unknown sequences are `IllegalState` (testable property 8).
    pub fn resolve_external_dependencies(
        &mut self,
        registry: &mut SequenceRegistry,
        results: Vec<(Seq, Result<Payload, String>)>,
    ) -> Result<(), CoreError> {
        for (seq, outcome) in results {
            let completion = registry.consume(SeqKind::Dependency, seq)?;
            let _ = completion.send(outcome);
        }
        Ok(())
    }

    /// Return and clear the pending-calls list -- the host drains this
    /// before the activation can conclude.
    pub fn get_and_reset_pending_external_calls(&mut self) -> Vec<PendingExternalCall> {
        std::mem::take(&mut self.pending)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use workflow_types::Codec;

    struct Echo;

    #[async_trait::async_trait]
    impl Invoker for Echo {
        async fn invoke(&self, args: Vec<Payload>) -> Result<Payload, String> {
            Ok(args.into_iter().next().unwrap_or(Payload::new(vec![], Codec::Json)))
        }
    }

    #[tokio::test]
    async fn async_call_queues_a_pending_entry_with_a_sequence() {
        let mut bridge = ExternalBridge::new();
        let mut registry = SequenceRegistry::new();

        let outcome = bridge
            .call(&mut registry, "iface", "fn", vec![], ApplyMode::Async)
            .await
            .unwrap();

        assert!(matches!(outcome, CallOutcome::Awaiting(_)));
        let pending = bridge.get_and_reset_pending_external_calls();
        assert_eq!(pending.len(), 1);
        assert!(pending[0].seq.is_some());
    }

    #[tokio::test]
    async fn async_ignored_call_queues_a_pending_entry_with_no_sequence() {
        let mut bridge = ExternalBridge::new();
        let mut registry = SequenceRegistry::new();

        let outcome = bridge
            .call(&mut registry, "iface", "fn", vec![], ApplyMode::AsyncIgnored)
            .await
            .unwrap();

        assert!(matches!(outcome, CallOutcome::Fired));
        let pending = bridge.get_and_reset_pending_external_calls();
        assert_eq!(pending.len(), 1);
        assert!(pending[0].seq.is_none());
    }

    #[tokio::test]
    async fn sync_call_invokes_in_process_and_never_touches_pending() {
        let mut bridge = ExternalBridge::new();
        let mut registry = SequenceRegistry::new();
        bridge.inject("iface", "fn", Arc::new(Echo));

        let payload = Payload::new(vec![9], Codec::Json);
        let outcome = bridge
            .call(
                &mut registry,
                "iface",
                "fn",
                vec![payload.clone()],
                ApplyMode::Sync,
            )
            .await
            .unwrap();

        match outcome {
            CallOutcome::Immediate(Ok(result)) => assert_eq!(result, payload),
            _ => panic!("expected immediate ok result"),
        }
        assert!(!bridge.has_pending());
    }

    #[tokio::test]
    async fn resolve_external_dependencies_rejects_unknown_sequence() {
        let mut bridge = ExternalBridge::new();
        let mut registry = SequenceRegistry::new();

        let err = bridge
            .resolve_external_dependencies(&mut registry, vec![(Seq(0), Ok(Payload::new(vec![], Codec::Json)))])
            .unwrap_err();

        assert_eq!(err.kind(), workflow_types::FailureKind::IllegalState);
    }
}
