use std::collections::BTreeMap;

use tokio::sync::oneshot;
use workflow_types::Seq;

struct BlockedCondition {
    predicate: Box<dyn Fn() -> bool>,
    resolve: oneshot::Sender<()>,
}

/// Registry of workflow-registered predicates waiting to become true.
///
/// A `BTreeMap` keyed by `Seq` keeps iteration in allocation order, which is
/// the order `try_unblock` is specified to preserve (§4.4); condition
/// sequences are minted from the same per-kind counter as every other
/// resource kind, so ordering here falls naturally out of `Seq`'s `Ord` impl.
#[derive(Default)]
pub struct BlockedConditions {
    conditions: BTreeMap<Seq, BlockedCondition>,
}

impl BlockedConditions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, seq: Seq, predicate: Box<dyn Fn() -> bool>, resolve: oneshot::Sender<()>) {
        self.conditions.insert(seq, BlockedCondition { predicate, resolve });
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Evaluate every registered predicate to a fixed point: repeat full
    /// passes until one makes no progress, resolving and removing each entry
    /// whose predicate turns true as it is found. Returns the total number
    /// unblocked across all passes (testable property 6).
    pub fn try_unblock(&mut self) -> usize {
        let mut total = 0;

        loop {
            let ready: Vec<Seq> = self
                .conditions
                .iter()
                .filter(|(_, cond)| (cond.predicate)())
                .map(|(seq, _)| *seq)
                .collect();

            if ready.is_empty() {
                break;
            }

            for seq in ready {
                if let Some(cond) = self.conditions.remove(&seq) {
                    let _ = cond.resolve.send(());
                    total += 1;
                }
            }
        }

        total
    }
}
