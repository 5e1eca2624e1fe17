use std::collections::VecDeque;

use workflow_types::Command;

/// Ordered, append-only outgoing command queue.
///
/// Mirrors the `outgoing_wf_activation_jobs` queue on temporal-sdk-core's
/// `DrivenWorkflow`: workflow code pushes commands as it runs, and the
/// dispatcher drains the whole queue atomically at conclusion (invariant 6).
#[derive(Default)]
pub struct CommandBuffer {
    commands: VecDeque<Command>,
}

impl CommandBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: Command) {
        self.commands.push_back(command);
    }

    pub fn has_pending(&self) -> bool {
        !self.commands.is_empty()
    }

    /// Empty the buffer, returning its prior contents in push order.
    pub fn drain(&mut self) -> Vec<Command> {
        self.commands.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use workflow_types::{Codec, Payload};

    #[test]
    fn drain_returns_in_push_order_and_empties_the_buffer() {
        let mut buffer = CommandBuffer::new();
        buffer.push(Command::CompleteWorkflowExecution {
            result: Payload::new(vec![1], Codec::Json),
        });
        buffer.push(Command::CompleteWorkflowExecution {
            result: Payload::new(vec![2], Codec::Json),
        });

        let drained = buffer.drain();

        assert_eq!(drained.len(), 2);
        assert!(buffer.is_empty());
        assert!(buffer.drain().is_empty());
    }
}
