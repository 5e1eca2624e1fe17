mod activation;
mod command;
mod error;
mod info;
mod payload;
mod sequence;

pub use activation::{Activation, Job};
pub use command::{ActivationCompletion, Command};
pub use error::{CoreError, FailureKind, WorkflowFailure};
pub use info::{InitialNow, RandomnessSeed, RuntimeConfig, WorkflowInfo};
pub use payload::{Codec, Payload};
pub use sequence::{Seq, SeqKind};
