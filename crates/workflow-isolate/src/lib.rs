mod component_loader;
mod engine;
mod error;
mod hook;

pub use component_loader::{ComponentLoader, ComponentSource};
pub use engine::{EngineConfig, WasmEngine};
pub use error::RuntimeError;
pub use hook::EpochHook;
