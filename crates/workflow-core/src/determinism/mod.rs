//! Deterministic replacements for ambient facilities (§4.1).
//!
//! Workflow code never reads the host clock, the host RNG, or constructs a
//! GC-timing-dependent handle directly; every such read is routed through
//! one of these three.

mod clock;
mod forbidden;
mod random;

pub use clock::Clock;
pub use forbidden::ForbiddenHandle;
pub use random::Alea;
