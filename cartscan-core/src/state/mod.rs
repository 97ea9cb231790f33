//! Batch/run state machine
//!
//! Defines the authoritative runtime behavior of the jig.
//! The state machine is explicit, finite, and deterministic.

pub mod context;
pub mod events;
pub mod fault;
pub mod machine;
pub mod outcome;

pub use context::{Counters, PendingVerdict, RunContext};
pub use events::Event;
pub use fault::{Fault, RECOVERY_INSTRUCTION};
pub use machine::RunState;
pub use outcome::{CycleOutcome, Lane};
