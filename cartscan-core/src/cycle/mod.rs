//! Cycle sequencer
//!
//! Drives one cartridge at a time through the transport. Every motion is
//! confirmed by a sensor within a tick budget; a motion that never
//! confirms is a stuck-actuator fault.
//!
//! ```text
//!  diverter-set ─> retract ─> stack? ─> load ─> scan ─┐
//!       ^                       │ empty               │
//!       │                       v                     │
//!       │                 StackEmptyWait              │
//!       └─────────────────────────────────────────────┘
//! ```
//!
//! Diverter-set and retract act on the cartridge scanned by the previous
//! cycle, so both are skipped on the first cycle of a batch.

pub mod sequencer;
pub mod step;

pub use sequencer::{CycleEnd, CycleSequencer};
pub use step::{await_step, StepKind, TimeoutBudget};

use crate::traits::{MachineIo, Output};

/// Drive every actuator to its safe position
///
/// Stopper up, lift up, transport back, diverter on the pass lane,
/// buzzer and tower lamp off.
pub fn reset_mechanism<IO: MachineIo>(io: &mut IO) {
    io.write_output(Output::Buzzer, false);
    io.write_output(Output::LiftDown, false);
    io.write_output(Output::Transport, false);
    io.write_output(Output::Diverter, false);
    io.write_output(Output::Stopper, false);
    io.write_output(Output::TowerLamp, false);
}
