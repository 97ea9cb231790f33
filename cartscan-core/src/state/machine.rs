//! State machine definition
//!
//! The controller runs the handler for the current state, which produces
//! one event; the next state is a pure function of the two.

use super::events::Event;
use super::fault::Fault;

/// Run states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RunState {
    /// Waiting for the peripheral to finish batch setup
    Setup,
    /// Stack loaded, waiting for the operator's start press
    AwaitStart,
    /// Cycle sequencer running
    Cycling,
    /// Stack ran out, waiting for a refill
    StackEmptyWait,
    /// Mechanism de-energized, waiting for acknowledgment and reset
    FatalError(Fault),
}

impl RunState {
    /// Check if this is the terminal fault state
    pub fn is_fatal(&self) -> bool {
        matches!(self, RunState::FatalError(_))
    }

    /// Fault being reported, if any
    pub fn fault(&self) -> Option<Fault> {
        match self {
            RunState::FatalError(fault) => Some(*fault),
            _ => None,
        }
    }

    /// Process an event and return the next state
    pub fn transition(self, event: Event) -> Self {
        use Event::*;
        use RunState::*;

        match (self, event) {
            // Only a reset leaves FatalError
            (FatalError(_), _) => self,
            (_, Fault(fault)) => FatalError(fault),

            (Setup, StartScanning) => AwaitStart,

            (AwaitStart, StartPressed) => Cycling,
            (AwaitStart, StackEmpty) => StackEmptyWait,

            (Cycling, StackEmpty) => StackEmptyWait,

            (StackEmptyWait, StackPresent) => AwaitStart,

            // Default: stay in current state
            _ => self,
        }
    }
}
