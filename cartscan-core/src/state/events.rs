//! Events that trigger state transitions

use super::fault::Fault;

/// Events that can trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Peripheral sent the start-scanning byte
    StartScanning,
    /// Stack-present sensor asserted
    StackPresent,
    /// Stack-present sensor released with no cartridge mid-cycle
    StackEmpty,
    /// Start button pressed and released
    StartPressed,
    /// Stuck actuator or scan exhaustion
    Fault(Fault),
}
