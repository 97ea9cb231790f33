//! Operator-visible faults

use super::outcome::Lane;

/// Second display line for every fault
pub const RECOVERY_INSTRUCTION: &str = "Press START";

/// Faults that end a run
///
/// All of them are fatal: the mechanism is de-energized, the operator
/// acknowledges with the start button and the device resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Fault {
    /// Diverter plate never reached the commanded lane
    DiverterStuck(Lane),
    /// Transport did not return to the stack
    TransportBackStuck,
    /// Lift plate did not come up
    LiftUpStuck,
    /// Transport did not reach the scan position
    TransportForwardStuck,
    /// No verdict byte arrived for any attempt
    ScanTimeout,
    /// Attempts used up without a readable code
    ScanError,
}

impl Fault {
    /// First display line
    pub fn message(&self) -> &'static str {
        match self {
            Fault::DiverterStuck(Lane::Pass) => "PASS PLT STUCK",
            Fault::DiverterStuck(Lane::Reject) => "REJECT PLT STUCK",
            Fault::TransportBackStuck => "CAT PLT BK STUCK",
            Fault::LiftUpStuck => "MCH PLT U STUCK",
            Fault::TransportForwardStuck => "CAT PLT FW STUCK",
            Fault::ScanTimeout => "QR TIMEOUT",
            Fault::ScanError => "QR ERROR",
        }
    }

    /// Second display line
    pub fn instruction(&self) -> &'static str {
        RECOVERY_INSTRUCTION
    }

    /// Check if the fault came from a sensor-confirmed motion
    pub fn is_mechanical(&self) -> bool {
        !matches!(self, Fault::ScanTimeout | Fault::ScanError)
    }
}
