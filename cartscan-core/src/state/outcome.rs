//! Scan outcomes and diverter lanes

use cartscan_protocol::Verdict;

/// Lane a cartridge leaves the scan position through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Lane {
    /// Accepted cartridges; also the diverter's idle position
    #[default]
    Pass,
    Reject,
}

impl Lane {
    /// Diverter output level that selects this lane
    pub fn diverter_on(self) -> bool {
        matches!(self, Lane::Reject)
    }
}

/// Classification of one scan attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CycleOutcome {
    Pass,
    Reject,
    /// Peripheral could not read the code
    Skip,
    /// No verdict within the wait window
    Error,
}

impl CycleOutcome {
    /// Classify a verdict byte; duplicates go to the reject lane
    pub fn from_verdict(verdict: Verdict) -> Self {
        match verdict {
            Verdict::Accept => CycleOutcome::Pass,
            Verdict::Reject | Verdict::Duplicate => CycleOutcome::Reject,
            Verdict::Skip => CycleOutcome::Skip,
        }
    }

    /// Lane for a terminal outcome, `None` when another attempt is needed
    pub fn lane(self) -> Option<Lane> {
        match self {
            CycleOutcome::Pass => Some(Lane::Pass),
            CycleOutcome::Reject => Some(Lane::Reject),
            CycleOutcome::Skip | CycleOutcome::Error => None,
        }
    }
}
