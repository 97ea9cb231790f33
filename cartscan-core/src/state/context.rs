//! Run context shared by the sequencer and the scan engine

use core::fmt::Write;

use heapless::String;

use super::outcome::Lane;

/// Cartridge counters for the lifetime of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Counters {
    /// Cartridges that reached the scan position
    pub count: u32,
    /// Cartridges accepted
    pub pass_count: u32,
}

impl Counters {
    /// Count a cartridge arriving at the scan position, returning its ordinal
    pub fn record_attempt(&mut self) -> u32 {
        self.count += 1;
        self.count
    }

    pub fn record_pass(&mut self) {
        self.pass_count += 1;
    }

    /// Counters line for the display, e.g. `T:12 P:10`
    pub fn summary(&self) -> String<32> {
        let mut line = String::new();
        // Two u32 values always fit in 32 bytes
        let _ = write!(line, "T:{} P:{}", self.count, self.pass_count);
        line
    }
}

/// The one scan request that may be outstanding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PendingVerdict {
    /// `count` when the request was issued
    pub ordinal: u32,
    /// Attempt number, starting at 1
    pub attempt: u8,
}

/// Mutable run state passed to the sequencer and the scan engine
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RunContext {
    pub counters: Counters,
    /// Lane chosen for the cartridge still at the scan position
    previous: Lane,
    /// No cartridge has been scanned since the batch started
    first_cycle: bool,
    pending: Option<PendingVerdict>,
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RunContext {
    pub fn new() -> Self {
        Self {
            counters: Counters::default(),
            previous: Lane::Pass,
            first_cycle: true,
            pending: None,
        }
    }

    /// Start a batch: nothing is at the scan position yet
    ///
    /// Counters carry over; they only clear on device reset.
    pub fn begin_batch(&mut self) {
        self.previous = Lane::Pass;
        self.first_cycle = true;
        self.pending = None;
    }

    /// Lane for the cartridge waiting to be ejected, if there is one
    pub fn previous_lane(&self) -> Option<Lane> {
        if self.first_cycle {
            None
        } else {
            Some(self.previous)
        }
    }

    /// Store the lane for the cartridge now at the scan position
    pub fn record_outcome(&mut self, lane: Lane) {
        if lane == Lane::Pass {
            self.counters.record_pass();
        }
        self.previous = lane;
        self.first_cycle = false;
    }

    pub fn pending(&self) -> Option<PendingVerdict> {
        self.pending
    }

    /// Mark a scan request as outstanding for the current cartridge
    ///
    /// A request must be resolved before the next one is opened.
    pub fn open_request(&mut self, attempt: u8) -> PendingVerdict {
        debug_assert!(
            self.pending.is_none(),
            "scan request issued while another is outstanding"
        );
        let pending = PendingVerdict {
            ordinal: self.counters.count,
            attempt,
        };
        self.pending = Some(pending);
        pending
    }

    /// Close the outstanding request, whatever its result
    pub fn resolve_request(&mut self) -> Option<PendingVerdict> {
        self.pending.take()
    }
}
