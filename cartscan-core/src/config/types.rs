//! Configuration type definitions
//!
//! Defaults reproduce the timing of the production jig.

use heapless::String;

use cartscan_protocol::{T_AFTER_RESULT_MS, T_BUSY_SETTLE_MS, T_CMD_MAX_WAIT_MS, T_CMD_PERIOD_MS};

use super::signals::SignalPolarity;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum banner line length (display width)
pub const MAX_BANNER_LEN: usize = 16;

/// Current config format version
pub const CONFIG_VERSION: u8 = 1;

/// Tick ceilings for sensor-confirmed motions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StepLimits {
    /// Sleep between sensor polls (ms)
    pub tick_ms: u32,
    /// Transport forward to the scan position
    pub forward_ticks: u32,
    /// Transport back to the stack
    pub backward_ticks: u32,
    /// Lift plate up
    pub lift_ticks: u32,
    /// Diverter plate to either lane
    pub diverter_ticks: u32,
}

impl Default for StepLimits {
    fn default() -> Self {
        Self {
            tick_ms: 1,
            forward_ticks: 5000,
            backward_ticks: 10000,
            lift_ticks: 6000,
            diverter_ticks: 6000,
        }
    }
}

/// Scan request timing and retry budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScanConfig {
    /// Requests per cartridge before giving up
    pub attempts: u8,
    /// Wait after a request before the first poll (ms)
    pub busy_settle_ms: u32,
    /// Poll period while waiting for a verdict (ms)
    pub poll_period_ms: u32,
    /// Give up on one request after this long (ms)
    pub max_wait_ms: u32,
    /// Pause after a verdict byte arrives (ms)
    pub after_result_ms: u32,
    /// Pause before re-sending after a skip or silence (ms)
    pub retry_delay_ms: u32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            busy_settle_ms: T_BUSY_SETTLE_MS,
            poll_period_ms: T_CMD_PERIOD_MS,
            max_wait_ms: T_CMD_MAX_WAIT_MS,
            after_result_ms: T_AFTER_RESULT_MS,
            retry_delay_ms: 500,
        }
    }
}

/// Fixed pauses and poll intervals of the sequence (ms)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SequenceDelays {
    /// Boot banner
    pub welcome_ms: u32,
    /// Link poll while waiting for batch setup
    pub setup_poll_ms: u32,
    /// Start button poll
    pub button_poll_ms: u32,
    /// Stack sensor poll
    pub stack_poll_ms: u32,
    /// How long the stack-empty notice stays up before polling resumes
    pub stack_empty_notice_ms: u32,
    /// After the transport starts forward
    pub load_settle_ms: u32,
    /// After the stopper comes back up
    pub stopper_settle_ms: u32,
    /// After the retract completes
    pub retract_settle_ms: u32,
    /// Between cycles
    pub cycle_gap_ms: u32,
    /// Half period of the fault lamp/buzzer blink
    pub fault_blink_ms: u32,
}

impl Default for SequenceDelays {
    fn default() -> Self {
        Self {
            welcome_ms: 1200,
            setup_poll_ms: 50,
            button_poll_ms: 50,
            stack_poll_ms: 100,
            stack_empty_notice_ms: 500,
            load_settle_ms: 500,
            stopper_settle_ms: 500,
            retract_settle_ms: 250,
            cycle_gap_ms: 500,
            fault_blink_ms: 500,
        }
    }
}

/// Boot banner text
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BannerConfig {
    pub line1: String<MAX_BANNER_LEN>,
    pub line2: String<MAX_BANNER_LEN>,
}

impl Default for BannerConfig {
    fn default() -> Self {
        let mut line1 = String::new();
        let _ = line1.push_str("WELCOME");
        Self {
            line1,
            line2: String::new(),
        }
    }
}

/// Complete machine configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MachineConfig {
    /// Config format version
    pub version: u8,
    pub limits: StepLimits,
    pub scan: ScanConfig,
    pub delays: SequenceDelays,
    pub banner: BannerConfig,
    pub signals: SignalPolarity,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl MachineConfig {
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            limits: StepLimits::default(),
            scan: ScanConfig::default(),
            delays: SequenceDelays::default(),
            banner: BannerConfig::default(),
            signals: SignalPolarity::default(),
        }
    }

    /// Check values the sequencer relies on
    ///
    /// Zero ceilings or periods would turn every wait into an instant
    /// fault or a zero-length busy loop.
    pub fn is_valid(&self) -> bool {
        let limits = &self.limits;
        let scan = &self.scan;
        self.version == CONFIG_VERSION
            && limits.tick_ms > 0
            && limits.forward_ticks > 0
            && limits.backward_ticks > 0
            && limits.lift_ticks > 0
            && limits.diverter_ticks > 0
            && scan.attempts > 0
            && scan.poll_period_ms > 0
            && scan.max_wait_ms >= scan.poll_period_ms
            && self.delays.setup_poll_ms > 0
            && self.delays.button_poll_ms > 0
            && self.delays.stack_poll_ms > 0
            && self.delays.fault_blink_ms > 0
    }
}
