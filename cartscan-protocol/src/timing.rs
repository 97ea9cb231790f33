//! Link timing (milliseconds)
//!
//! Both ends poll; these values keep them in step.

/// Delay after sending a scan request before the first poll
pub const T_BUSY_SETTLE_MS: u32 = 20;

/// Delay the peripheral observes before emitting a verdict
pub const T_BEFORE_RESULT_MS: u32 = 10;

/// Delay the controller observes after receiving a verdict
pub const T_AFTER_RESULT_MS: u32 = 10;

/// Poll / emit cadence on both sides
pub const T_CMD_PERIOD_MS: u32 = 20;

/// End-to-end wait for one verdict
pub const T_CMD_MAX_WAIT_MS: u32 = 12_000;

/// Link baud rate (8N1)
pub const BAUD_RATE: u32 = 115_200;
