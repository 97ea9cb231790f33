//! Scan protocol engine
//!
//! Asks the peripheral to scan the cartridge at the scan position and
//! turns its verdict bytes into a lane, retrying skips and silence up to
//! the configured attempt budget.

pub mod engine;

pub use engine::ScanEngine;
