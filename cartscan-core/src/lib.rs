//! Board-agnostic core logic for the cartridge scanner jig
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Hardware abstraction traits (machine I/O, scan link, text display)
//! - Batch/run state machine
//! - Cycle sequencer (diverter, retract, load)
//! - Scan protocol engine (request, verdict, retry policy)
//! - Top-level controller
//! - Configuration types and the `machine.toml` parser

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod config;
pub mod controller;
pub mod cycle;
pub mod scan;
pub mod state;
pub mod traits;

pub use controller::Controller;
