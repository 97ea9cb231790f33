//! Scanner link protocol
//!
//! This crate defines the UART protocol between the jig controller and the
//! scanning peripheral (the board that owns the QR camera). Every message is
//! a single byte; there is no framing and no checksum.
//!
//! # Protocol Overview
//!
//! ```text
//! controller                          peripheral
//!     │                                    │
//!     │ <──────────── 'B' ──────────────── │  batch set up, start scanning
//!     │                                    │
//!     │ ──── 0x14 (retry) / 0x13 (final) ─>│  scan the cartridge in place
//!     │                                    │
//!     │ <──── 'A' | 'R' | 'D' | 'S' ────── │  verdict
//! ```
//!
//! The controller never has more than one scan request outstanding; the
//! peripheral answers each request with at most one verdict byte.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod messages;
pub mod timing;

pub use messages::{Inbound, ScanRequest, Verdict, CMD_START_SCANNING};
pub use timing::*;
