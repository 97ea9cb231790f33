//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in cartscan-core on top of the embedded-hal and embedded-io traits:
//!
//! - Machine I/O over GPIO pins with per-signal polarity
//! - Scan link over a byte-oriented UART
//! - HD44780 character LCD behind a PCF8574 I2C backpack

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod display;
pub mod io;
pub mod link;

pub use display::Hd44780;
pub use io::PinBank;
pub use link::UartLink;
