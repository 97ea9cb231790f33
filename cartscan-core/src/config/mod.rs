//! Configuration types
//!
//! Board-agnostic configuration structures, parsed at boot from the
//! `machine.toml` embedded in the firmware image.

pub mod signals;
pub mod toml;
pub mod types;

pub use signals::{Polarity, SignalPolarity};
pub use toml::{parse_config, ParseError};
pub use types::*;
