//! Machine I/O drivers

pub mod pins;

pub use pins::PinBank;
