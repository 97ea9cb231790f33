//! Configuration loading
//!
//! The machine configuration is compiled into the firmware from
//! machine.toml and parsed at boot by the no_std parser in cartscan-core.

pub mod loader;

pub use loader::load_config;
