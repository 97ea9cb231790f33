//! Embedded configuration loader
//!
//! build.rs has already validated machine.toml, so a parse failure here
//! means the core parser and the build check disagree. The jig still has
//! to run, so it falls back to the built-in defaults.

use defmt::*;

use cartscan_core::config::{parse_config, MachineConfig, ParseError};

/// Embedded configuration (compiled into firmware)
/// Edit machine.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../../machine.toml");

/// Parse the embedded configuration, or fall back to defaults
pub fn load_config() -> MachineConfig {
    match load_from(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!(
                "Config loaded: {} attempts, {} ms verdict wait",
                config.scan.attempts, config.scan.max_wait_ms
            );
            config
        }
        Err(e) => {
            warn!("Embedded config rejected ({}), using defaults", e);
            MachineConfig::default()
        }
    }
}

fn load_from(source: &str) -> Result<MachineConfig, ParseError> {
    let config = parse_config(source)?;
    debug!(
        "Limits: fw={} bk={} lift={} div={} ticks",
        config.limits.forward_ticks,
        config.limits.backward_ticks,
        config.limits.lift_ticks,
        config.limits.diverter_ticks
    );
    Ok(config)
}
