//! Build script for cartscan-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates machine.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

const INPUTS: [&str; 6] = [
    "stack_present",
    "cartridge_forward",
    "cartridge_backward",
    "lift_up",
    "reject_plate",
    "start_button",
];

const OUTPUTS: [&str; 6] = [
    "stopper",
    "transport",
    "lift_down",
    "diverter",
    "buzzer",
    "tower_lamp",
];

const POLARITIES: [&str; 4] = ["active_high", "high", "active_low", "low"];

/// Integer keys per section with their accepted range
const INT_KEYS: &[(&str, &str, i64, i64)] = &[
    ("machine", "version", 1, 1),
    ("limits", "tick_ms", 1, 100),
    ("limits", "forward_ticks", 1, 600_000),
    ("limits", "backward_ticks", 1, 600_000),
    ("limits", "lift_ticks", 1, 600_000),
    ("limits", "diverter_ticks", 1, 600_000),
    ("scan", "attempts", 1, 255),
    ("scan", "busy_settle_ms", 0, 60_000),
    ("scan", "poll_period_ms", 1, 60_000),
    ("scan", "max_wait_ms", 1, 600_000),
    ("scan", "after_result_ms", 0, 60_000),
    ("scan", "retry_delay_ms", 0, 60_000),
    ("delays", "welcome_ms", 0, 60_000),
    ("delays", "setup_poll_ms", 1, 60_000),
    ("delays", "button_poll_ms", 1, 60_000),
    ("delays", "stack_poll_ms", 1, 60_000),
    ("delays", "stack_empty_notice_ms", 0, 60_000),
    ("delays", "load_settle_ms", 0, 60_000),
    ("delays", "stopper_settle_ms", 0, 60_000),
    ("delays", "retract_settle_ms", 0, 60_000),
    ("delays", "cycle_gap_ms", 0, 60_000),
    ("delays", "fault_blink_ms", 1, 60_000),
];

/// Banner lines must fit the 16-column display
const BANNER_COLS: usize = 16;

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    if env::var_os("CARGO_FEATURE_DEFMT").is_some() {
        println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
    }

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate machine.toml configuration at compile time
fn validate_config() {
    // Re-run if machine.toml changes
    println!("cargo:rerun-if-changed=machine.toml");

    let config_path = Path::new("machine.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: machine.toml not found!                                  ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds machine.toml as its configuration.          ║\n\
            ║  Please create one in the cartscan-firmware directory.           ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read machine.toml                              ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    // Parse and validate TOML syntax
    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in machine.toml                      ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_layout(&config, &mut errors);
    validate_numbers(&config, &mut errors);
    validate_banner(&config, &mut errors);
    validate_signals(&config, "inputs", &INPUTS, &mut errors);
    validate_signals(&config, "outputs", &OUTPUTS, &mut errors);
    validate_scan_window(&config, &mut errors);
    report("Invalid machine configuration", &errors);

    println!("cargo:warning=machine.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn report(title: &str, errors: &[String]) {
    if errors.is_empty() {
        return;
    }
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        errors
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

fn known_keys(section: &str) -> Vec<&'static str> {
    match section {
        "banner" => vec!["line1", "line2"],
        "inputs" => INPUTS.to_vec(),
        "outputs" => OUTPUTS.to_vec(),
        _ => INT_KEYS
            .iter()
            .filter(|(s, ..)| *s == section)
            .map(|(_, key, ..)| *key)
            .collect(),
    }
}

/// Only known sections holding known keys; the firmware parser rejects the rest
fn validate_layout(config: &toml::Value, errors: &mut Vec<String>) {
    let root = match config.as_table() {
        Some(t) => t,
        None => return,
    };

    for (section, body) in root {
        let keys = known_keys(section);
        if keys.is_empty() {
            errors.push(format!("unknown section [{}]", section));
            continue;
        }
        let body = match body.as_table() {
            Some(t) => t,
            None => {
                errors.push(format!("[{}] must be a table", section));
                continue;
            }
        };
        for key in body.keys() {
            if !keys.contains(&key.as_str()) {
                errors.push(format!("[{}] unknown key '{}'", section, key));
            }
        }
    }
}

fn validate_numbers(config: &toml::Value, errors: &mut Vec<String>) {
    for (section, key, min, max) in INT_KEYS {
        match config.get(section).and_then(|s| s.get(key)) {
            None => {}
            Some(toml::Value::Integer(value)) => {
                if value < min || value > max {
                    errors.push(format!("[{}] {} must be {}-{}", section, key, min, max));
                }
            }
            Some(_) => errors.push(format!("[{}] {} must be an integer", section, key)),
        }
    }
}

fn validate_banner(config: &toml::Value, errors: &mut Vec<String>) {
    for key in ["line1", "line2"] {
        match config.get("banner").and_then(|s| s.get(key)) {
            None => {}
            Some(toml::Value::String(text)) => {
                if text.len() > BANNER_COLS {
                    errors.push(format!(
                        "[banner] {} longer than {} characters",
                        key, BANNER_COLS
                    ));
                }
            }
            Some(_) => errors.push(format!("[banner] {} must be a string", key)),
        }
    }
}

fn validate_signals(
    config: &toml::Value,
    section: &str,
    names: &[&str],
    errors: &mut Vec<String>,
) {
    let table = match config.get(section).and_then(|s| s.as_table()) {
        Some(t) => t,
        None => return,
    };

    for name in names {
        match table.get(*name) {
            None | Some(toml::Value::Boolean(_)) => {}
            Some(toml::Value::String(p)) => {
                if !POLARITIES.contains(&p.as_str()) {
                    errors.push(format!(
                        "[{}] {} must be 'active_high' or 'active_low'",
                        section, name
                    ));
                }
            }
            Some(_) => errors.push(format!(
                "[{}] {} must be a polarity name or true (inverted)",
                section, name
            )),
        }
    }
}

/// A single verdict wait must fit at least one poll
fn validate_scan_window(config: &toml::Value, errors: &mut Vec<String>) {
    let get = |key: &str| {
        config
            .get("scan")
            .and_then(|s| s.get(key))
            .and_then(|v| v.as_integer())
    };
    if let (Some(poll), Some(max_wait)) = (get("poll_period_ms"), get("max_wait_ms")) {
        if max_wait < poll {
            errors.push("[scan] max_wait_ms must be at least poll_period_ms".to_string());
        }
    }
}
