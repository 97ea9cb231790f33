//! Simple TOML parser for machine configuration
//!
//! This is a minimal TOML parser that handles only the subset needed for
//! `machine.toml`. It does NOT support the full TOML spec.
//!
//! Supported features:
//! - Key = value pairs (string, integer, boolean)
//! - [section] headers
//! - Comments (# ...)
//!
//! NOT supported:
//! - Arrays and inline tables
//! - Multi-line strings
//! - Dotted keys or dotted section headers
//!
//! Keys that are missing keep their default value. Unknown sections and
//! keys are rejected so a typo cannot silently fall back to a default.

use heapless::String as HString;

use super::signals::Polarity;
use super::types::{MachineConfig, MAX_BANNER_LEN};
use crate::traits::{Input, Output};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Invalid or unknown section header
    InvalidSection,
    /// Key not known in its section
    UnknownKey,
    /// Line is neither a header nor `key = value`
    InvalidLine,
    /// Invalid value type
    InvalidValue,
    /// String longer than its field
    TooLong,
    /// Parsed config fails validation (zero ceilings, no attempts...)
    OutOfRange,
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Machine,
    Banner,
    Limits,
    Scan,
    Delays,
    Inputs,
    Outputs,
}

/// Parse TOML configuration into MachineConfig
pub fn parse_config(input: &str) -> Result<MachineConfig, ParseError> {
    let mut config = MachineConfig::new();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') {
            section = parse_section_header(line)?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidLine)?;
        apply_value(section, key, value, &mut config)?;
    }

    if !config.is_valid() {
        return Err(ParseError::OutOfRange);
    }

    Ok(config)
}

/// Parse a header line like `[limits]`, trailing comment allowed
fn parse_section_header(line: &str) -> Result<Section, ParseError> {
    let line = strip_comment(line);
    if !line.ends_with(']') {
        return Err(ParseError::InvalidSection);
    }
    let end = line.len() - 1;

    match line[1..end].trim() {
        "machine" => Ok(Section::Machine),
        "banner" => Ok(Section::Banner),
        "limits" => Ok(Section::Limits),
        "scan" => Ok(Section::Scan),
        "delays" => Ok(Section::Delays),
        "inputs" => Ok(Section::Inputs),
        "outputs" => Ok(Section::Outputs),
        _ => Err(ParseError::InvalidSection),
    }
}

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    let value = strip_comment(value);

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Remove an inline comment, ignoring `#` inside a quoted string
fn strip_comment(value: &str) -> &str {
    let mut in_string = false;
    for (i, c) in value.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '#' if !in_string => return value[..i].trim(),
            _ => {}
        }
    }
    value
}

/// Parse a quoted string value
fn parse_string(value: &str) -> Result<&str, ParseError> {
    if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
        Ok(&value[1..value.len() - 1])
    } else {
        Err(ParseError::InvalidValue)
    }
}

/// Parse a string into a fixed-capacity field
fn parse_label<const N: usize>(value: &str) -> Result<HString<N>, ParseError> {
    let value = parse_string(value)?;
    HString::try_from(value).map_err(|_| ParseError::TooLong)
}

/// Parse an integer value, `_` separators allowed
fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    let mut digits: HString<24> = HString::new();
    for c in value.chars().filter(|&c| c != '_') {
        digits.push(c).map_err(|_| ParseError::InvalidValue)?;
    }
    digits.parse().map_err(|_| ParseError::InvalidValue)
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Result<bool, ParseError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::InvalidValue),
    }
}

/// Parse a polarity: `"active_high"`, `"active_low"` or `true` for inverted
fn parse_polarity(value: &str) -> Result<Polarity, ParseError> {
    if let Ok(inverted) = parse_bool(value) {
        return Ok(if inverted {
            Polarity::ActiveLow
        } else {
            Polarity::ActiveHigh
        });
    }
    Polarity::from_name(parse_string(value)?).ok_or(ParseError::InvalidValue)
}

/// Apply a parsed value to the appropriate config field
fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut MachineConfig,
) -> Result<(), ParseError> {
    match section {
        Section::Root => return Err(ParseError::UnknownKey),
        Section::Machine => match key {
            "version" => config.version = parse_int(value)?,
            _ => return Err(ParseError::UnknownKey),
        },
        Section::Banner => match key {
            "line1" => config.banner.line1 = parse_label::<MAX_BANNER_LEN>(value)?,
            "line2" => config.banner.line2 = parse_label::<MAX_BANNER_LEN>(value)?,
            _ => return Err(ParseError::UnknownKey),
        },
        Section::Limits => {
            let limits = &mut config.limits;
            match key {
                "tick_ms" => limits.tick_ms = parse_int(value)?,
                "forward_ticks" => limits.forward_ticks = parse_int(value)?,
                "backward_ticks" => limits.backward_ticks = parse_int(value)?,
                "lift_ticks" => limits.lift_ticks = parse_int(value)?,
                "diverter_ticks" => limits.diverter_ticks = parse_int(value)?,
                _ => return Err(ParseError::UnknownKey),
            }
        }
        Section::Scan => {
            let scan = &mut config.scan;
            match key {
                "attempts" => scan.attempts = parse_int(value)?,
                "busy_settle_ms" => scan.busy_settle_ms = parse_int(value)?,
                "poll_period_ms" => scan.poll_period_ms = parse_int(value)?,
                "max_wait_ms" => scan.max_wait_ms = parse_int(value)?,
                "after_result_ms" => scan.after_result_ms = parse_int(value)?,
                "retry_delay_ms" => scan.retry_delay_ms = parse_int(value)?,
                _ => return Err(ParseError::UnknownKey),
            }
        }
        Section::Delays => {
            let delays = &mut config.delays;
            let field = match key {
                "welcome_ms" => &mut delays.welcome_ms,
                "setup_poll_ms" => &mut delays.setup_poll_ms,
                "button_poll_ms" => &mut delays.button_poll_ms,
                "stack_poll_ms" => &mut delays.stack_poll_ms,
                "stack_empty_notice_ms" => &mut delays.stack_empty_notice_ms,
                "load_settle_ms" => &mut delays.load_settle_ms,
                "stopper_settle_ms" => &mut delays.stopper_settle_ms,
                "retract_settle_ms" => &mut delays.retract_settle_ms,
                "cycle_gap_ms" => &mut delays.cycle_gap_ms,
                "fault_blink_ms" => &mut delays.fault_blink_ms,
                _ => return Err(ParseError::UnknownKey),
            };
            *field = parse_int(value)?;
        }
        Section::Inputs => {
            let input = Input::from_name(key).ok_or(ParseError::UnknownKey)?;
            config.signals.set_input(input, parse_polarity(value)?);
        }
        Section::Outputs => {
            let output = Output::from_name(key).ok_or(ParseError::UnknownKey)?;
            config.signals.set_output(output, parse_polarity(value)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
# Production jig
[machine]
version = 1

[banner]
line1 = "CARTRIDGE QR"   # shown at boot
line2 = "SCANNER JIG"

[limits]
tick_ms = 1
forward_ticks = 4_000
backward_ticks = 10000

[scan]
attempts = 2
max_wait_ms = 8000

[delays]
cycle_gap_ms = 300

[inputs]
start_button = "active_low"
stack_present = "active_low"

[outputs]
buzzer = true
"#;

    #[test]
    fn test_parse_sample() {
        let config = parse_config(SAMPLE).unwrap();
        assert_eq!(config.banner.line1.as_str(), "CARTRIDGE QR");
        assert_eq!(config.banner.line2.as_str(), "SCANNER JIG");
        assert_eq!(config.limits.forward_ticks, 4000);
        assert_eq!(config.scan.attempts, 2);
        assert_eq!(config.scan.max_wait_ms, 8000);
        assert_eq!(config.delays.cycle_gap_ms, 300);
        assert_eq!(config.signals.input(Input::StackPresent), Polarity::ActiveLow);
        assert_eq!(config.signals.output(Output::Buzzer), Polarity::ActiveLow);
    }

    #[test]
    fn test_missing_keys_keep_defaults() {
        let config = parse_config(SAMPLE).unwrap();
        let defaults = MachineConfig::default();
        assert_eq!(config.limits.lift_ticks, defaults.limits.lift_ticks);
        assert_eq!(config.scan.poll_period_ms, defaults.scan.poll_period_ms);
        assert_eq!(config.delays.welcome_ms, defaults.delays.welcome_ms);
        assert_eq!(
            config.signals.output(Output::Diverter),
            Polarity::ActiveHigh
        );
    }

    #[test]
    fn test_empty_input_is_default() {
        assert_eq!(parse_config("").unwrap(), MachineConfig::default());
        assert_eq!(parse_config("# only a comment\n").unwrap(), MachineConfig::default());
    }

    #[test]
    fn test_unknown_section() {
        assert_eq!(
            parse_config("[motors]\nspeed = 3\n"),
            Err(ParseError::InvalidSection)
        );
    }

    #[test]
    fn test_unknown_key() {
        assert_eq!(
            parse_config("[limits]\nforward = 5000\n"),
            Err(ParseError::UnknownKey)
        );
        assert_eq!(
            parse_config("[inputs]\nmenu_button = \"active_low\"\n"),
            Err(ParseError::UnknownKey)
        );
        assert_eq!(parse_config("version = 1\n"), Err(ParseError::UnknownKey));
    }

    #[test]
    fn test_invalid_values() {
        assert_eq!(
            parse_config("[scan]\nattempts = three\n"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_config("[scan]\nattempts = 300\n"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_config("[inputs]\nlift_up = \"sideways\"\n"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_config("[banner]\nline1 = WELCOME\n"),
            Err(ParseError::InvalidValue)
        );
    }

    #[test]
    fn test_banner_too_long() {
        assert_eq!(
            parse_config("[banner]\nline1 = \"THIS IS FAR TOO LONG\"\n"),
            Err(ParseError::TooLong)
        );
    }

    #[test]
    fn test_hash_inside_string() {
        let config = parse_config("[banner]\nline2 = \"JIG #2\" # second unit\n").unwrap();
        assert_eq!(config.banner.line2.as_str(), "JIG #2");
    }

    #[test]
    fn test_validation() {
        assert_eq!(
            parse_config("[scan]\nattempts = 0\n"),
            Err(ParseError::OutOfRange)
        );
        assert_eq!(
            parse_config("[limits]\ntick_ms = 0\n"),
            Err(ParseError::OutOfRange)
        );
        assert_eq!(
            parse_config("[machine]\nversion = 2\n"),
            Err(ParseError::OutOfRange)
        );
    }

    #[test]
    fn test_malformed_lines() {
        assert_eq!(parse_config("[limits\n"), Err(ParseError::InvalidSection));
        assert_eq!(parse_config("[limits]\njunk\n"), Err(ParseError::InvalidLine));
    }
}
