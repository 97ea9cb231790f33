//! Board pin map
//!
//! RP2040 wiring for the jig controller board:
//!
//! | Signal             | GPIO | Direction |
//! |--------------------|------|-----------|
//! | UART0 TX / RX      | 0/1  | link      |
//! | stack_present      | 2    | in        |
//! | cartridge_forward  | 3    | in        |
//! | cartridge_backward | 4    | in        |
//! | lift_up            | 5    | in        |
//! | reject_plate       | 6    | in        |
//! | start_button       | 7    | in        |
//! | stopper            | 10   | out       |
//! | transport          | 11   | out       |
//! | lift_down          | 12   | out       |
//! | diverter           | 13   | out       |
//! | buzzer             | 14   | out       |
//! | tower_lamp         | 15   | out       |
//! | I2C0 SDA / SCL     | 16/17| display   |
//!
//! Input pulls follow the configured polarity so an unconnected input
//! always reads as not asserted.

use embassy_rp::gpio::{Level, Pull};

use cartscan_core::config::{Polarity, SignalPolarity};
use cartscan_core::traits::Output;

/// I2C clock for the LCD backpack
pub const I2C_FREQUENCY_HZ: u32 = 100_000;

/// UART ring buffer size, each direction
pub const UART_BUF_LEN: usize = 256;

/// Pull resistor that holds an input at its idle level
pub fn idle_pull(polarity: Polarity) -> Pull {
    match polarity {
        Polarity::ActiveHigh => Pull::Down,
        Polarity::ActiveLow => Pull::Up,
    }
}

/// Pin level that keeps an output de-energized from reset
pub fn idle_level(signals: &SignalPolarity, output: Output) -> Level {
    Level::from(signals.output_level(output, false))
}
