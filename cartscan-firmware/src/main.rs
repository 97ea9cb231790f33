//! Cartscan - Cartridge QR Scanner Jig Firmware
//!
//! Main firmware binary for the RP2040 jig controller. Loads a cartridge
//! from the stack, asks the scanning peripheral for a verdict over UART0
//! and routes the cartridge to the pass or reject lane on the next cycle.
//!
//! The control loop is blocking; all timing goes through
//! `embassy_time::Delay`. A fatal fault is shown until the operator
//! acknowledges it, then the device resets.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Output};
use embassy_rp::i2c::{Config as I2cConfig, I2c};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_time::Delay;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use cartscan_core::state::RunState;
use cartscan_core::traits::{Board, Input as Signal, Output as Drive};
use cartscan_core::Controller;
use cartscan_drivers::display::DEFAULT_ADDR;
use cartscan_drivers::{Hd44780, PinBank, UartLink};
use cartscan_protocol::BAUD_RATE;

use crate::board::{idle_level, idle_pull, I2C_FREQUENCY_HZ, UART_BUF_LEN};
use crate::config::load_config;

mod board;
mod config;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; UART_BUF_LEN]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; UART_BUF_LEN]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("Cartscan firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = load_config();
    let signals = config.signals;

    // Machine I/O, indexed in signal order
    let inputs = [
        Input::new(p.PIN_2, idle_pull(signals.input(Signal::StackPresent))),
        Input::new(p.PIN_3, idle_pull(signals.input(Signal::CartridgeForward))),
        Input::new(p.PIN_4, idle_pull(signals.input(Signal::CartridgeBackward))),
        Input::new(p.PIN_5, idle_pull(signals.input(Signal::LiftUp))),
        Input::new(p.PIN_6, idle_pull(signals.input(Signal::RejectPlate))),
        Input::new(p.PIN_7, idle_pull(signals.input(Signal::StartButton))),
    ];
    let outputs = [
        Output::new(p.PIN_10, idle_level(&signals, Drive::Stopper)),
        Output::new(p.PIN_11, idle_level(&signals, Drive::Transport)),
        Output::new(p.PIN_12, idle_level(&signals, Drive::LiftDown)),
        Output::new(p.PIN_13, idle_level(&signals, Drive::Diverter)),
        Output::new(p.PIN_14, idle_level(&signals, Drive::Buzzer)),
        Output::new(p.PIN_15, idle_level(&signals, Drive::TowerLamp)),
    ];
    let io = PinBank::new(inputs, outputs, signals);

    // Scanner link
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = BAUD_RATE;

    let tx_buf = TX_BUF.init([0u8; UART_BUF_LEN]);
    let rx_buf = RX_BUF.init([0u8; UART_BUF_LEN]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let link = UartLink::new(uart);
    info!("UART initialized at {} baud", BAUD_RATE);

    // Operator display
    let mut i2c_config = I2cConfig::default();
    i2c_config.frequency = I2C_FREQUENCY_HZ;
    let i2c = I2c::new_blocking(p.I2C0, p.PIN_17, p.PIN_16, i2c_config);

    let mut display = Hd44780::new(i2c, Delay, DEFAULT_ADDR);
    if display.init().is_err() {
        // The jig can run without the display; keep going
        warn!("LCD did not acknowledge at {=u8:#x}", DEFAULT_ADDR);
    }

    let board = Board::new(io, link, display, Delay);
    let mut controller = Controller::new(config, board);

    // Driver error counters are reported at every batch end and on a fault
    let fault = controller.run(|state, board| {
        if !matches!(state, RunState::StackEmptyWait | RunState::FatalError(_)) {
            return;
        }
        let pin_errors = board.io.errors();
        let lcd_errors = board.display.errors();
        let link = board.link.stats();
        if pin_errors > 0 || lcd_errors > 0 || link.rx_errors > 0 || link.tx_errors > 0 {
            warn!(
                "Hardware errors: pins={} lcd={} link={}",
                pin_errors, lcd_errors, link
            );
        } else {
            info!("Link: {} bytes in, {} bytes out", link.rx_bytes, link.tx_bytes);
        }
    });
    error!("Fault acknowledged: {}, resetting", fault);
    cortex_m::peripheral::SCB::sys_reset();
}
