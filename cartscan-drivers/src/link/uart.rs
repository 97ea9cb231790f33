//! UART scan link
//!
//! Adapts any embedded-io byte stream that can report pending receive
//! data (for example a buffered UART) to the scan link trait.

use embedded_io::{Read, ReadReady, Write};

use cartscan_core::traits::ScanLink;

/// Link error counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkStats {
    pub rx_bytes: u32,
    pub tx_bytes: u32,
    pub rx_errors: u32,
    pub tx_errors: u32,
}

/// Scan link over a UART
pub struct UartLink<U> {
    uart: U,
    stats: LinkStats,
}

impl<U> UartLink<U>
where
    U: Read + ReadReady + Write,
{
    pub fn new(uart: U) -> Self {
        Self {
            uart,
            stats: LinkStats::default(),
        }
    }

    pub fn stats(&self) -> LinkStats {
        self.stats
    }

    pub fn release(self) -> U {
        self.uart
    }
}

impl<U> ScanLink for UartLink<U>
where
    U: Read + ReadReady + Write,
{
    fn try_read_byte(&mut self) -> Option<u8> {
        match self.uart.read_ready() {
            Ok(true) => {}
            Ok(false) => return None,
            Err(_) => {
                self.stats.rx_errors = self.stats.rx_errors.wrapping_add(1);
                return None;
            }
        }

        let mut byte = [0u8; 1];
        match self.uart.read(&mut byte) {
            Ok(1) => {
                self.stats.rx_bytes = self.stats.rx_bytes.wrapping_add(1);
                Some(byte[0])
            }
            Ok(_) => None,
            Err(_) => {
                self.stats.rx_errors = self.stats.rx_errors.wrapping_add(1);
                None
            }
        }
    }

    fn write_byte(&mut self, byte: u8) {
        let result = self.uart.write_all(&[byte]).and_then(|()| self.uart.flush());
        match result {
            Ok(()) => self.stats.tx_bytes = self.stats.tx_bytes.wrapping_add(1),
            Err(_) => self.stats.tx_errors = self.stats.tx_errors.wrapping_add(1),
        }
    }
}
