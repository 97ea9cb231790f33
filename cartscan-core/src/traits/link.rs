//! Serial link to the scanning peripheral

/// Upper bound on bytes discarded by one [`ScanLink::drain`]
pub const MAX_DRAIN: usize = 64;

/// Byte-oriented link to the scanning peripheral
///
/// The peripheral sits on a point-to-point UART. Receive is a
/// non-blocking poll; transmit blocks until the byte is handed to the
/// hardware.
pub trait ScanLink {
    /// Take one received byte if available
    fn try_read_byte(&mut self) -> Option<u8>;

    /// Send one byte
    fn write_byte(&mut self, byte: u8);

    /// Discard bytes already received, returning how many were dropped
    ///
    /// Bounded so a link that keeps producing noise cannot stall the
    /// caller.
    fn drain(&mut self) -> usize {
        let mut dropped = 0;
        while dropped < MAX_DRAIN && self.try_read_byte().is_some() {
            dropped += 1;
        }
        dropped
    }
}
