//! HD44780 character LCD driver
//!
//! Driver for 16x2 HD44780-compatible LCDs behind a PCF8574 I2C
//! backpack, driven in 4-bit mode. Each nibble is clocked by writing it
//! twice, once with the enable bit set and once without.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use heapless::Vec;

use cartscan_core::traits::{TextDisplay, DISPLAY_COLS};

/// PCF8574 backpack address (0x27, or 0x3F on the PCF8574A)
pub const DEFAULT_ADDR: u8 = 0x27;

/// Backpack pin mapping: P0 = RS, P1 = RW, P2 = EN, P3 = backlight,
/// P4..P7 = D4..D7
mod pin {
    pub const RS: u8 = 0x01;
    pub const EN: u8 = 0x04;
    pub const BACKLIGHT: u8 = 0x08;
}

/// HD44780 commands
#[allow(dead_code)]
mod cmd {
    pub const CLEAR: u8 = 0x01;
    pub const HOME: u8 = 0x02;
    pub const ENTRY_MODE_INC: u8 = 0x06;
    pub const DISPLAY_ON: u8 = 0x0C;
    pub const FUNCTION_4BIT_2LINE: u8 = 0x28;
    pub const SET_DDRAM: u8 = 0x80;
}

/// DDRAM address of each line
const LINE_ADDR: [u8; 2] = [0x00, 0x40];

/// I2C bytes per LCD byte: two nibbles, each strobed high then low
const BYTES_PER_WRITE: usize = 4;

/// One line: address command plus the visible characters
const LINE_BUF: usize = (DISPLAY_COLS + 1) * BYTES_PER_WRITE;

/// HD44780 LCD driver
pub struct Hd44780<I2C, D> {
    i2c: I2C,
    delay: D,
    addr: u8,
    errors: u32,
}

impl<I2C, D> Hd44780<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    /// Create a new driver; call [`Hd44780::init`] before use
    pub fn new(i2c: I2C, delay: D, addr: u8) -> Self {
        Self {
            i2c,
            delay,
            addr,
            errors: 0,
        }
    }

    /// Initialize the display
    ///
    /// Forces the controller into 4-bit mode from any state, then sets
    /// two lines, display on, cursor off and clears the screen.
    pub fn init(&mut self) -> Result<(), I2C::Error> {
        // Power-on wait
        self.delay.delay_ms(50);

        // Three 8-bit function sets, then switch to 4-bit
        for wait_us in [4500, 4500, 150] {
            self.write_nibble(0x30, false)?;
            self.delay.delay_us(wait_us);
        }
        self.write_nibble(0x20, false)?;
        self.delay.delay_us(150);

        self.command(cmd::FUNCTION_4BIT_2LINE)?;
        self.command(cmd::DISPLAY_ON)?;
        self.clear()?;
        self.command(cmd::ENTRY_MODE_INC)?;
        Ok(())
    }

    /// Clear the screen and return the cursor home
    pub fn clear(&mut self) -> Result<(), I2C::Error> {
        self.command(cmd::CLEAR)?;
        // Clear is the one slow command
        self.delay.delay_ms(2);
        Ok(())
    }

    /// Write a line of text (row 0-1), truncated to the display width
    ///
    /// Characters outside printable ASCII are shown as `?`.
    pub fn write_line(&mut self, row: u8, text: &str) -> Result<(), I2C::Error> {
        let Some(&addr) = LINE_ADDR.get(usize::from(row)) else {
            return Ok(());
        };

        let mut buf: Vec<u8, LINE_BUF> = Vec::new();
        self.encode(&mut buf, cmd::SET_DDRAM | addr, false);
        for ch in text.chars().take(DISPLAY_COLS) {
            let byte = if ch.is_ascii() && !ch.is_ascii_control() {
                ch as u8
            } else {
                b'?'
            };
            self.encode(&mut buf, byte, true);
        }

        self.i2c.write(self.addr, &buf)?;
        self.delay.delay_us(50);
        Ok(())
    }

    /// I2C errors seen by [`TextDisplay::show`]
    pub fn errors(&self) -> u32 {
        self.errors
    }

    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    fn command(&mut self, command: u8) -> Result<(), I2C::Error> {
        let mut buf: Vec<u8, BYTES_PER_WRITE> = Vec::new();
        self.encode(&mut buf, command, false);
        self.i2c.write(self.addr, &buf)?;
        self.delay.delay_us(50);
        Ok(())
    }

    fn write_nibble(&mut self, nibble: u8, data: bool) -> Result<(), I2C::Error> {
        let bits = self.nibble_bits(nibble, data);
        self.i2c.write(self.addr, &[bits | pin::EN, bits])
    }

    /// Append the strobe sequence for one byte
    fn encode<const N: usize>(&self, buf: &mut Vec<u8, N>, byte: u8, data: bool) {
        for nibble in [byte & 0xF0, (byte << 4) & 0xF0] {
            let bits = self.nibble_bits(nibble, data);
            // Capacity is sized for a full line
            let _ = buf.push(bits | pin::EN);
            let _ = buf.push(bits);
        }
    }

    fn nibble_bits(&self, nibble: u8, data: bool) -> u8 {
        let rs = if data { pin::RS } else { 0 };
        // Backlight stays on for the life of the jig
        (nibble & 0xF0) | rs | pin::BACKLIGHT
    }
}

impl<I2C, D> TextDisplay for Hd44780<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    fn show(&mut self, line1: &str, line2: &str) {
        let result = self
            .clear()
            .and_then(|()| self.write_line(0, line1))
            .and_then(|()| self.write_line(1, line2));
        if result.is_err() {
            self.errors = self.errors.wrapping_add(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::i2c::{ErrorType, Operation};

    #[derive(Default)]
    struct MockI2c {
        writes: std::vec::Vec<(u8, std::vec::Vec<u8>)>,
    }

    impl ErrorType for MockI2c {
        type Error = Infallible;
    }

    impl I2c for MockI2c {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            for op in operations {
                if let Operation::Write(bytes) = op {
                    self.writes.push((address, bytes.to_vec()));
                }
            }
            Ok(())
        }
    }

    struct NoDelay;

    impl DelayNs for NoDelay {
        fn delay_ns(&mut self, _ns: u32) {}
    }

    /// LCD-level writes recovered from the I2C stream: (is_data, byte)
    fn decode(writes: &[(u8, std::vec::Vec<u8>)]) -> std::vec::Vec<(bool, u8)> {
        let strobes: std::vec::Vec<u8> = writes
            .iter()
            .flat_map(|(_, bytes)| bytes.iter().copied())
            .filter(|b| b & pin::EN != 0)
            .collect();
        strobes
            .chunks(2)
            .map(|pair| (pair[0] & pin::RS != 0, (pair[0] & 0xF0) | (pair[1] >> 4)))
            .collect()
    }

    fn lcd() -> Hd44780<MockI2c, NoDelay> {
        Hd44780::new(MockI2c::default(), NoDelay, DEFAULT_ADDR)
    }

    #[test]
    fn test_init_sequence() {
        let mut lcd = lcd();
        lcd.init().unwrap();
        let (i2c, _) = lcd.release();

        // Four single-nibble writes come first
        let nibbles: std::vec::Vec<u8> = i2c.writes[..4].iter().map(|(_, b)| b[0] & 0xF0).collect();
        assert_eq!(nibbles, vec![0x30, 0x30, 0x30, 0x20]);

        let commands = decode(&i2c.writes[4..]);
        assert_eq!(
            commands,
            vec![
                (false, cmd::FUNCTION_4BIT_2LINE),
                (false, cmd::DISPLAY_ON),
                (false, cmd::CLEAR),
                (false, cmd::ENTRY_MODE_INC),
            ]
        );
        assert!(i2c.writes.iter().all(|(addr, _)| *addr == DEFAULT_ADDR));
    }

    #[test]
    fn test_show_two_lines() {
        let mut lcd = lcd();
        lcd.show("PASS", "T:1 P:1");
        let (i2c, _) = lcd.release();

        let mut expected = vec![(false, cmd::CLEAR), (false, 0x80)];
        expected.extend(b"PASS".iter().map(|&b| (true, b)));
        expected.push((false, 0xC0));
        expected.extend(b"T:1 P:1".iter().map(|&b| (true, b)));
        assert_eq!(decode(&i2c.writes), expected);
    }

    #[test]
    fn test_long_line_is_truncated() {
        let mut lcd = lcd();
        lcd.write_line(0, "ABCDEFGHIJKLMNOPQRSTUVWXYZ").unwrap();
        let (i2c, _) = lcd.release();

        let data: std::vec::Vec<u8> = decode(&i2c.writes)
            .into_iter()
            .filter(|(is_data, _)| *is_data)
            .map(|(_, b)| b)
            .collect();
        assert_eq!(data, b"ABCDEFGHIJKLMNOP".to_vec());
    }

    #[test]
    fn test_non_ascii_is_replaced() {
        let mut lcd = lcd();
        lcd.write_line(1, "5°C").unwrap();
        let (i2c, _) = lcd.release();

        let data: std::vec::Vec<u8> = decode(&i2c.writes)
            .into_iter()
            .filter(|(is_data, _)| *is_data)
            .map(|(_, b)| b)
            .collect();
        assert_eq!(data, b"5?C".to_vec());
    }

    #[test]
    fn test_backlight_bit_on_every_write() {
        let mut lcd = lcd();
        lcd.show("Reading QR", "Hold steady...");
        let (i2c, _) = lcd.release();
        assert!(i2c
            .writes
            .iter()
            .flat_map(|(_, b)| b.iter())
            .all(|b| b & pin::BACKLIGHT != 0));
    }
}
