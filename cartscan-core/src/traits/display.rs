//! Operator display

/// Visible columns per line on the jig's character LCD
pub const DISPLAY_COLS: usize = 16;

/// Two-line text display
///
/// Fire-and-forget: the core never waits on or checks the display.
/// Implementations clear the screen, then write both lines, truncating
/// anything beyond the visible width.
pub trait TextDisplay {
    fn show(&mut self, line1: &str, line2: &str);
}
