//! Hardware abstraction traits
//!
//! These traits define the interface between the application logic
//! and hardware-specific implementations.

pub mod display;
pub mod io;
pub mod link;

pub use display::{TextDisplay, DISPLAY_COLS};
pub use io::{Input, MachineIo, Output};
pub use link::ScanLink;

/// Everything the control core touches on a board
///
/// The delay is any `embedded_hal::delay::DelayNs`; all waiting in the
/// core is done through it.
pub struct Board<IO, LINK, DISP, DELAY> {
    /// Named digital inputs and outputs
    pub io: IO,
    /// Serial link to the scanning peripheral
    pub link: LINK,
    /// Two-line operator display
    pub display: DISP,
    /// Blocking delay
    pub delay: DELAY,
}

impl<IO, LINK, DISP, DELAY> Board<IO, LINK, DISP, DELAY> {
    pub fn new(io: IO, link: LINK, display: DISP, delay: DELAY) -> Self {
        Self {
            io,
            link,
            display,
            delay,
        }
    }
}
