//! GPIO machine I/O
//!
//! Binds each named signal to one embedded-hal pin and applies the
//! configured polarity, so the core only ever sees logical levels.

use embedded_hal::digital::{InputPin, OutputPin};

use cartscan_core::config::SignalPolarity;
use cartscan_core::traits::{Input, MachineIo, Output};

/// All jig signals on GPIO pins
///
/// Pins are indexed by [`Input::index`] and [`Output::index`]. A pin
/// error is counted and sampled as `None`, so it can never confirm a
/// motion; plain reads treat it as "not asserted".
pub struct PinBank<I, O> {
    inputs: [I; Input::COUNT],
    outputs: [O; Output::COUNT],
    polarity: SignalPolarity,
    /// Last logical value written to each output
    state: [bool; Output::COUNT],
    errors: u32,
}

impl<I, O> PinBank<I, O>
where
    I: InputPin,
    O: OutputPin,
{
    /// Take ownership of the pins and de-energize every output
    pub fn new(
        inputs: [I; Input::COUNT],
        outputs: [O; Output::COUNT],
        polarity: SignalPolarity,
    ) -> Self {
        let mut bank = Self {
            inputs,
            outputs,
            polarity,
            state: [false; Output::COUNT],
            errors: 0,
        };
        for output in Output::ALL {
            bank.write_output(output, false);
        }
        bank
    }

    /// Last logical value written to an output
    pub fn output_state(&self, output: Output) -> bool {
        self.state[output.index()]
    }

    /// Pin errors seen so far
    pub fn errors(&self) -> u32 {
        self.errors
    }
}

impl<I, O> MachineIo for PinBank<I, O>
where
    I: InputPin,
    O: OutputPin,
{
    fn read_input(&mut self, input: Input) -> bool {
        self.sample_input(input).unwrap_or(false)
    }

    fn sample_input(&mut self, input: Input) -> Option<bool> {
        match self.inputs[input.index()].is_high() {
            Ok(high) => Some(self.polarity.input_asserted(input, high)),
            Err(_) => {
                self.errors = self.errors.wrapping_add(1);
                None
            }
        }
    }

    fn write_output(&mut self, output: Output, on: bool) {
        let pin = &mut self.outputs[output.index()];
        let result = if self.polarity.output_level(output, on) {
            pin.set_high()
        } else {
            pin.set_low()
        };
        if result.is_err() {
            self.errors = self.errors.wrapping_add(1);
        }
        self.state[output.index()] = on;
    }
}
