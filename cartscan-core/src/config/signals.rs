//! Electrical polarity of the named signals

use crate::traits::{Input, Output};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which pin level means "asserted"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Polarity {
    #[default]
    ActiveHigh,
    ActiveLow,
}

impl Polarity {
    /// Convert a logical value to a pin level, or back
    pub fn apply(self, value: bool) -> bool {
        match self {
            Polarity::ActiveHigh => value,
            Polarity::ActiveLow => !value,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "active_high" | "high" => Some(Polarity::ActiveHigh),
            "active_low" | "low" => Some(Polarity::ActiveLow),
            _ => None,
        }
    }
}

/// Polarity table for every input and output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SignalPolarity {
    inputs: [Polarity; Input::COUNT],
    outputs: [Polarity; Output::COUNT],
}

impl Default for SignalPolarity {
    /// Production board: everything active-high except the start button,
    /// which pulls its pin low
    fn default() -> Self {
        let mut signals = Self {
            inputs: [Polarity::ActiveHigh; Input::COUNT],
            outputs: [Polarity::ActiveHigh; Output::COUNT],
        };
        signals.set_input(Input::StartButton, Polarity::ActiveLow);
        signals
    }
}

impl SignalPolarity {
    pub fn input(&self, input: Input) -> Polarity {
        self.inputs[input.index()]
    }

    pub fn output(&self, output: Output) -> Polarity {
        self.outputs[output.index()]
    }

    pub fn set_input(&mut self, input: Input, polarity: Polarity) {
        self.inputs[input.index()] = polarity;
    }

    pub fn set_output(&mut self, output: Output, polarity: Polarity) {
        self.outputs[output.index()] = polarity;
    }

    /// Logical value of an input given its pin level
    pub fn input_asserted(&self, input: Input, pin_high: bool) -> bool {
        self.input(input).apply(pin_high)
    }

    /// Pin level that drives an output to the requested logical value
    pub fn output_level(&self, output: Output, on: bool) -> bool {
        self.output(output).apply(on)
    }
}
