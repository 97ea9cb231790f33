//! Named machine signals
//!
//! The core never sees pin numbers or electrical levels. Board crates map
//! each signal to a pin and apply its polarity, so `true` always means
//! "asserted" for inputs and "energized" for outputs.

/// Digital inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Input {
    /// Cartridges present in the feed stack
    StackPresent,
    /// Transport plate reached the scan position
    CartridgeForward,
    /// Transport plate back at the stack
    CartridgeBackward,
    /// Lift plate up
    LiftUp,
    /// Diverter plate in the reject position (released = pass position)
    RejectPlate,
    /// Operator start button
    StartButton,
}

impl Input {
    pub const COUNT: usize = 6;

    pub const ALL: [Input; Self::COUNT] = [
        Input::StackPresent,
        Input::CartridgeForward,
        Input::CartridgeBackward,
        Input::LiftUp,
        Input::RejectPlate,
        Input::StartButton,
    ];

    /// Dense index for per-signal tables
    pub fn index(self) -> usize {
        self as usize
    }

    /// Key used for this signal in `machine.toml`
    pub fn name(self) -> &'static str {
        match self {
            Input::StackPresent => "stack_present",
            Input::CartridgeForward => "cartridge_forward",
            Input::CartridgeBackward => "cartridge_backward",
            Input::LiftUp => "lift_up",
            Input::RejectPlate => "reject_plate",
            Input::StartButton => "start_button",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|input| input.name() == name)
    }
}

/// Digital outputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Output {
    /// Stack stopper solenoid (energized = down, releases one cartridge)
    Stopper,
    /// Transport direction (energized = forward to the scanner)
    Transport,
    /// Lift plate valve (energized = plate down)
    LiftDown,
    /// Diverter valve (energized = reject lane)
    Diverter,
    /// Fault buzzer
    Buzzer,
    /// Tower lamp
    TowerLamp,
}

impl Output {
    pub const COUNT: usize = 6;

    pub const ALL: [Output; Self::COUNT] = [
        Output::Stopper,
        Output::Transport,
        Output::LiftDown,
        Output::Diverter,
        Output::Buzzer,
        Output::TowerLamp,
    ];

    /// Dense index for per-signal tables
    pub fn index(self) -> usize {
        self as usize
    }

    /// Key used for this signal in `machine.toml`
    pub fn name(self) -> &'static str {
        match self {
            Output::Stopper => "stopper",
            Output::Transport => "transport",
            Output::LiftDown => "lift_down",
            Output::Diverter => "diverter",
            Output::Buzzer => "buzzer",
            Output::TowerLamp => "tower_lamp",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|output| output.name() == name)
    }
}

/// Access to the machine's named signals
///
/// Writes cannot fail: board crates own their pins and count electrical
/// errors themselves. A read that fails is reported by [`sample_input`]
/// as `None`; [`read_input`] folds it into "not asserted".
///
/// [`sample_input`]: MachineIo::sample_input
/// [`read_input`]: MachineIo::read_input
pub trait MachineIo {
    /// Read an input, `true` when asserted
    fn read_input(&mut self, input: Input) -> bool;

    /// Read an input, `None` when the pin could not be read
    ///
    /// Step confirmation goes through this, so a dead sensor can never
    /// confirm a motion that waits for "not asserted".
    fn sample_input(&mut self, input: Input) -> Option<bool> {
        Some(self.read_input(input))
    }

    /// Drive an output, `true` to energize
    fn write_output(&mut self, output: Output, on: bool);
}
