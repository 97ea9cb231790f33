//! Sensor-confirmed motions

use embedded_hal::delay::DelayNs;

use crate::config::StepLimits;
use crate::state::{Fault, Lane};
use crate::traits::{Input, MachineIo};

/// Motions that wait for a confirming sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StepKind {
    /// Diverter plate to a lane
    Diverter(Lane),
    /// Transport back to the stack
    TransportBack,
    /// Lift plate up
    LiftUp,
    /// Transport forward to the scan position
    TransportForward,
}

impl StepKind {
    /// Tick ceiling for this motion
    pub fn ceiling(&self, limits: &StepLimits) -> u32 {
        match self {
            StepKind::Diverter(_) => limits.diverter_ticks,
            StepKind::TransportBack => limits.backward_ticks,
            StepKind::LiftUp => limits.lift_ticks,
            StepKind::TransportForward => limits.forward_ticks,
        }
    }

    /// Sensor and logical level that confirm the motion
    pub fn confirmation(&self) -> (Input, bool) {
        match self {
            StepKind::Diverter(lane) => (Input::RejectPlate, lane.diverter_on()),
            StepKind::TransportBack => (Input::CartridgeBackward, true),
            StepKind::LiftUp => (Input::LiftUp, true),
            StepKind::TransportForward => (Input::CartridgeForward, true),
        }
    }

    /// Fault raised when the ceiling is reached
    pub fn fault(&self) -> Fault {
        match self {
            StepKind::Diverter(lane) => Fault::DiverterStuck(*lane),
            StepKind::TransportBack => Fault::TransportBackStuck,
            StepKind::LiftUp => Fault::LiftUpStuck,
            StepKind::TransportForward => Fault::TransportForwardStuck,
        }
    }
}

/// Tick counter for one motion
///
/// Real elapsed time is `ceiling × tick` plus the time spent polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutBudget {
    elapsed: u32,
    ceiling: u32,
}

impl TimeoutBudget {
    pub fn new(ceiling: u32) -> Self {
        Self {
            elapsed: 0,
            ceiling,
        }
    }

    /// Count one tick
    pub fn tick(&mut self) {
        self.elapsed = self.elapsed.saturating_add(1);
    }

    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }

    pub fn is_exhausted(&self) -> bool {
        self.elapsed >= self.ceiling
    }
}

/// Poll the confirming sensor until it reads the expected level
///
/// The actuator must already be commanded. Returns the ticks used, or the
/// step's fault once the ceiling is reached. A failed read never confirms.
pub fn await_step<IO: MachineIo, D: DelayNs>(
    io: &mut IO,
    delay: &mut D,
    kind: StepKind,
    limits: &StepLimits,
) -> Result<u32, Fault> {
    let (input, level) = kind.confirmation();
    let mut budget = TimeoutBudget::new(kind.ceiling(limits));

    loop {
        if io.sample_input(input) == Some(level) {
            debug!("{} confirmed after {} ticks", kind, budget.elapsed());
            return Ok(budget.elapsed());
        }
        if budget.is_exhausted() {
            error!("{} stuck after {} ticks", kind, budget.elapsed());
            return Err(kind.fault());
        }
        delay.delay_ms(limits.tick_ms);
        budget.tick();
    }
}
