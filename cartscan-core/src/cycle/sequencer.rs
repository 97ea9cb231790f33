//! Per-cartridge sequence

use embedded_hal::delay::DelayNs;

use crate::config::{MachineConfig, SequenceDelays, StepLimits};
use crate::scan::ScanEngine;
use crate::state::{Fault, Lane, RunContext};
use crate::traits::{Board, Input, MachineIo, Output, ScanLink, TextDisplay};

use super::step::{await_step, StepKind};

/// How a cycle ended without a fault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CycleEnd {
    /// A cartridge was scanned and its lane stored
    Scanned(Lane),
    /// No cartridge left in the stack
    StackEmpty,
}

/// Cycle sequencer
#[derive(Debug, Clone, Copy)]
pub struct CycleSequencer {
    limits: StepLimits,
    delays: SequenceDelays,
    engine: ScanEngine,
}

impl CycleSequencer {
    pub fn new(config: &MachineConfig) -> Self {
        Self {
            limits: config.limits,
            delays: config.delays,
            engine: ScanEngine::new(config.scan),
        }
    }

    /// Cycle until the stack runs out
    ///
    /// Returns the number of cartridges scanned in this batch. Any fault
    /// aborts the batch with the mechanism left where it stopped; the
    /// caller de-energizes it.
    pub fn run_batch<IO, L, DS, D>(
        &self,
        board: &mut Board<IO, L, DS, D>,
        ctx: &mut RunContext,
    ) -> Result<u32, Fault>
    where
        IO: MachineIo,
        L: ScanLink,
        DS: TextDisplay,
        D: DelayNs,
    {
        ctx.begin_batch();
        let mut scanned = 0;

        loop {
            match self.run_cycle(board, ctx)? {
                CycleEnd::Scanned(_) => scanned += 1,
                CycleEnd::StackEmpty => {
                    info!("batch done, {} cartridges scanned", scanned);
                    return Ok(scanned);
                }
            }
        }
    }

    /// Run one cycle
    ///
    /// Ejects the cartridge scanned last time (if any) into its lane,
    /// then loads and scans the next one from the stack.
    pub fn run_cycle<IO, L, DS, D>(
        &self,
        board: &mut Board<IO, L, DS, D>,
        ctx: &mut RunContext,
    ) -> Result<CycleEnd, Fault>
    where
        IO: MachineIo,
        L: ScanLink,
        DS: TextDisplay,
        D: DelayNs,
    {
        if let Some(lane) = ctx.previous_lane() {
            self.set_diverter(board, lane)?;
            self.retract(board)?;
        }

        if !board.io.read_input(Input::StackPresent) {
            info!("stack empty");
            return Ok(CycleEnd::StackEmpty);
        }

        self.load(board)?;

        let ordinal = ctx.counters.record_attempt();
        let lane = self.engine.scan(board, ctx)?;
        ctx.record_outcome(lane);

        let verdict = match lane {
            Lane::Pass => "PASS",
            Lane::Reject => "REJECT",
        };
        let counters = ctx.counters.summary();
        board.display.show(verdict, counters.as_str());
        info!(
            "cartridge {} -> {} (total {}, passed {})",
            ordinal,
            lane,
            ctx.counters.count,
            ctx.counters.pass_count
        );

        board.delay.delay_ms(self.delays.cycle_gap_ms);
        Ok(CycleEnd::Scanned(lane))
    }

    /// Move the diverter plate to a lane
    pub fn set_diverter<IO, L, DS, D>(
        &self,
        board: &mut Board<IO, L, DS, D>,
        lane: Lane,
    ) -> Result<(), Fault>
    where
        IO: MachineIo,
        D: DelayNs,
    {
        debug!("diverter -> {}", lane);
        board.io.write_output(Output::Diverter, lane.diverter_on());
        self.step(board, StepKind::Diverter(lane))
    }

    /// Raise the lift and bring the transport back to the stack
    ///
    /// The cartridge at the scan position drops into the selected lane;
    /// the diverter returns to the pass lane afterwards.
    pub fn retract<IO, L, DS, D>(&self, board: &mut Board<IO, L, DS, D>) -> Result<(), Fault>
    where
        IO: MachineIo,
        D: DelayNs,
    {
        board.io.write_output(Output::LiftDown, false);
        board.io.write_output(Output::Transport, false);
        self.step(board, StepKind::TransportBack)?;
        self.step(board, StepKind::LiftUp)?;

        board.io.write_output(Output::Diverter, false);
        board.delay.delay_ms(self.delays.retract_settle_ms);
        Ok(())
    }

    /// Release one cartridge from the stack and carry it to the scanner
    pub fn load<IO, L, DS, D>(&self, board: &mut Board<IO, L, DS, D>) -> Result<(), Fault>
    where
        IO: MachineIo,
        D: DelayNs,
    {
        board.io.write_output(Output::Stopper, true);
        board.io.write_output(Output::Transport, true);
        board.delay.delay_ms(self.delays.load_settle_ms);
        self.step(board, StepKind::TransportForward)?;

        board.io.write_output(Output::Stopper, false);
        board.delay.delay_ms(self.delays.stopper_settle_ms);
        Ok(())
    }

    fn step<IO, L, DS, D>(&self, board: &mut Board<IO, L, DS, D>, kind: StepKind) -> Result<(), Fault>
    where
        IO: MachineIo,
        D: DelayNs,
    {
        debug!("{} (ceiling {} ticks)", kind, kind.ceiling(&self.limits));
        await_step(&mut board.io, &mut board.delay, kind, &self.limits).map(|_| ())
    }
}
