//! Top-level controller
//!
//! The controller owns the board, the run state and the run context.
//! Each call to [`Controller::step`] runs the handler for the current
//! state until it produces an event, then applies the transition:
//!
//! - Setup: poll the link for the start-scanning byte
//! - AwaitStart: wait for a start press with the stack loaded
//! - Cycling: run the cycle sequencer until the stack is empty
//! - StackEmptyWait: wait for the stack to be refilled
//! - FatalError: nothing; the caller acknowledges and resets

use embedded_hal::delay::DelayNs;

use cartscan_protocol::Inbound;

use crate::config::MachineConfig;
use crate::cycle::{reset_mechanism, CycleSequencer};
use crate::state::{Event, Fault, RunContext, RunState};
use crate::traits::{Board, Input, MachineIo, Output, ScanLink, TextDisplay};

const SETUP: (&str, &str) = ("Setup Batch", "");
const PRESS_START: (&str, &str) = ("Press Start", "");
const STACK_EMPTY: (&str, &str) = ("Stack Empty", "Fill Stack &");

/// Controller coordinating the state machine and the cycle sequencer
pub struct Controller<IO, L, DS, D> {
    board: Board<IO, L, DS, D>,
    config: MachineConfig,
    sequencer: CycleSequencer,
    state: RunState,
    ctx: RunContext,
}

impl<IO, L, DS, D> Controller<IO, L, DS, D>
where
    IO: MachineIo,
    L: ScanLink,
    DS: TextDisplay,
    D: DelayNs,
{
    pub fn new(config: MachineConfig, board: Board<IO, L, DS, D>) -> Self {
        Self {
            sequencer: CycleSequencer::new(&config),
            board,
            config,
            state: RunState::Setup,
            ctx: RunContext::new(),
        }
    }

    /// Get current state
    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn context(&self) -> &RunContext {
        &self.ctx
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    pub fn board(&self) -> &Board<IO, L, DS, D> {
        &self.board
    }

    /// Power-on sequence: safe outputs, banner, then the setup screen
    pub fn boot(&mut self) {
        reset_mechanism(&mut self.board.io);

        let banner = &self.config.banner;
        self.board.display.show(&banner.line1, &banner.line2);
        info!("boot, banner for {} ms", self.config.delays.welcome_ms);
        self.board.delay.delay_ms(self.config.delays.welcome_ms);

        self.state = RunState::Setup;
        self.show(SETUP);
    }

    /// Run the handler for the current state and apply its event
    ///
    /// Returns the new state. In `FatalError` this does nothing.
    pub fn step(&mut self) -> RunState {
        let event = match self.state {
            RunState::Setup => self.await_start_scanning(),
            RunState::AwaitStart => self.await_start_press(),
            RunState::Cycling => match self.sequencer.run_batch(&mut self.board, &mut self.ctx) {
                Ok(_) => Event::StackEmpty,
                Err(fault) => Event::Fault(fault),
            },
            RunState::StackEmptyWait => self.await_stack(),
            RunState::FatalError(_) => return self.state,
        };

        self.transition(event);
        self.state
    }

    /// Boot and run until a fault, then wait for the operator
    ///
    /// `observe` sees every state the controller enters along with the
    /// board, before the fault is acknowledged. Returns the fault once
    /// acknowledged; the caller resets the device.
    pub fn run<F>(&mut self, mut observe: F) -> Fault
    where
        F: FnMut(RunState, &Board<IO, L, DS, D>),
    {
        self.boot();
        loop {
            let state = self.step();
            observe(state, &self.board);
            if let RunState::FatalError(fault) = state {
                self.acknowledge(fault);
                return fault;
            }
        }
    }

    /// Blink the tower lamp and buzzer until start is pressed and released
    ///
    /// The button is polled throughout each half period so a short press
    /// is not missed.
    pub fn acknowledge(&mut self, fault: Fault) {
        let half_period = self.config.delays.fault_blink_ms;
        let poll = self.config.delays.button_poll_ms;
        let mut lamp = true;

        'blink: loop {
            lamp = !lamp;
            self.board.io.write_output(Output::TowerLamp, lamp);
            self.board.io.write_output(Output::Buzzer, !lamp);

            let mut waited = 0;
            while waited < half_period {
                if self.board.io.read_input(Input::StartButton) {
                    break 'blink;
                }
                self.board.delay.delay_ms(poll);
                waited += poll;
            }
        }
        self.await_release();

        self.board.io.write_output(Output::Buzzer, false);
        self.board.io.write_output(Output::TowerLamp, false);
        info!("fault {} acknowledged", fault);
    }

    fn await_start_scanning(&mut self) -> Event {
        loop {
            while let Some(byte) = self.board.link.try_read_byte() {
                match Inbound::from_byte(byte) {
                    Some(Inbound::StartScanning) => return Event::StartScanning,
                    _ => debug!("ignoring byte {=u8:#x} during setup", byte),
                }
            }
            self.board.delay.delay_ms(self.config.delays.setup_poll_ms);
        }
    }

    fn await_start_press(&mut self) -> Event {
        loop {
            if !self.board.io.read_input(Input::StackPresent) {
                return Event::StackEmpty;
            }
            if self.board.io.read_input(Input::StartButton) {
                self.await_release();
                return Event::StartPressed;
            }
            self.board.delay.delay_ms(self.config.delays.button_poll_ms);
        }
    }

    fn await_stack(&mut self) -> Event {
        loop {
            if self.board.io.read_input(Input::StackPresent) {
                return Event::StackPresent;
            }
            self.board.delay.delay_ms(self.config.delays.stack_poll_ms);
        }
    }

    fn await_release(&mut self) {
        while self.board.io.read_input(Input::StartButton) {
            self.board.delay.delay_ms(self.config.delays.button_poll_ms);
        }
    }

    fn transition(&mut self, event: Event) {
        let next = self.state.transition(event);
        if next == self.state {
            return;
        }
        info!("{} --{}--> {}", self.state, event, next);
        self.state = next;
        self.on_enter(next);
    }

    fn on_enter(&mut self, state: RunState) {
        match state {
            RunState::Setup => self.show(SETUP),
            RunState::AwaitStart => self.show(PRESS_START),
            RunState::Cycling => {}
            RunState::StackEmptyWait => {
                self.show(STACK_EMPTY);
                self.board.delay.delay_ms(self.config.delays.stack_empty_notice_ms);
            }
            RunState::FatalError(fault) => {
                reset_mechanism(&mut self.board.io);
                if fault.is_mechanical() {
                    error!("mechanism stuck: {}", fault.message());
                } else {
                    error!("scan failed: {}", fault.message());
                }
                self.board.display.show(fault.message(), fault.instruction());
            }
        }
    }

    fn show(&mut self, screen: (&str, &str)) {
        self.board.display.show(screen.0, screen.1);
    }
}
