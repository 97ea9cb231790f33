//! Virtual-time jig bench
//!
//! One shared simulation drives every trait the controller needs. Time
//! only advances through the delay, so a test runs in microseconds no
//! matter how long the jig would take. Sensors follow their actuators
//! after a fixed travel time, the peripheral answers from a script, and
//! an optional operator presses start when prompted.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use cartscan_core::config::MachineConfig;
use cartscan_core::state::RunState;
use cartscan_core::traits::{Board, Input, MachineIo, Output, ScanLink, TextDisplay};
use cartscan_core::Controller;
use embedded_hal::delay::DelayNs;

/// Simulated time after which a test is considered hung (ms)
pub const DEFAULT_HORIZON_MS: u64 = 10 * 60 * 1000;

/// Actuator travel times (ms)
#[derive(Debug, Clone, Copy)]
pub struct Travel {
    pub forward_ms: u64,
    pub backward_ms: u64,
    pub lift_ms: u64,
    pub diverter_ms: u64,
}

impl Default for Travel {
    fn default() -> Self {
        Self {
            forward_ms: 800,
            backward_ms: 900,
            lift_ms: 300,
            diverter_ms: 200,
        }
    }
}

/// Operator behavior
#[derive(Debug, Clone, Copy)]
pub struct Operator {
    /// Press start whenever "Press Start" appears
    pub start_on_prompt: bool,
    /// Press start whenever a fault is displayed
    pub acknowledge_faults: bool,
    /// Reaction time (ms)
    pub reaction_ms: u64,
    /// How long the button is held (ms)
    pub hold_ms: u64,
}

impl Default for Operator {
    fn default() -> Self {
        Self {
            start_on_prompt: true,
            acknowledge_faults: true,
            reaction_ms: 300,
            hold_ms: 150,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    pub at_ms: u64,
    pub line1: String,
    pub line2: String,
}

pub struct Sim {
    now_ns: u64,
    pub horizon_ms: u64,
    pub travel: Travel,
    pub operator: Operator,

    outputs: [bool; Output::COUNT],
    /// When each output last changed; `None` means settled since power-on
    changed_at: [Option<u64>; Output::COUNT],
    output_log: Vec<(u64, Output, bool)>,

    /// Inputs that never assert
    pub stuck: Vec<Input>,
    /// Cartridges in the feed stack
    pub stack: u32,
    /// Cartridges added each time "Stack Empty" is shown
    pub refills: VecDeque<u32>,
    pub refill_delay_ms: u64,
    pending_refill: Option<(u64, u32)>,
    /// Stack sensor overrides: (from_ms, to_ms, level)
    pub stack_overrides: Vec<(u64, u64, bool)>,
    /// Pull the whole stack the next time the transport reverses
    pub pull_stack_on_retract: bool,

    press_windows: Vec<(u64, u64)>,

    rx: VecDeque<(u64, u8)>,
    /// Peripheral answers, one per scan request; `None` stays silent
    pub answers: VecDeque<Option<u8>>,
    /// Answer used once the script runs out
    pub default_answer: Option<u8>,
    pub answer_delay_ms: u64,
    /// Per-request answer delays, used before `answer_delay_ms`
    pub answer_delays: VecDeque<u64>,
    pub requests: Vec<(u64, u8)>,

    pub screens: Vec<Screen>,
}

impl Sim {
    pub fn new() -> Self {
        Self {
            now_ns: 0,
            horizon_ms: DEFAULT_HORIZON_MS,
            travel: Travel::default(),
            operator: Operator::default(),
            outputs: [false; Output::COUNT],
            changed_at: [None; Output::COUNT],
            output_log: Vec::new(),
            stuck: Vec::new(),
            stack: 0,
            refills: VecDeque::new(),
            refill_delay_ms: 2000,
            pending_refill: None,
            stack_overrides: Vec::new(),
            pull_stack_on_retract: false,
            press_windows: Vec::new(),
            rx: VecDeque::new(),
            answers: VecDeque::new(),
            default_answer: Some(b'A'),
            answer_delay_ms: 200,
            answer_delays: VecDeque::new(),
            requests: Vec::new(),
            screens: Vec::new(),
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ns / 1_000_000
    }

    fn advance_ns(&mut self, ns: u64) {
        self.now_ns += ns;
        assert!(
            self.now_ms() <= self.horizon_ms,
            "simulation passed {} ms without finishing",
            self.horizon_ms
        );
        if let Some((at, count)) = self.pending_refill {
            if self.now_ms() >= at {
                self.stack += count;
                self.pending_refill = None;
            }
        }
    }

    /// Queue a byte from the peripheral
    pub fn send_from_peripheral(&mut self, at_ms: u64, byte: u8) {
        self.rx.push_back((at_ms, byte));
        self.rx.make_contiguous().sort_by_key(|(at, _)| *at);
    }

    /// Hold the start button down for a window
    pub fn press_start(&mut self, at_ms: u64, hold_ms: u64) {
        self.press_windows.push((at_ms, at_ms + hold_ms));
    }

    pub fn output(&self, output: Output) -> bool {
        self.outputs[output.index()]
    }

    /// Every write that changed an output
    pub fn output_log(&self) -> &[(u64, Output, bool)] {
        &self.output_log
    }

    /// Number of times an output switched on
    pub fn rising_edges(&self, output: Output) -> usize {
        self.output_log
            .iter()
            .filter(|(_, o, on)| *o == output && *on)
            .count()
    }

    /// Scan request bytes in order
    pub fn request_bytes(&self) -> Vec<u8> {
        self.requests.iter().map(|(_, b)| *b).collect()
    }

    pub fn screens_with(&self, line1: &str) -> usize {
        self.screens.iter().filter(|s| s.line1 == line1).count()
    }

    pub fn last_screen(&self) -> Option<&Screen> {
        self.screens.last()
    }

    fn settled(&self, output: Output, travel_ms: u64) -> bool {
        match self.changed_at[output.index()] {
            None => true,
            Some(at) => self.now_ms() >= at + travel_ms,
        }
    }

    fn sensor(&self, input: Input) -> bool {
        if self.stuck.contains(&input) {
            return match input {
                // A stuck diverter plate never leaves where it was
                Input::RejectPlate => !self.output(Output::Diverter),
                _ => false,
            };
        }

        let travel = self.travel;
        match input {
            Input::StackPresent => {
                let now = self.now_ms();
                for &(from, to, level) in &self.stack_overrides {
                    if now >= from && now < to {
                        return level;
                    }
                }
                self.stack > 0
            }
            Input::CartridgeForward => {
                self.output(Output::Transport) && self.settled(Output::Transport, travel.forward_ms)
            }
            Input::CartridgeBackward => {
                !self.output(Output::Transport)
                    && self.settled(Output::Transport, travel.backward_ms)
            }
            Input::LiftUp => {
                !self.output(Output::LiftDown) && self.settled(Output::LiftDown, travel.lift_ms)
            }
            Input::RejectPlate => {
                let commanded = self.output(Output::Diverter);
                if self.settled(Output::Diverter, travel.diverter_ms) {
                    commanded
                } else {
                    !commanded
                }
            }
            Input::StartButton => {
                let now = self.now_ms();
                self.press_windows
                    .iter()
                    .any(|&(from, to)| now >= from && now < to)
            }
        }
    }

    fn set_output(&mut self, output: Output, on: bool) {
        let i = output.index();
        if self.outputs[i] == on {
            return;
        }
        let now = self.now_ms();
        self.outputs[i] = on;
        self.changed_at[i] = Some(now);
        self.output_log.push((now, output, on));

        if output == Output::Transport {
            if on {
                // One cartridge leaves the stack with the transport plate
                self.stack = self.stack.saturating_sub(1);
            } else if self.pull_stack_on_retract {
                self.stack = 0;
                self.pull_stack_on_retract = false;
            }
        }
    }

    fn receive(&mut self) -> Option<u8> {
        match self.rx.front() {
            Some(&(at, byte)) if at <= self.now_ms() => {
                self.rx.pop_front();
                Some(byte)
            }
            _ => None,
        }
    }

    fn transmit(&mut self, byte: u8) {
        let now = self.now_ms();
        self.requests.push((now, byte));
        let answer = match self.answers.pop_front() {
            Some(answer) => answer,
            None => self.default_answer,
        };
        let delay = self.answer_delays.pop_front().unwrap_or(self.answer_delay_ms);
        if let Some(answer) = answer {
            self.send_from_peripheral(now + delay, answer);
        }
    }

    fn display(&mut self, line1: &str, line2: &str) {
        let now = self.now_ms();
        self.screens.push(Screen {
            at_ms: now,
            line1: line1.to_string(),
            line2: line2.to_string(),
        });

        let operator = self.operator;
        let press = (line1 == "Press Start" && operator.start_on_prompt)
            || (line2 == "Press START" && operator.acknowledge_faults);
        if press {
            self.press_start(now + operator.reaction_ms, operator.hold_ms);
        }

        if line1 == "Stack Empty" {
            if let Some(count) = self.refills.pop_front() {
                self.pending_refill = Some((now + self.refill_delay_ms, count));
            }
        }
    }
}

/// Handle to the shared simulation, usable as every board component
#[derive(Clone)]
pub struct Bench(pub Rc<RefCell<Sim>>);

impl Bench {
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(Sim::new())))
    }

    pub fn sim(&self) -> std::cell::RefMut<'_, Sim> {
        self.0.borrow_mut()
    }

    pub fn board(&self) -> Board<Bench, Bench, Bench, Bench> {
        Board::new(self.clone(), self.clone(), self.clone(), self.clone())
    }

    pub fn controller(&self, config: MachineConfig) -> Controller<Bench, Bench, Bench, Bench> {
        Controller::new(config, self.board())
    }
}

impl MachineIo for Bench {
    fn read_input(&mut self, input: Input) -> bool {
        self.0.borrow().sensor(input)
    }

    fn write_output(&mut self, output: Output, on: bool) {
        self.0.borrow_mut().set_output(output, on);
    }
}

impl ScanLink for Bench {
    fn try_read_byte(&mut self) -> Option<u8> {
        self.0.borrow_mut().receive()
    }

    fn write_byte(&mut self, byte: u8) {
        self.0.borrow_mut().transmit(byte);
    }
}

impl TextDisplay for Bench {
    fn show(&mut self, line1: &str, line2: &str) {
        self.0.borrow_mut().display(line1, line2);
    }
}

impl DelayNs for Bench {
    fn delay_ns(&mut self, ns: u32) {
        self.0.borrow_mut().advance_ns(u64::from(ns));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.0.borrow_mut().advance_ns(u64::from(ms) * 1_000_000);
    }
}

pub type Jig = Controller<Bench, Bench, Bench, Bench>;

/// A jig with a loaded stack whose peripheral has already sent the
/// start-scanning byte, booted and sitting in Setup
pub fn loaded_jig(cartridges: u32) -> (Bench, Jig) {
    loaded_jig_with(cartridges, MachineConfig::default())
}

pub fn loaded_jig_with(cartridges: u32, config: MachineConfig) -> (Bench, Jig) {
    let bench = Bench::new();
    {
        let mut sim = bench.sim();
        sim.stack = cartridges;
        sim.send_from_peripheral(0, b'B');
    }
    let mut jig = bench.controller(config);
    jig.boot();
    (bench, jig)
}

/// Step the controller until it reaches a state matching `done`
pub fn step_until(jig: &mut Jig, max_steps: usize, done: impl Fn(RunState) -> bool) -> RunState {
    for _ in 0..max_steps {
        let state = jig.step();
        if done(state) {
            return state;
        }
    }
    panic!("state not reached after {} steps, stuck in {:?}", max_steps, jig.state());
}
