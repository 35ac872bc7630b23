//! Mock hardware facilities for host tests
//!
//! Each mock records what the library asked of it so tests can check both
//! the resulting hardware state and the order of register-level operations.

extern crate std;

use std::vec::Vec;

use crate::calendar::{CalendarCounter, CalendarTime};
use crate::power::{LowPowerMode, PowerModeControl};
use crate::pwm::{PwmSettings, WaveformGenerator};

/// Operation performed on a [`MockCalendar`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterOp {
    Hold,
    Load(CalendarTime),
    Resume,
}

/// Calendar counter that records every operation
#[derive(Debug)]
pub struct MockCalendar {
    pub ops: Vec<CounterOp>,
    pub time: Option<CalendarTime>,
    pub running: bool,
}

impl MockCalendar {
    pub fn new() -> Self {
        Self {
            ops: Vec::new(),
            time: None,
            running: true,
        }
    }
}

impl Default for MockCalendar {
    fn default() -> Self {
        Self::new()
    }
}

impl CalendarCounter for MockCalendar {
    fn hold(&mut self) {
        self.ops.push(CounterOp::Hold);
        self.running = false;
    }

    fn load(&mut self, time: CalendarTime) {
        assert!(!self.running, "calendar loaded while counting");
        self.ops.push(CounterOp::Load(time));
        self.time = Some(time);
    }

    fn resume(&mut self) {
        self.ops.push(CounterOp::Resume);
        self.running = true;
    }
}

/// Waveform generator tracking its comparator values and run state
#[derive(Debug, Default)]
pub struct MockGenerator {
    pub loaded: Option<PwmSettings>,
    pub running: bool,
    pub starts: u32,
    pub stops: u32,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WaveformGenerator for MockGenerator {
    const MAX_PERIOD: u32 = 1 << 16;

    fn load(&mut self, settings: PwmSettings) {
        self.loaded = Some(settings);
    }

    fn start(&mut self) {
        self.running = true;
        self.starts += 1;
    }

    fn stop(&mut self) {
        self.running = false;
        self.stops += 1;
    }
}

/// Power controller remembering the requested mode and every switch
#[derive(Debug, Default)]
pub struct MockPower {
    pub mode: Option<LowPowerMode>,
    pub switches: Vec<(LowPowerMode, LowPowerMode)>,
}

impl MockPower {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PowerModeControl for MockPower {
    fn switch(&mut self, from: LowPowerMode, to: LowPowerMode) {
        self.switches.push((from, to));
        self.mode = Some(to);
    }
}
