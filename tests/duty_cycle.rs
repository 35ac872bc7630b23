//! End-to-end duty cycle through the public API
//!
//! All three hardware facilities write into one shared log so the tests can
//! check the order of operations across facilities, the way the firmware
//! would drive the registers.

use std::cell::RefCell;
use std::rc::Rc;

use pwm_schedule::calendar::{CalendarCounter, CalendarTime, PeriodicTimer};
use pwm_schedule::config::{CONFIG, DutyCycleConfig};
use pwm_schedule::expiry::ExpiryQueue;
use pwm_schedule::power::{LowPowerMode, PowerModeControl};
use pwm_schedule::pwm::{PwmOutput, PwmSettings, WaveformGenerator};
use pwm_schedule::scheduler::{DutyScheduler, DutyState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Event {
    Hold,
    Load(CalendarTime),
    Resume,
    PwmLoad(PwmSettings),
    PwmStart,
    PwmStop,
    Power(LowPowerMode, LowPowerMode),
}

type Log = Rc<RefCell<Vec<Event>>>;

struct Rtc(Log);
struct Timer(Log);
struct Scb(Log);

impl CalendarCounter for Rtc {
    fn hold(&mut self) {
        self.0.borrow_mut().push(Event::Hold);
    }

    fn load(&mut self, time: CalendarTime) {
        self.0.borrow_mut().push(Event::Load(time));
    }

    fn resume(&mut self) {
        self.0.borrow_mut().push(Event::Resume);
    }
}

impl WaveformGenerator for Timer {
    const MAX_PERIOD: u32 = 1 << 16;

    fn load(&mut self, settings: PwmSettings) {
        self.0.borrow_mut().push(Event::PwmLoad(settings));
    }

    fn start(&mut self) {
        self.0.borrow_mut().push(Event::PwmStart);
    }

    fn stop(&mut self) {
        self.0.borrow_mut().push(Event::PwmStop);
    }
}

impl PowerModeControl for Scb {
    fn switch(&mut self, from: LowPowerMode, to: LowPowerMode) {
        self.0.borrow_mut().push(Event::Power(from, to));
    }
}

fn boot(config: &DutyCycleConfig) -> (DutyScheduler<Rtc, Timer, Scb>, Log) {
    let log: Log = Rc::default();
    let scheduler = DutyScheduler::new(
        config,
        PeriodicTimer::new(Rtc(log.clone())),
        PwmOutput::new(Timer(log.clone()), config.clock_hz()),
        Scb(log.clone()),
    )
    .expect("valid configuration");
    (scheduler, log)
}

fn hms(hour: u8, minute: u8, second: u8) -> CalendarTime {
    CalendarTime {
        hour,
        minute,
        second,
    }
}

#[test]
fn boot_sequence_configures_then_arms_then_enables() {
    let (mut scheduler, log) = boot(&CONFIG);
    scheduler.start();

    assert_eq!(
        *log.borrow(),
        vec![
            Event::PwmLoad(CONFIG.pwm()),
            Event::Hold,
            Event::Load(hms(23, 59, 58)),
            Event::Resume,
            Event::PwmStart,
            Event::Power(LowPowerMode::Deep, LowPowerMode::Light),
        ]
    );
    assert_eq!(scheduler.state(), DutyState::Active);
}

#[test]
fn expiry_rearms_before_switching_output() {
    let (mut scheduler, log) = boot(&CONFIG);
    scheduler.start();
    log.borrow_mut().clear();

    scheduler.on_timer_expired();
    assert_eq!(
        *log.borrow(),
        vec![
            Event::Hold,
            Event::Load(hms(23, 59, 55)),
            Event::Resume,
            Event::PwmStop,
            Event::Power(LowPowerMode::Light, LowPowerMode::Deep),
        ]
    );
    log.borrow_mut().clear();

    scheduler.on_timer_expired();
    assert_eq!(
        *log.borrow(),
        vec![
            Event::Hold,
            Event::Load(hms(23, 59, 58)),
            Event::Resume,
            Event::PwmStart,
            Event::Power(LowPowerMode::Deep, LowPowerMode::Light),
        ]
    );
}

#[test]
fn queued_notifications_each_cause_one_transition() {
    let (mut scheduler, log) = boot(&CONFIG);
    scheduler.start();
    log.borrow_mut().clear();

    let queue = ExpiryQueue::new();
    for _ in 0..4 {
        queue.notify();
    }
    assert_eq!(scheduler.dispatch(&queue), 4);
    assert_eq!(scheduler.state(), DutyState::Active);
    assert_eq!(scheduler.cycles(), 2);

    let events = log.borrow();
    let starts = events.iter().filter(|e| **e == Event::PwmStart).count();
    let stops = events.iter().filter(|e| **e == Event::PwmStop).count();
    let arms = events.iter().filter(|e| **e == Event::Hold).count();
    assert_eq!((starts, stops, arms), (2, 2, 4));
}

#[test]
fn one_megahertz_clock_scenario() {
    let config = DutyCycleConfig::new(1_000_000, 2000, 10, (0, 0, 2), (0, 0, 5)).unwrap();
    let (scheduler, log) = boot(&config);

    let settings = scheduler.pwm().settings().unwrap();
    assert_eq!((settings.period(), settings.active_width()), (500, 50));
    assert_eq!(*log.borrow(), vec![Event::PwmLoad(settings)]);
}

#[test]
fn zero_duty_still_cycles() {
    let config = DutyCycleConfig::new(1_000_000, 2000, 0, (0, 0, 2), (0, 0, 5)).unwrap();
    let (mut scheduler, _log) = boot(&config);
    scheduler.start();

    assert_eq!(scheduler.pwm().settings().unwrap().active_width(), 0);
    assert!(scheduler.pwm().is_enabled());
    assert_eq!(scheduler.on_timer_expired(), DutyState::Sleeping);
}
