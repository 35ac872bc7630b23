//! Duty cycle scheduler
//!
//! Two-state machine alternating between running the PWM waveform and
//! sleeping. Every transition is triggered by a timer notification:
//!
//! ```text
//!            expiry: arm sleep, PWM off, Light -> Deep
//!   Active ------------------------------------------> Sleeping
//!          <------------------------------------------
//!            expiry: arm PWM-on, PWM on, Deep -> Light
//! ```
//!
//! The scheduler owns its state and both hardware facilities. It is driven
//! through `&mut self` from a single consumer, so a transition always runs to
//! completion before the next one starts.

use crate::calendar::{CalendarCounter, PeriodicTimer, TimerDeadline};
use crate::config::DutyCycleConfig;
use crate::error::ConfigError;
use crate::expiry::ExpiryQueue;
use crate::power::{LowPowerMode, PowerModeControl};
use crate::pwm::{PwmOutput, WaveformGenerator};
use crate::{log_debug, log_info};

/// Phase of the duty cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DutyState {
    /// Waveform running
    Active,
    /// Waveform stopped, core in deep sleep
    Sleeping,
}

impl DutyState {
    /// Wait state to use while in this phase
    pub const fn power_mode(self) -> LowPowerMode {
        match self {
            DutyState::Active => LowPowerMode::Light,
            DutyState::Sleeping => LowPowerMode::Deep,
        }
    }
}

/// Alternates PWM and sleep phases on each timer notification
pub struct DutyScheduler<C, W, P> {
    timer: PeriodicTimer<C>,
    pwm: PwmOutput<W>,
    power: P,
    pwm_on: TimerDeadline,
    sleep: TimerDeadline,
    state: DutyState,
    cycles: u32,
}

impl<C, W, P> DutyScheduler<C, W, P>
where
    C: CalendarCounter,
    W: WaveformGenerator,
    P: PowerModeControl,
{
    /// Creates the scheduler and loads the configured waveform into the
    /// generator.
    ///
    /// The comparator values come from `config` as validated; the clock the
    /// `PwmOutput` was built with does not change them. Nothing is started:
    /// the output stays off and the timer unarmed until
    /// [`start`](Self::start).
    ///
    /// # Errors
    ///
    /// [`ConfigError::PeriodOutOfRange`] if the generator cannot count the
    /// configured period
    pub fn new(
        config: &DutyCycleConfig,
        timer: PeriodicTimer<C>,
        mut pwm: PwmOutput<W>,
        power: P,
    ) -> Result<Self, ConfigError> {
        pwm.load(config.pwm())?;

        Ok(Self {
            timer,
            pwm,
            power,
            pwm_on: config.pwm_on(),
            sleep: config.sleep(),
            state: DutyState::Active,
            cycles: 0,
        })
    }

    /// Boot sequence: arm the first PWM phase, start the waveform and request
    /// light sleep. Call once, before the timer interrupt is unmasked.
    pub fn start(&mut self) {
        self.timer.arm(self.pwm_on);
        self.pwm.enable();
        self.state = DutyState::Active;
        self.power.switch(LowPowerMode::Deep, LowPowerMode::Light);

        log_info!("duty cycle started: {:?}", self.state);
    }

    /// Handles one timer notification.
    ///
    /// # Returns
    ///
    /// The state entered
    pub fn on_timer_expired(&mut self) -> DutyState {
        self.state = match self.state {
            DutyState::Active => {
                self.timer.arm(self.sleep);
                self.pwm.disable();
                self.power.switch(LowPowerMode::Light, LowPowerMode::Deep);
                DutyState::Sleeping
            }
            DutyState::Sleeping => {
                self.timer.arm(self.pwm_on);
                self.pwm.enable();
                self.power.switch(LowPowerMode::Deep, LowPowerMode::Light);
                self.cycles = self.cycles.wrapping_add(1);
                DutyState::Active
            }
        };

        log_debug!("duty state -> {:?} (cycle {})", self.state, self.cycles);

        self.state
    }

    /// Runs [`on_timer_expired`](Self::on_timer_expired) once for every
    /// notification pending in `queue`.
    ///
    /// # Returns
    ///
    /// Number of notifications handled
    pub fn dispatch(&mut self, queue: &ExpiryQueue) -> u32 {
        let pending = queue.take();
        for _ in 0..pending {
            self.on_timer_expired();
        }
        pending
    }

    pub fn state(&self) -> DutyState {
        self.state
    }

    /// Completed Active -> Sleeping -> Active round trips
    pub fn cycles(&self) -> u32 {
        self.cycles
    }

    pub fn pwm(&self) -> &PwmOutput<W> {
        &self.pwm
    }

    pub fn timer(&self) -> &PeriodicTimer<C> {
        &self.timer
    }

    pub fn power(&self) -> &P {
        &self.power
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{CalendarTime, SECONDS_PER_DAY};
    use crate::mock::{MockCalendar, MockGenerator, MockPower};

    type TestScheduler = DutyScheduler<MockCalendar, MockGenerator, MockPower>;

    fn scheduler() -> TestScheduler {
        let config = DutyCycleConfig::new(1_000_000, 2000, 10, (0, 0, 2), (0, 0, 5)).unwrap();
        DutyScheduler::new(
            &config,
            PeriodicTimer::new(MockCalendar::new()),
            PwmOutput::new(MockGenerator::new(), config.clock_hz()),
            MockPower::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_new_configures_but_does_not_start() {
        let scheduler = scheduler();
        let settings = scheduler.pwm().settings().unwrap();
        assert_eq!(settings.period(), 500);
        assert_eq!(settings.active_width(), 50);
        assert!(!scheduler.pwm().is_enabled());
        assert!(scheduler.timer().counter().ops.is_empty());
        assert_eq!(scheduler.power().mode, None);
    }

    #[test]
    fn test_start_arms_pwm_phase() {
        let mut scheduler = scheduler();
        scheduler.start();

        assert_eq!(scheduler.state(), DutyState::Active);
        assert!(scheduler.pwm().is_enabled());
        assert_eq!(
            scheduler.timer().counter().time,
            Some(CalendarTime {
                hour: 23,
                minute: 59,
                second: 58
            })
        );
        assert_eq!(scheduler.power().mode, Some(LowPowerMode::Light));
    }

    #[test]
    fn test_three_expiries_alternate() {
        let mut scheduler = scheduler();
        scheduler.start();

        let mut states = Vec::new();
        let mut enabled = Vec::new();
        for _ in 0..3 {
            states.push(scheduler.on_timer_expired());
            enabled.push(scheduler.pwm().is_enabled());
        }

        assert_eq!(
            states,
            vec![DutyState::Sleeping, DutyState::Active, DutyState::Sleeping]
        );
        assert_eq!(enabled, vec![false, true, false]);
    }

    #[test]
    fn test_alternation_has_period_two() {
        let mut scheduler = scheduler();
        scheduler.start();

        for i in 1..=50u32 {
            let state = scheduler.on_timer_expired();
            let expected = if i % 2 == 1 {
                DutyState::Sleeping
            } else {
                DutyState::Active
            };
            assert_eq!(state, expected);
            assert_eq!(scheduler.pwm().is_enabled(), expected == DutyState::Active);
            assert_eq!(scheduler.power().mode, Some(expected.power_mode()));
        }
        assert_eq!(scheduler.cycles(), 25);
    }

    #[test]
    fn test_deadline_follows_state() {
        let mut scheduler = scheduler();
        scheduler.start();

        scheduler.on_timer_expired();
        let armed = scheduler.timer().counter().time.unwrap();
        assert_eq!(armed.seconds_of_day(), SECONDS_PER_DAY - 5);

        scheduler.on_timer_expired();
        let armed = scheduler.timer().counter().time.unwrap();
        assert_eq!(armed.seconds_of_day(), SECONDS_PER_DAY - 2);
    }

    #[test]
    fn test_power_switch_leaves_previous_mode() {
        let mut scheduler = scheduler();
        scheduler.start();
        scheduler.on_timer_expired();
        scheduler.on_timer_expired();

        assert_eq!(
            scheduler.power().switches,
            vec![
                (LowPowerMode::Deep, LowPowerMode::Light),
                (LowPowerMode::Light, LowPowerMode::Deep),
                (LowPowerMode::Deep, LowPowerMode::Light),
            ]
        );
    }

    #[test]
    fn test_dispatch_handles_every_pending_notification() {
        let mut scheduler = scheduler();
        scheduler.start();

        let queue = ExpiryQueue::new();
        assert_eq!(scheduler.dispatch(&queue), 0);
        assert_eq!(scheduler.state(), DutyState::Active);

        queue.notify();
        queue.notify();
        queue.notify();
        assert_eq!(scheduler.dispatch(&queue), 3);
        assert_eq!(scheduler.state(), DutyState::Sleeping);
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn test_new_loads_validated_settings() {
        let config = DutyCycleConfig::new(1_000_000, 2000, 50, (0, 0, 2), (0, 0, 5)).unwrap();
        // A PwmOutput built for a faster clock must not alter the waveform
        let scheduler = DutyScheduler::new(
            &config,
            PeriodicTimer::new(MockCalendar::new()),
            PwmOutput::new(MockGenerator::new(), 16_000_000),
            MockPower::new(),
        )
        .unwrap();

        assert_eq!(scheduler.pwm().generator().loaded, Some(config.pwm()));
        assert_eq!(scheduler.pwm().settings(), Some(config.pwm()));
    }

    #[test]
    fn test_oversized_period_never_reaches_generator() {
        assert_eq!(
            DutyCycleConfig::new(16_000_000, 100, 50, (0, 0, 2), (0, 0, 5)),
            Err(ConfigError::PeriodOutOfRange)
        );

        let mut pwm = PwmOutput::new(MockGenerator::new(), 16_000_000);
        assert_eq!(pwm.configure(100, 50), Err(ConfigError::PeriodOutOfRange));
        pwm.enable();

        assert_eq!(pwm.generator().loaded, None);
        assert!(!pwm.generator().running);
    }
}
