//! Hardware abstraction and peripheral initialization.
//!
//! This module defines the pin mappings and hands the board's peripherals to
//! the duty scheduler.
//!
//! # Pin Assignments
//!
//! ## Waveform
//! - **PA0**: PWM_OUT - TIM2_CH1, push-pull
//!
//! ## Clock Monitor
//! - **PA8**: MCO - LSE (32.768 kHz) routed out for measurement
//!
//! ## Low Power & RTC
//! - **PC14**: OSC32_IN - 32.768 kHz crystal input
//! - **PC15**: OSC32_OUT - 32.768 kHz crystal output
//!
//! ## Debug (SWD)
//! - **PA13**: SWDIO
//! - **PA14**: SWCLK

use cortex_m::peripheral::SCB;
use embassy_stm32::gpio::OutputType;
use embassy_stm32::peripherals;
use embassy_stm32::rcc::{Mco, McoPrescaler, McoSource};
use embassy_stm32::time::Hertz;
use embassy_stm32::timer::Ch1;
use embassy_stm32::timer::simple_pwm::{PwmPin, SimplePwm};
use pwm_schedule::ConfigError;
use pwm_schedule::calendar::PeriodicTimer;
use pwm_schedule::config::DutyCycleConfig;
use pwm_schedule::pwm::PwmOutput;
use pwm_schedule::scheduler::DutyScheduler;

use crate::rtc::RtcCalendar;
use crate::sleep::SleepController;
use crate::tim2::Tim2Waveform;

/// Duty scheduler bound to the STM32L031 peripherals
pub type Scheduler = DutyScheduler<RtcCalendar, Tim2Waveform, SleepController>;

/// Top-level peripheral container for the PWM beacon.
///
/// Owns every peripheral the duty cycle touches.
pub struct Peripherals {
    /// RTC calendar with alarm A at midnight
    pub rtc: RtcCalendar,
    /// TIM2 channel 1 waveform generator, stopped
    pub waveform: Tim2Waveform,
    /// Sleep depth selection
    pub sleep: SleepController,
    /// LSE routed to PA8 (kept alive, never read)
    _clock_monitor: Mco<'static, peripherals::MCO>,
}

impl Peripherals {
    /// Routes the waveform and clock monitor to their pins and prepares the
    /// RTC and timer.
    ///
    /// # Arguments
    ///
    /// * `p` - STM32 peripheral singleton from embassy_stm32::init()
    /// * `scb` - Cortex-M system control block (sleep depth)
    /// * `config` - Validated duty cycle configuration
    pub fn new(p: embassy_stm32::Peripherals, scb: SCB, config: &DutyCycleConfig) -> Self {
        let pwm_pin: PwmPin<'static, peripherals::TIM2, Ch1> =
            PwmPin::new(p.PA0, OutputType::PushPull);

        let pwm = SimplePwm::new(
            p.TIM2,
            Some(pwm_pin),
            None,
            None,
            None,
            Hertz::hz(config.frequency_hz()),
            Default::default(),
        );

        Self {
            rtc: RtcCalendar::new(),
            waveform: Tim2Waveform::new(pwm),
            sleep: SleepController::new(scb),
            _clock_monitor: Mco::new(p.MCO, p.PA8, McoSource::LSE, McoPrescaler::DIV1),
        }
    }

    /// Builds the duty scheduler, loading the waveform into TIM2.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`] from configuring the PWM output
    pub fn into_scheduler(self, config: &DutyCycleConfig) -> Result<Scheduler, ConfigError> {
        DutyScheduler::new(
            config,
            PeriodicTimer::new(self.rtc),
            PwmOutput::new(self.waveform, config.clock_hz()),
            self.sleep,
        )
    }
}
