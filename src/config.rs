//! Compile-time configuration
//!
//! These constants are the whole configuration surface of the firmware.
//! [`CONFIG`] is evaluated at compile time, so an out-of-range value fails
//! the build instead of producing a bad waveform or a wrapped alarm.

use crate::calendar::TimerDeadline;
use crate::error::ConfigError;
use crate::pwm::PwmSettings;

/// PWM timer clock (MSI range 4, 1.048 MHz)
pub const CLOCK_RATE_HZ: u32 = 1_048_576;

/// PWM frequency in Hz
pub const PWM_FREQUENCY_HZ: u32 = 2_000;

/// PWM duty cycle in percent
pub const PWM_DUTY_PERCENT: u8 = 10;

/// Length of each PWM phase as (hours, minutes, seconds)
pub const PWM_ON_DURATION: (u32, u32, u32) = (0, 0, 2);

/// Length of each sleep phase as (hours, minutes, seconds)
pub const SLEEP_DURATION: (u32, u32, u32) = (0, 0, 5);

/// Largest period the 16-bit timer can count (ARR = period - 1)
pub const MAX_TIMER_PERIOD: u32 = 1 << 16;

/// Validated duty cycle configuration
///
/// Only obtainable through [`DutyCycleConfig::new`], so every instance has
/// passed the range checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DutyCycleConfig {
    clock_hz: u32,
    frequency_hz: u32,
    duty_percent: u8,
    pwm: PwmSettings,
    pwm_on: TimerDeadline,
    sleep: TimerDeadline,
}

impl DutyCycleConfig {
    /// Validates a full configuration.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`] from the PWM or deadline checks, plus
    /// [`ConfigError::PeriodOutOfRange`] when the period does not fit
    /// the 16-bit timer.
    pub const fn new(
        clock_hz: u32,
        frequency_hz: u32,
        duty_percent: u8,
        pwm_on: (u32, u32, u32),
        sleep: (u32, u32, u32),
    ) -> Result<Self, ConfigError> {
        let pwm = match PwmSettings::compute(clock_hz, frequency_hz, duty_percent) {
            Ok(pwm) => pwm,
            Err(e) => return Err(e),
        };
        if pwm.period() > MAX_TIMER_PERIOD {
            return Err(ConfigError::PeriodOutOfRange);
        }
        let pwm_on = match TimerDeadline::new(pwm_on.0, pwm_on.1, pwm_on.2) {
            Ok(deadline) => deadline,
            Err(e) => return Err(e),
        };
        let sleep = match TimerDeadline::new(sleep.0, sleep.1, sleep.2) {
            Ok(deadline) => deadline,
            Err(e) => return Err(e),
        };

        Ok(Self {
            clock_hz,
            frequency_hz,
            duty_percent,
            pwm,
            pwm_on,
            sleep,
        })
    }

    /// Timer clock feeding the waveform generator
    pub const fn clock_hz(&self) -> u32 {
        self.clock_hz
    }

    pub const fn frequency_hz(&self) -> u32 {
        self.frequency_hz
    }

    pub const fn duty_percent(&self) -> u8 {
        self.duty_percent
    }

    /// Comparator values derived from clock, frequency and duty
    pub const fn pwm(&self) -> PwmSettings {
        self.pwm
    }

    /// Time spent with the waveform running
    pub const fn pwm_on(&self) -> TimerDeadline {
        self.pwm_on
    }

    /// Time spent asleep with the waveform stopped
    pub const fn sleep(&self) -> TimerDeadline {
        self.sleep
    }
}

/// Firmware configuration, checked during const evaluation
pub const CONFIG: DutyCycleConfig = match DutyCycleConfig::new(
    CLOCK_RATE_HZ,
    PWM_FREQUENCY_HZ,
    PWM_DUTY_PERCENT,
    PWM_ON_DURATION,
    SLEEP_DURATION,
) {
    Ok(config) => config,
    Err(_) => panic!("invalid duty cycle configuration"),
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_firmware_config() {
        assert_eq!(CONFIG.pwm().period(), 524);
        assert_eq!(CONFIG.pwm().active_width(), 52);
        assert_eq!(CONFIG.pwm_on().total_seconds(), 2);
        assert_eq!(CONFIG.sleep().total_seconds(), 5);
    }

    #[test]
    fn test_period_must_fit_timer() {
        assert_eq!(
            DutyCycleConfig::new(16_000_000, 100, 50, (0, 0, 1), (0, 0, 1)),
            Err(ConfigError::PeriodOutOfRange)
        );
        assert!(DutyCycleConfig::new(65_536, 1, 50, (0, 0, 1), (0, 0, 1)).is_ok());
    }

    #[test]
    fn test_deadlines_validated() {
        assert_eq!(
            DutyCycleConfig::new(1_000_000, 2000, 10, (24, 0, 0), (0, 0, 5)),
            Err(ConfigError::DeadlineOutOfRange)
        );
        assert_eq!(
            DutyCycleConfig::new(1_000_000, 2000, 10, (0, 0, 2), (0, 0, 0)),
            Err(ConfigError::EmptyDeadline)
        );
    }
}
