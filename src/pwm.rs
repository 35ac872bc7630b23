//! PWM output facility
//!
//! A single fixed-frequency, fixed-duty waveform. The period and active width
//! are computed once from the timer clock; afterwards the output is only ever
//! switched on and off.

use crate::error::ConfigError;
use crate::{log_debug, log_warn};

/// Comparator values for one waveform, in timer clock ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PwmSettings {
    period: u32,
    active_width: u32,
}

impl PwmSettings {
    /// Computes period and active width for a timer running at `clock_hz`.
    ///
    /// - period = `clock_hz / frequency_hz`
    /// - active width = `period * duty_percent / 100`
    ///
    /// Duty 0 and 100 are valid: the output never or always asserts.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::ZeroFrequency`] if `frequency_hz` is zero
    /// - [`ConfigError::DutyOutOfRange`] if `duty_percent` exceeds 100
    /// - [`ConfigError::FrequencyAboveClock`] if the period rounds down to zero
    pub const fn compute(
        clock_hz: u32,
        frequency_hz: u32,
        duty_percent: u8,
    ) -> Result<Self, ConfigError> {
        if frequency_hz == 0 {
            return Err(ConfigError::ZeroFrequency);
        }
        if duty_percent > 100 {
            return Err(ConfigError::DutyOutOfRange);
        }

        let period = clock_hz / frequency_hz;
        if period == 0 {
            return Err(ConfigError::FrequencyAboveClock);
        }

        // u64 keeps period * 100 from overflowing for large clocks
        let active_width = (period as u64 * duty_percent as u64 / 100) as u32;

        Ok(Self {
            period,
            active_width,
        })
    }

    /// Ticks per waveform period
    pub const fn period(&self) -> u32 {
        self.period
    }

    /// Ticks per period the output is asserted; never exceeds `period`
    pub const fn active_width(&self) -> u32 {
        self.active_width
    }
}

/// Hardware waveform generator (timer + compare channel)
pub trait WaveformGenerator {
    /// Longest period, in ticks, the counter can produce
    const MAX_PERIOD: u32;

    /// Store period and width in the comparator registers.
    ///
    /// Only called with `settings.period() <= Self::MAX_PERIOD`.
    fn load(&mut self, settings: PwmSettings);

    /// Switch the channel to PWM output and start the counter.
    fn start(&mut self);

    /// Force the channel inactive and stop the counter.
    fn stop(&mut self);
}

/// On/off control of the configured waveform
///
/// `enable` and `disable` are idempotent: redundant calls never touch the
/// generator.
#[derive(Debug)]
pub struct PwmOutput<W> {
    generator: W,
    clock_hz: u32,
    settings: Option<PwmSettings>,
    on: bool,
}

impl<W: WaveformGenerator> PwmOutput<W> {
    /// Wraps a stopped generator clocked at `clock_hz`.
    pub fn new(generator: W, clock_hz: u32) -> Self {
        Self {
            generator,
            clock_hz,
            settings: None,
            on: false,
        }
    }

    /// Computes the waveform for `frequency_hz` / `duty_percent` and loads it
    /// into the generator.
    ///
    /// # Errors
    ///
    /// Any error from [`PwmSettings::compute`] or [`load`](Self::load); the
    /// generator is left untouched in that case.
    pub fn configure(
        &mut self,
        frequency_hz: u32,
        duty_percent: u8,
    ) -> Result<PwmSettings, ConfigError> {
        let settings = PwmSettings::compute(self.clock_hz, frequency_hz, duty_percent)?;
        self.load(settings)?;
        Ok(settings)
    }

    /// Loads precomputed settings into the generator.
    ///
    /// # Errors
    ///
    /// [`ConfigError::PeriodOutOfRange`] if the period exceeds what the
    /// generator can count; nothing is loaded and the output stays as it was.
    pub fn load(&mut self, settings: PwmSettings) -> Result<(), ConfigError> {
        if settings.period() > W::MAX_PERIOD {
            return Err(ConfigError::PeriodOutOfRange);
        }
        self.generator.load(settings);
        self.settings = Some(settings);

        log_debug!(
            "pwm configured: period {} ticks, width {} ticks",
            settings.period(),
            settings.active_width()
        );

        Ok(())
    }

    /// Starts the waveform.
    ///
    /// Does nothing when already running, or when no waveform has been
    /// configured yet (the output stays off).
    pub fn enable(&mut self) {
        if self.on {
            return;
        }
        if self.settings.is_none() {
            log_warn!("pwm enable ignored: not configured");
            return;
        }
        self.generator.start();
        self.on = true;
    }

    /// Stops the waveform. Does nothing when already stopped.
    pub fn disable(&mut self) {
        if !self.on {
            return;
        }
        self.generator.stop();
        self.on = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.on
    }

    pub fn settings(&self) -> Option<PwmSettings> {
        self.settings
    }

    pub fn generator(&self) -> &W {
        &self.generator
    }
}
