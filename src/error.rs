//! Configuration error types
//!
//! The duty cycle has no runtime failure paths. Every value that could put
//! the hardware in an inconsistent state is a compile-time constant, so all
//! validation happens when those constants are turned into typed settings.

use core::fmt;

/// Rejected configuration value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// PWM frequency of zero
    ZeroFrequency,
    /// PWM frequency higher than the timer clock (period of zero ticks)
    FrequencyAboveClock,
    /// Duty cycle above 100 %
    DutyOutOfRange,
    /// Period does not fit the 16-bit timer auto-reload register
    PeriodOutOfRange,
    /// Deadline of a full day or more
    DeadlineOutOfRange,
    /// Deadline of zero seconds
    EmptyDeadline,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroFrequency => write!(f, "PWM frequency must be non-zero"),
            ConfigError::FrequencyAboveClock => {
                write!(f, "PWM frequency exceeds the timer clock rate")
            }
            ConfigError::DutyOutOfRange => write!(f, "duty cycle must be within 0..=100 %"),
            ConfigError::PeriodOutOfRange => write!(f, "PWM period exceeds the timer range"),
            ConfigError::DeadlineOutOfRange => write!(f, "deadline must be shorter than a day"),
            ConfigError::EmptyDeadline => write!(f, "deadline must be at least one second"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            ConfigError::DutyOutOfRange.to_string(),
            "duty cycle must be within 0..=100 %"
        );
        assert_eq!(
            ConfigError::DeadlineOutOfRange.to_string(),
            "deadline must be shorter than a day"
        );
    }
}
