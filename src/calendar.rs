//! Periodic timer facility
//!
//! The wake-up source is a calendar counter (time of day) whose only alarm
//! fires when the counter rolls over midnight. A delay of `d` seconds is
//! therefore scheduled by loading the counter with `midnight - d` and letting
//! it run into the rollover.
//!
//! [`PeriodicTimer`] owns the arithmetic and the hold/load/resume protocol;
//! the register access lives behind [`CalendarCounter`].

use crate::error::ConfigError;
use crate::log_debug;

/// Seconds in one calendar day
pub const SECONDS_PER_DAY: u32 = 24 * 3600;

/// Seconds left until the midnight rollover when the counter starts
/// `offset_seconds` before it.
///
/// Valid for `offset_seconds < SECONDS_PER_DAY`. An offset of zero yields a
/// full day, which decomposes to `24:00:00`.
pub const fn seconds_until_midnight(offset_seconds: u32) -> u32 {
    SECONDS_PER_DAY - offset_seconds
}

/// Delay until the next timer notification
///
/// Fields are not required to be normalised (`0h 0m 90s` is accepted); only
/// the total is validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerDeadline {
    hours: u32,
    minutes: u32,
    seconds: u32,
}

impl TimerDeadline {
    /// Creates a deadline of `hours:minutes:seconds`.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::EmptyDeadline`] for a total of zero seconds
    /// - [`ConfigError::DeadlineOutOfRange`] for a day or more
    pub const fn new(hours: u32, minutes: u32, seconds: u32) -> Result<Self, ConfigError> {
        let total = match total_seconds(hours, minutes, seconds) {
            Some(total) => total,
            None => return Err(ConfigError::DeadlineOutOfRange),
        };
        if total == 0 {
            return Err(ConfigError::EmptyDeadline);
        }
        if total >= SECONDS_PER_DAY {
            return Err(ConfigError::DeadlineOutOfRange);
        }
        Ok(Self {
            hours,
            minutes,
            seconds,
        })
    }

    pub const fn hours(&self) -> u32 {
        self.hours
    }

    pub const fn minutes(&self) -> u32 {
        self.minutes
    }

    pub const fn seconds(&self) -> u32 {
        self.seconds
    }

    /// Total length of the deadline in seconds
    pub const fn total_seconds(&self) -> u32 {
        self.hours * 3600 + self.minutes * 60 + self.seconds
    }

    /// Time of day the counter is loaded with so that it reaches midnight
    /// after this deadline.
    pub const fn countdown_start(&self) -> CalendarTime {
        CalendarTime::from_seconds(seconds_until_midnight(self.total_seconds()))
    }
}

const fn total_seconds(hours: u32, minutes: u32, seconds: u32) -> Option<u32> {
    let Some(h) = hours.checked_mul(3600) else {
        return None;
    };
    let Some(m) = minutes.checked_mul(60) else {
        return None;
    };
    let Some(hm) = h.checked_add(m) else {
        return None;
    };
    hm.checked_add(seconds)
}

/// Hour/minute/second fields of the calendar counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalendarTime {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl CalendarTime {
    pub const MIDNIGHT: Self = Self {
        hour: 0,
        minute: 0,
        second: 0,
    };

    /// Splits a second count into hour/minute/second fields.
    ///
    /// `total` must not exceed [`SECONDS_PER_DAY`]; exactly one day maps to
    /// `24:00:00`.
    pub const fn from_seconds(total: u32) -> Self {
        let second = (total % 60) as u8;
        let minutes = total / 60;
        let minute = (minutes % 60) as u8;
        let hour = (minutes / 60) as u8;
        Self {
            hour,
            minute,
            second,
        }
    }

    /// Seconds since the start of the day represented by these fields
    pub const fn seconds_of_day(&self) -> u32 {
        self.hour as u32 * 3600 + self.minute as u32 * 60 + self.second as u32
    }
}

/// Register-level access to a continuously running calendar counter whose
/// alarm fires on the midnight rollover.
pub trait CalendarCounter {
    /// Stop the counter so it cannot increment mid-update.
    fn hold(&mut self);

    /// Load the time-of-day fields. Only called between `hold` and `resume`.
    fn load(&mut self, time: CalendarTime);

    /// Restart the counter from the loaded value.
    fn resume(&mut self);
}

/// One-shot wake-up after a [`TimerDeadline`]
///
/// At most one deadline is outstanding; arming again replaces it.
#[derive(Debug)]
pub struct PeriodicTimer<C> {
    counter: C,
}

impl<C: CalendarCounter> PeriodicTimer<C> {
    pub fn new(counter: C) -> Self {
        Self { counter }
    }

    /// Arms the timer to fire once after `deadline`.
    ///
    /// The counter is held while the new start value is loaded so the
    /// hardware's own increment cannot tear the update.
    ///
    /// A zero deadline never gets here: [`TimerDeadline::new`] rejects it,
    /// as the counter has no 24:00:00 to load.
    ///
    /// # Returns
    ///
    /// The time of day the counter was loaded with
    pub fn arm(&mut self, deadline: TimerDeadline) -> CalendarTime {
        let start = deadline.countdown_start();

        self.counter.hold();
        self.counter.load(start);
        self.counter.resume();

        log_debug!(
            "timer armed for {}s, counter at {}:{}:{}",
            deadline.total_seconds(),
            start.hour,
            start.minute,
            start.second
        );

        start
    }

    pub fn counter(&self) -> &C {
        &self.counter
    }
}
