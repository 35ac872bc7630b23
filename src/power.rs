//! Low-power modes requested by the scheduler

/// Processor wait state used while waiting for the next timer notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LowPowerMode {
    /// Core halted, peripheral clocks kept running so the PWM timer counts
    Light,
    /// Every clock stopped except the low-speed oscillator driving the RTC
    Deep,
}

/// Selects the wait state entered on the next idle
pub trait PowerModeControl {
    /// Leave `from` and request `to`. Interrupts stay enabled so the timer
    /// notification can still wake the core.
    fn switch(&mut self, from: LowPowerMode, to: LowPowerMode);
}
