//! Sleep depth selection.
//!
//! The embassy executor idles with WFE; what that wait costs is decided by
//! the SLEEPDEEP bit and the regulator mode:
//!
//! - Light: Sleep mode. Core clock gated, TIM2 keeps generating the waveform.
//! - Deep: Stop mode with the regulator in low-power mode. Only LSE and the
//!   RTC keep running; the RTC alarm (EXTI line 17) wakes the core.
//!
//! The core wakes from Stop on MSI, which is already the system clock, so
//! nothing needs restoring after a deep wait.

use cortex_m::peripheral::SCB;
use embassy_stm32::pac;
use pwm_schedule::power::{LowPowerMode, PowerModeControl};

pub struct SleepController {
    scb: SCB,
}

impl SleepController {
    pub fn new(scb: SCB) -> Self {
        Self { scb }
    }
}

impl PowerModeControl for SleepController {
    fn switch(&mut self, from: LowPowerMode, to: LowPowerMode) {
        if from == LowPowerMode::Deep {
            self.scb.clear_sleepdeep();
            pac::PWR.cr().modify(|w| w.set_lpsdsr(false));
        }

        if to == LowPowerMode::Deep {
            pac::PWR.cr().modify(|w| w.set_lpsdsr(true));
            self.scb.set_sleepdeep();
        }
    }
}
