//! TIM2 channel 1 waveform generator.
//!
//! `SimplePwm` owns the pin mux and the TIM2 clock enable; the comparator
//! values and the start/stop sequence go straight to the registers so the
//! period is exactly the one computed from the configured clock.
//!
//! - ARR  = period - 1 (up-counting, prescaler 1)
//! - CCR1 = active width
//! - OC1M = PWM mode 1 while running, forced inactive while stopped

use embassy_stm32::pac;
use embassy_stm32::pac::timer::vals::Ocm;
use embassy_stm32::peripherals::TIM2;
use embassy_stm32::timer::simple_pwm::SimplePwm;
use pwm_schedule::config::MAX_TIMER_PERIOD;
use pwm_schedule::pwm::{PwmSettings, WaveformGenerator};

/// Compare channel index of TIM2_CH1
const CHANNEL: usize = 0;

/// CCMR1 holds the output compare modes of channels 1 and 2
const CCMR: usize = 0;

pub struct Tim2Waveform {
    /// Keeps PA0 in TIM2_CH1 alternate function and the timer clocked
    _pwm: SimplePwm<'static, TIM2>,
}

impl Tim2Waveform {
    /// Takes over a `SimplePwm` and leaves the output stopped.
    pub fn new(pwm: SimplePwm<'static, TIM2>) -> Self {
        let mut waveform = Self { _pwm: pwm };
        waveform.stop();
        waveform
    }
}

impl WaveformGenerator for Tim2Waveform {
    /// ARR and CCR1 are 16 bits wide on the L0's TIM2
    const MAX_PERIOD: u32 = MAX_TIMER_PERIOD;

    fn load(&mut self, settings: PwmSettings) {
        let tim = pac::TIM2;

        // 1 <= period <= MAX_PERIOD, so ARR always fits. Width only reaches
        // 0x10000 at 100 % duty on the longest period; CCR saturates there.
        let arr = (settings.period() - 1) as u16;
        let ccr = settings.active_width().min(u32::from(u16::MAX)) as u16;

        tim.psc().write_value(0);
        tim.arr().write(|w| w.set_arr(arr));
        tim.ccr(CHANNEL).write(|w| w.set_ccr(ccr));

        // Latch PSC/ARR now rather than at the next overflow
        tim.egr().write(|w| w.set_ug(true));
    }

    fn start(&mut self) {
        let tim = pac::TIM2;
        tim.ccmr_output(CCMR)
            .modify(|w| w.set_ocm(CHANNEL, Ocm::PWM_MODE1));
        tim.ccer().modify(|w| w.set_cce(CHANNEL, true));
        tim.cr1().modify(|w| w.set_cen(true));
    }

    fn stop(&mut self) {
        let tim = pac::TIM2;
        tim.ccmr_output(CCMR)
            .modify(|w| w.set_ocm(CHANNEL, Ocm::FORCE_INACTIVE));
        tim.cr1().modify(|w| w.set_cen(false));
    }
}
