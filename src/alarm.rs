//! RTC alarm interrupt and the duty cycle task.
//!
//! # Alarm Operation
//!
//! RTC alarm A is wired to EXTI line 17 (rising edge), which wakes the MCU
//! from Stop mode and raises the `RTC` interrupt. The handler only clears the
//! flags and records the notification; the duty cycle task owns the
//! scheduler and performs the transition.

use embassy_stm32::pac;
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, signal::Signal};
use pac::interrupt;
use pwm_schedule::expiry::ExpiryQueue;

use crate::hardware::Scheduler;

/// EXTI line number for the RTC alarms (fixed at line 17 on STM32L0)
const RTC_ALARM_EXTI_LINE: usize = 17;

/// IMR register index for EXTI line 17 (lines 0-31 are in IMR1)
const IMR1_REG_IDX: usize = 0;

/// Alarm notifications not yet handled by the duty cycle task.
static EXPIRED: ExpiryQueue = ExpiryQueue::new();

/// Wakes the duty cycle task. The pending count lives in [`EXPIRED`], so
/// coalesced wake-ups lose nothing.
static ALARM_SIGNAL: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// RTC interrupt handler (EXTI line 17).
///
/// Triggered when the calendar rolls over midnight and alarm A matches.
///
/// # Safety
///
/// This interrupt handler accesses PAC registers directly.
#[interrupt]
fn RTC() {
    let rtc = pac::RTC;
    let exti = pac::EXTI;

    let fired = rtc.isr().read().alraf();
    rtc.isr().modify(|w| w.set_alraf(false));

    // Clear pending interrupt on EXTI line 17
    exti.pr(IMR1_REG_IDX)
        .write(|w| w.set_line(RTC_ALARM_EXTI_LINE, true));

    if fired {
        EXPIRED.notify();
        ALARM_SIGNAL.signal(());
    }
}

/// Routes RTC alarm A to the NVIC.
///
/// Call after the scheduler has armed the first deadline; from here on only
/// the duty cycle task touches the RTC, TIM2 and the sleep controller.
///
/// # Safety
///
/// Directly accesses PAC registers and unmasks NVIC interrupt.
pub fn setup_alarm_interrupt() {
    let exti = pac::EXTI;

    exti.imr(IMR1_REG_IDX)
        .modify(|w| w.set_line(RTC_ALARM_EXTI_LINE, true));
    exti.rtsr(IMR1_REG_IDX)
        .modify(|w| w.set_line(RTC_ALARM_EXTI_LINE, true));

    unsafe {
        cortex_m::peripheral::NVIC::unmask(embassy_stm32::interrupt::RTC);
    };
}

/// Async task running the duty cycle.
///
/// Waits for alarm notifications and hands each one to the scheduler. The
/// task is the only consumer of [`EXPIRED`] and owns the scheduler, so
/// transitions never overlap.
///
/// # Arguments
///
/// * `scheduler` - Started duty scheduler (takes ownership)
#[embassy_executor::task]
pub async fn duty_cycle_task(mut scheduler: Scheduler) {
    loop {
        ALARM_SIGNAL.wait().await;

        let handled = scheduler.dispatch(&EXPIRED);
        if handled > 1 {
            defmt::warn!("{} alarm notifications handled in one wake-up", handled);
        }

        #[cfg(feature = "debug-mode")]
        defmt::info!(
            "Entered {} (cycle {})",
            scheduler.state(),
            scheduler.cycles()
        );
    }
}
