//! Firmware for a battery-powered PWM beacon with a scheduled duty cycle.
//!
//! # Overview
//!
//! The beacon emits a fixed 2 kHz, 10 % duty waveform for 2 seconds, then
//! sleeps for 5 seconds with the waveform off, and repeats forever.
//!
//! # Hardware
//!
//! - **MCU**: STM32L031G6U6 (Cortex-M0+, ultra-low-power)
//! - **PWM**: TIM2 channel 1 on PA0
//! - **RTC**: 32.768 kHz crystal for timekeeping in STOP mode
//!
//! # Low Power Operation
//!
//! - MSI oscillator at 1.048 MHz clocks the core and TIM2
//! - During the PWM phase the executor idles in Sleep mode so TIM2 keeps running
//! - During the sleep phase the executor idles in STOP mode; only the RTC runs
//! - RTC alarm A wakes the MCU at the end of every phase
//!
//! # Module Organization
//!
//! - [`hardware`] - Pin mappings and peripheral initialization
//! - [`rtc`] - RTC calendar counter with the midnight alarm
//! - [`tim2`] - TIM2 waveform generator
//! - [`sleep`] - Sleep/Stop mode selection
//! - [`alarm`] - RTC interrupt and the duty cycle task
//!
//! The duty cycle logic itself lives in the `pwm_schedule` library.

#![no_std]
#![no_main]

mod alarm;
mod hardware;
mod rtc;
mod sleep;
mod tim2;

use defmt::unwrap;
use embassy_executor::Spawner;
use embassy_stm32::{
    Config,
    rcc::{LsConfig, LseConfig, mux::ClockMux},
    time::Hertz,
};
use pwm_schedule::config::CONFIG;
use {defmt_rtt as _, panic_probe as _};

use alarm::{duty_cycle_task, setup_alarm_interrupt};
use hardware::Peripherals;

/// Creates a low-power clock configuration for STM32L031.
///
/// # Clock Settings
///
/// - **MSI**: 1.048 MHz, system clock and TIM2 clock (`CLOCK_RATE_HZ`)
/// - **System clock**: MSI (no PLL)
/// - **LSE**: 32.768 kHz external crystal for RTC
/// - **Voltage scale**: Range 1
///
/// MSI is also the wake-up clock from STOP mode, so the PWM timer runs at
/// the same rate after every deep sleep.
fn create_low_power_config() -> embassy_stm32::rcc::Config {
    embassy_stm32::rcc::Config {
        msi: Some(embassy_stm32::rcc::MSIRange::RANGE1M),
        hsi: false,
        hse: None,
        pll: None,
        sys: embassy_stm32::rcc::Sysclk::MSI,
        ahb_pre: embassy_stm32::rcc::AHBPrescaler::DIV1,
        apb1_pre: embassy_stm32::rcc::APBPrescaler::DIV1,
        apb2_pre: embassy_stm32::rcc::APBPrescaler::DIV1,
        ls: LsConfig {
            rtc: embassy_stm32::rcc::RtcClockSource::LSE,
            lsi: false,
            lse: Some(LseConfig {
                frequency: Hertz::hz(32768),
                mode: embassy_stm32::rcc::LseMode::Oscillator(embassy_stm32::rcc::LseDrive::Low),
            }),
        },
        voltage_scale: embassy_stm32::rcc::VoltageScale::RANGE1,
        mux: ClockMux::default(),
    }
}

/// Main entry point for the beacon firmware.
///
/// # Initialization Sequence
///
/// 1. Configure clocks (MSI 1.048 MHz, LSE for the RTC)
/// 2. Route PA0 to TIM2_CH1 and PA8 to MCO
/// 3. Program RTC alarm A for midnight, load the waveform into TIM2
/// 4. Arm the first PWM phase and start the waveform
/// 5. Unmask the RTC interrupt
/// 6. Spawn the duty cycle task; the executor then idles until the alarm
///
/// # Spawned Tasks
///
/// - **duty_cycle_task**: Alternates PWM and sleep on every RTC alarm
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let mut config = Config::default();
    config.rcc = create_low_power_config();
    config.enable_debug_during_sleep = cfg!(feature = "debug-mode");

    let p = embassy_stm32::init(config);

    #[cfg(feature = "debug-mode")]
    defmt::info!("PWM beacon firmware starting...");

    // Wait 3 seconds after boot to allow debugger connection
    // before the first STOP mode entry.
    #[cfg(feature = "debug-mode")]
    {
        defmt::info!("Waiting 3 seconds for debugger connection...");
        embassy_time::Timer::after_secs(3).await;
    }

    // SCB is only touched by the sleep controller, which ends up owned by
    // the duty cycle task.
    let core = unsafe { cortex_m::Peripherals::steal() };

    #[cfg(feature = "debug-mode")]
    defmt::info!("Initializing peripherals...");

    let peripherals = Peripherals::new(p, core.SCB, &CONFIG);

    let mut scheduler = match peripherals.into_scheduler(&CONFIG) {
        Ok(scheduler) => scheduler,
        Err(e) => defmt::panic!("invalid duty cycle configuration: {}", e),
    };

    #[cfg(feature = "debug-mode")]
    defmt::info!("Starting duty cycle...");

    scheduler.start();
    setup_alarm_interrupt();

    #[cfg(feature = "debug-mode")]
    defmt::info!("Spawning duty cycle task...");

    spawner.spawn(unwrap!(duty_cycle_task(scheduler)));
}
