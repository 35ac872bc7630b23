#![cfg_attr(not(test), no_std)]

//! pwm_schedule - duty-cycle controller for a low-power PWM beacon
//!
//! The firmware alternates a fixed-frequency PWM waveform with a sleep
//! interval. A real-time clock alarm marks the end of each phase; on every
//! alarm the [`scheduler::DutyScheduler`] flips between PWM and sleep,
//! re-arms the clock, and picks how deeply the core may sleep until the next
//! alarm.
//!
//! # Module Organization
//!
//! - [`config`] - Compile-time configuration, validated during const evaluation
//! - [`calendar`] - Midnight-relative alarm arithmetic and the calendar counter seam
//! - [`pwm`] - Period/width computation and the waveform generator seam
//! - [`power`] - Low-power modes requested by the scheduler
//! - [`expiry`] - Interrupt-to-task notification queue
//! - [`scheduler`] - The two-state duty cycle state machine
//!
//! Hardware bindings for the STM32L031 live in the firmware binary and are
//! only built with the `stm32` feature. Everything here builds and tests on
//! the host.

pub mod logging;

pub mod calendar;
pub mod config;
pub mod error;
pub mod expiry;
pub mod power;
pub mod pwm;
pub mod scheduler;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use error::ConfigError;
