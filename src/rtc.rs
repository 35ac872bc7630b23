//! RTC calendar counter.
//!
//! The RTC runs from the LSE crystal with the reset prescalers (1 Hz
//! calendar tick) and keeps counting in Stop mode. Alarm A is programmed once
//! to match 00:00:00 on any date; arming a deadline only rewrites the time
//! register so the calendar reaches midnight when the deadline expires.
//!
//! Writing RTC_TR requires init mode, which also freezes the calendar. That
//! is the hold/resume pair of [`CalendarCounter`].

use embassy_stm32::pac;
use embassy_stm32::pac::rtc::vals::{AlrmrMsk, Ampm};
use pwm_schedule::calendar::{CalendarCounter, CalendarTime};

/// Write-protection unlock sequence
const WPR_KEY1: u8 = 0xCA;
const WPR_KEY2: u8 = 0x53;
/// Any other value re-enables write protection
const WPR_LOCK: u8 = 0xFF;

/// Alarm A register index
const ALARM_A: usize = 0;

/// RTC calendar with a daily midnight alarm.
pub struct RtcCalendar {
    _private: (),
}

impl RtcCalendar {
    /// Enables backup-domain access and programs alarm A for midnight.
    ///
    /// The RTC clock source (LSE) is selected by embassy_stm32::init().
    pub fn new() -> Self {
        let rtc = pac::RTC;

        // RTC registers sit in the backup domain
        pac::RCC.apb1enr().modify(|w| w.set_pwren(true));
        pac::PWR.cr().modify(|w| w.set_dbp(true));

        unlock();

        rtc.cr().modify(|w| {
            w.set_alrae(false);
            w.set_alraie(false);
        });
        while !rtc.isr().read().alrawf() {}

        let midnight = CalendarTime::MIDNIGHT;
        rtc.alrmr(ALARM_A).write(|w| {
            w.set_msk1(AlrmrMsk::TO_MATCH); // seconds
            w.set_msk2(AlrmrMsk::TO_MATCH); // minutes
            w.set_msk3(AlrmrMsk::TO_MATCH); // hours
            w.set_msk4(AlrmrMsk::NOT_MATCH); // any date
            w.set_pm(Ampm::AM);
            w.set_ht(midnight.hour / 10);
            w.set_hu(midnight.hour % 10);
            w.set_mnt(midnight.minute / 10);
            w.set_mnu(midnight.minute % 10);
            w.set_st(midnight.second / 10);
            w.set_su(midnight.second % 10);
        });

        rtc.isr().modify(|w| w.set_alraf(false));
        rtc.cr().modify(|w| {
            w.set_alrae(true);
            w.set_alraie(true);
        });

        lock();

        Self { _private: () }
    }
}

impl CalendarCounter for RtcCalendar {
    /// Enters init mode, freezing the calendar.
    fn hold(&mut self) {
        let rtc = pac::RTC;
        unlock();
        rtc.isr().modify(|w| w.set_init(true));
        while !rtc.isr().read().initf() {}
    }

    /// Writes the time of day in BCD, 24-hour format.
    fn load(&mut self, time: CalendarTime) {
        pac::RTC.tr().write(|w| {
            w.set_pm(Ampm::AM);
            w.set_ht(time.hour / 10);
            w.set_hu(time.hour % 10);
            w.set_mnt(time.minute / 10);
            w.set_mnu(time.minute % 10);
            w.set_st(time.second / 10);
            w.set_su(time.second % 10);
        });
    }

    /// Leaves init mode; the calendar restarts from the loaded time.
    fn resume(&mut self) {
        pac::RTC.isr().modify(|w| w.set_init(false));
        lock();
    }
}

fn unlock() {
    let rtc = pac::RTC;
    rtc.wpr().write(|w| w.set_key(WPR_KEY1));
    rtc.wpr().write(|w| w.set_key(WPR_KEY2));
}

fn lock() {
    pac::RTC.wpr().write(|w| w.set_key(WPR_LOCK));
}
