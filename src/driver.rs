//! Low-level RTC driver interface
//!
//! [`Rtc`](crate::rtc::Rtc) never touches registers. Everything hardware
//! specific (backup domain unlocking, prescaler computation, BCD encoding,
//! EXTI/NVIC wiring) is provided by an implementation of [`RtcDriver`],
//! usually living in a board support or HAL crate.

use crate::alarm::MatchMask;

/// Hour format of the calendar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HourFormat {
    /// 0-23
    H24,
    /// 1-12 with AM/PM
    H12,
}

/// Half of the day, only meaningful with [`HourFormat::H12`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Period {
    AM,
    PM,
}

/// RTC kernel clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockSource {
    /// Low speed internal RC oscillator (~32 kHz, inaccurate)
    Lsi,
    /// Low speed external crystal (32.768 kHz)
    Lse,
    /// High speed external oscillator, divided down by the driver
    Hse,
}

/// Asynchronous and synchronous prescaler values
///
/// The calendar runs at `f_src / ((asynch + 1) * (synch + 1))`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Prediv {
    pub asynch: u8,
    pub synch: u16,
}

/// Interrupt callback
pub type Callback = fn();

/// Snapshot of the time register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimeRegs {
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
    /// Milliseconds, 0-999
    pub sub_seconds: u32,
    pub period: Period,
}

impl Default for TimeRegs {
    fn default() -> Self {
        Self {
            hours: 0,
            minutes: 0,
            seconds: 0,
            sub_seconds: 0,
            period: Period::AM,
        }
    }
}

/// Snapshot of the date register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DateRegs {
    /// Years since 2000, 0-99
    pub year: u8,
    pub month: u8,
    pub day: u8,
    /// 1-7, Monday first
    pub weekday: u8,
}

impl Default for DateRegs {
    /// Saturday 1st January 2000, the calendar reset value
    fn default() -> Self {
        Self {
            year: 0,
            month: 1,
            day: 1,
            weekday: 6,
        }
    }
}

/// Snapshot of the alarm A registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlarmRegs {
    pub day: u8,
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
    /// Milliseconds, 0-999
    pub sub_seconds: u32,
    pub period: Period,
    /// Fields compared by the hardware
    pub mask: MatchMask,
}

impl Default for AlarmRegs {
    fn default() -> Self {
        Self {
            day: 1,
            hours: 0,
            minutes: 0,
            seconds: 0,
            sub_seconds: 0,
            period: Period::AM,
            mask: MatchMask::empty(),
        }
    }
}

/// Hardware access used by [`Rtc`](crate::rtc::Rtc)
pub trait RtcDriver {
    /// Error raised by the hardware layer
    type Error: core::fmt::Debug;

    /// Enables the RTC domain and configures the calendar.
    ///
    /// Returns `true` when the calendar was (re)initialized and its content is
    /// therefore meaningless, `false` when it kept running across the reset.
    fn init(
        &mut self,
        format: HourFormat,
        source: ClockSource,
        reset: bool,
    ) -> Result<bool, Self::Error>;

    /// Stops the RTC and releases the backup domain
    fn deinit(&mut self) -> Result<(), Self::Error>;

    /// Selects the kernel clock used by the next [`init`](Self::init)
    fn set_clock_source(&mut self, source: ClockSource) -> Result<(), Self::Error>;

    /// Prescalers in use, user supplied or computed for the current source
    fn prediv(&mut self) -> Result<Prediv, Self::Error>;

    /// Overrides the prescalers, `None` restores the computed ones
    fn set_prediv(&mut self, prediv: Option<Prediv>) -> Result<(), Self::Error>;

    fn time(&mut self) -> Result<TimeRegs, Self::Error>;

    fn set_time(&mut self, time: &TimeRegs) -> Result<(), Self::Error>;

    fn date(&mut self) -> Result<DateRegs, Self::Error>;

    fn set_date(&mut self, date: &DateRegs) -> Result<(), Self::Error>;

    /// Programs and arms alarm A
    fn start_alarm(&mut self, alarm: &AlarmRegs) -> Result<(), Self::Error>;

    /// Disarms alarm A. The match mask may be left in place.
    fn stop_alarm(&mut self) -> Result<(), Self::Error>;

    /// Current content of the alarm A registers
    fn alarm(&mut self) -> Result<AlarmRegs, Self::Error>;

    /// Whether alarm A is armed
    fn is_alarm_set(&mut self) -> Result<bool, Self::Error>;

    fn attach_alarm_callback(&mut self, callback: Callback);

    fn detach_alarm_callback(&mut self);

    /// Whether the device has a dedicated one-second interrupt
    fn has_seconds_interrupt(&self) -> bool {
        false
    }

    fn attach_seconds_callback(&mut self, _callback: Callback) {}

    fn detach_seconds_callback(&mut self) {}
}
