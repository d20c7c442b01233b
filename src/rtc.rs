//! # Real Time Clock
//!
//! [`Rtc`] keeps a copy of the calendar, time and alarm fields. Getters refresh
//! the copy from the hardware before returning it, setters validate their
//! input, update the copy and write it through to the hardware. Out of range
//! values are ignored and the previous value is kept.
//!
//! The alarm fields are only pushed to the hardware by
//! [`Rtc::enable_alarm`] (or [`Rtc::set_alarm_epoch`]).
//!
//! ```ignore
//! let mut rtc = Rtc::new(driver, RtcConfig::default().clock_source(ClockSource::Lse));
//! rtc.begin(false)?;
//! if !rtc.is_time_set() {
//!     rtc.set_datetime(&datetime!(2019-01-01 23:59))?;
//! }
//! rtc.set_alarm_time(0, 0, 30, 0.millis(), Period::AM);
//! rtc.enable_alarm(AlarmMatch::MmSs)?;
//! ```

use fugit::MillisDurationU32;
use time::PrimitiveDateTime;

use crate::alarm::AlarmMatch;
use crate::driver::{
    AlarmRegs, Callback, ClockSource, DateRegs, HourFormat, Period, Prediv, RtcDriver, TimeRegs,
};
use crate::epoch;

/// RTC error type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum Error<E> {
    /// The hardware layer failed
    Driver(E),
    /// The calendar content or the requested instant cannot be represented
    InvalidInputData,
    /// The device has no such feature
    Unsupported,
}

/// RTC configuration, applied by [`Rtc::begin`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RtcConfig {
    pub clock_source: ClockSource,
    pub hour_format: HourFormat,
    /// `None` lets the driver compute the prescalers for the clock source
    pub prediv: Option<Prediv>,
}

impl Default for RtcConfig {
    fn default() -> Self {
        Self {
            clock_source: ClockSource::Lsi,
            hour_format: HourFormat::H24,
            prediv: None,
        }
    }
}

impl RtcConfig {
    pub fn clock_source(mut self, source: ClockSource) -> Self {
        self.clock_source = source;
        self
    }

    pub fn hour_format(mut self, format: HourFormat) -> Self {
        self.hour_format = format;
        self
    }

    pub fn prediv(mut self, prediv: Prediv) -> Self {
        self.prediv = Some(prediv);
        self
    }
}

/// Real Time Clock
pub struct Rtc<D> {
    driver: D,
    config: RtcConfig,
    time_set: bool,
    time: TimeRegs,
    date: DateRegs,
    alarm: AlarmRegs,
    alarm_match: AlarmMatch,
    /// Alarm fields modified since the last `enable_alarm`
    alarm_pending: bool,
}

impl<D: RtcDriver> Rtc<D> {
    /// Wraps `driver`. Nothing is touched until [`begin`](Self::begin).
    pub fn new(driver: D, config: RtcConfig) -> Self {
        Self {
            driver,
            config,
            time_set: false,
            time: TimeRegs::default(),
            date: DateRegs::default(),
            alarm: AlarmRegs::default(),
            alarm_match: AlarmMatch::Off,
            alarm_pending: false,
        }
    }

    /// Enables the RTC.
    ///
    /// With `reset_time` the calendar is reinitialized even if it survived in
    /// the backup domain.
    pub fn begin(&mut self, reset_time: bool) -> Result<(), Error<D::Error>> {
        if reset_time {
            self.time_set = false;
        }

        if let Some(prediv) = self.config.prediv {
            self.driver.set_prediv(Some(prediv)).map_err(Error::Driver)?;
        }

        let reinit = self
            .driver
            .init(self.config.hour_format, self.config.clock_source, reset_time)
            .map_err(Error::Driver)?;

        if reinit {
            log::debug!("rtc: calendar initialized ({:?})", self.config.clock_source);
            self.time_set = false;
            self.sync_time()?;
            self.sync_date()?;

            // Start from the current time
            self.alarm = AlarmRegs {
                day: self.date.day,
                hours: self.time.hours,
                minutes: self.time.minutes,
                seconds: self.time.seconds,
                sub_seconds: self.time.sub_seconds,
                period: self.time.period,
                mask: self.alarm_match.mask(),
            };
        } else {
            log::debug!("rtc: calendar kept from backup domain");
            self.time_set = true;
        }

        Ok(())
    }

    /// Stops the RTC
    pub fn end(&mut self) -> Result<(), Error<D::Error>> {
        self.driver.deinit().map_err(Error::Driver)?;
        self.time_set = false;
        Ok(())
    }

    /// Whether the calendar holds a time written by the application
    pub fn is_time_set(&self) -> bool {
        self.time_set
    }

    pub fn hour_format(&self) -> HourFormat {
        self.config.hour_format
    }

    pub fn clock_source(&self) -> ClockSource {
        self.config.clock_source
    }

    /// Selects the clock source. Must be called before [`begin`](Self::begin).
    pub fn set_clock_source(&mut self, source: ClockSource) -> Result<(), Error<D::Error>> {
        self.config.clock_source = source;
        self.driver.set_clock_source(source).map_err(Error::Driver)
    }

    pub fn prediv(&mut self) -> Result<Prediv, Error<D::Error>> {
        self.driver.prediv().map_err(Error::Driver)
    }

    /// Sets the prescalers, `None` for automatic. Must be called before
    /// [`begin`](Self::begin).
    pub fn set_prediv(&mut self, prediv: Option<Prediv>) -> Result<(), Error<D::Error>> {
        self.config.prediv = prediv;
        self.driver.set_prediv(prediv).map_err(Error::Driver)
    }

    /// Moves the RTC to `source` so that it keeps running in low power modes.
    ///
    /// Time, date and alarm are carried over the switch. If the time was
    /// never set, it is set to 12:00:00.
    pub fn config_for_low_power(&mut self, source: ClockSource) -> Result<(), Error<D::Error>> {
        self.begin(false)?;

        if self.config.clock_source != source {
            self.sync_alarm()?;
            let alarm = self.alarm;
            let alarm_match = self.alarm_match;
            let armed = self.driver.is_alarm_set().map_err(Error::Driver)?;
            let time = self.time()?;
            let date = self.date()?;

            log::debug!(
                "rtc: switching clock {:?} -> {:?}",
                self.config.clock_source,
                source
            );
            self.end()?;
            self.set_clock_source(source)?;
            self.begin(false)?;

            self.time = time;
            self.write_time()?;
            self.date = date;
            self.write_date()?;
            self.alarm = alarm;
            self.alarm_pending = true;
            if armed {
                self.enable_alarm(alarm_match)?;
            }
        }

        if !self.time_set {
            self.set_time(12, 0, 0, MillisDurationU32::from_ticks(0), Period::AM)?;
        }

        Ok(())
    }

    /// Releases the driver
    pub fn free(self) -> D {
        self.driver
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Direct access to the driver. Changes made through it bypass the
    /// cached fields.
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    //
    // Alarm control
    //

    /// Programs the cached alarm fields and arms the alarm, or disarms it for
    /// [`AlarmMatch::Off`].
    pub fn enable_alarm(&mut self, matching: AlarmMatch) -> Result<(), Error<D::Error>> {
        self.alarm_match = matching;
        self.alarm.mask = matching.mask();

        if matching.is_enabled() {
            self.driver.start_alarm(&self.alarm).map_err(Error::Driver)?;
        } else {
            self.driver.stop_alarm().map_err(Error::Driver)?;
        }

        // Edits stay pending until the hardware accepted them
        self.alarm_pending = false;
        Ok(())
    }

    pub fn disable_alarm(&mut self) -> Result<(), Error<D::Error>> {
        self.alarm_match = AlarmMatch::Off;
        self.driver.stop_alarm().map_err(Error::Driver)
    }

    pub fn is_alarm_enabled(&mut self) -> Result<bool, Error<D::Error>> {
        self.driver.is_alarm_set().map_err(Error::Driver)
    }

    /// Calls `callback` from the alarm interrupt
    pub fn attach_interrupt(&mut self, callback: Callback) {
        self.driver.attach_alarm_callback(callback);
    }

    pub fn detach_interrupt(&mut self) {
        self.driver.detach_alarm_callback();
    }

    /// Calls `callback` every second, on devices with a dedicated interrupt
    pub fn attach_seconds_interrupt(&mut self, callback: Callback) -> Result<(), Error<D::Error>> {
        if !self.driver.has_seconds_interrupt() {
            return Err(Error::Unsupported);
        }
        self.driver.attach_seconds_callback(callback);
        Ok(())
    }

    pub fn detach_seconds_interrupt(&mut self) -> Result<(), Error<D::Error>> {
        if !self.driver.has_seconds_interrupt() {
            return Err(Error::Unsupported);
        }
        self.driver.detach_seconds_callback();
        Ok(())
    }

    //
    // Time and date getters
    //

    pub fn sub_seconds(&mut self) -> Result<MillisDurationU32, Error<D::Error>> {
        self.sync_time()?;
        Ok(MillisDurationU32::from_ticks(self.time.sub_seconds))
    }

    pub fn seconds(&mut self) -> Result<u8, Error<D::Error>> {
        self.sync_time()?;
        Ok(self.time.seconds)
    }

    pub fn minutes(&mut self) -> Result<u8, Error<D::Error>> {
        self.sync_time()?;
        Ok(self.time.minutes)
    }

    /// Hours and, in 12 hour format, the period
    pub fn hours(&mut self) -> Result<(u8, Period), Error<D::Error>> {
        self.sync_time()?;
        Ok((self.time.hours, self.time.period))
    }

    pub fn time(&mut self) -> Result<TimeRegs, Error<D::Error>> {
        self.sync_time()?;
        Ok(self.time)
    }

    /// Day of the week, 1 (Monday) to 7 (Sunday)
    pub fn weekday(&mut self) -> Result<u8, Error<D::Error>> {
        self.sync_date()?;
        Ok(self.date.weekday)
    }

    pub fn day(&mut self) -> Result<u8, Error<D::Error>> {
        self.sync_date()?;
        Ok(self.date.day)
    }

    pub fn month(&mut self) -> Result<u8, Error<D::Error>> {
        self.sync_date()?;
        Ok(self.date.month)
    }

    /// Years since 2000
    pub fn year(&mut self) -> Result<u8, Error<D::Error>> {
        self.sync_date()?;
        Ok(self.date.year)
    }

    pub fn date(&mut self) -> Result<DateRegs, Error<D::Error>> {
        self.sync_date()?;
        Ok(self.date)
    }

    //
    // Alarm getters
    //

    pub fn alarm_sub_seconds(&mut self) -> Result<MillisDurationU32, Error<D::Error>> {
        self.sync_alarm()?;
        Ok(MillisDurationU32::from_ticks(self.alarm.sub_seconds))
    }

    pub fn alarm_seconds(&mut self) -> Result<u8, Error<D::Error>> {
        self.sync_alarm()?;
        Ok(self.alarm.seconds)
    }

    pub fn alarm_minutes(&mut self) -> Result<u8, Error<D::Error>> {
        self.sync_alarm()?;
        Ok(self.alarm.minutes)
    }

    pub fn alarm_hours(&mut self) -> Result<(u8, Period), Error<D::Error>> {
        self.sync_alarm()?;
        Ok((self.alarm.hours, self.alarm.period))
    }

    pub fn alarm_day(&mut self) -> Result<u8, Error<D::Error>> {
        self.sync_alarm()?;
        Ok(self.alarm.day)
    }

    pub fn alarm_match(&mut self) -> Result<AlarmMatch, Error<D::Error>> {
        self.sync_alarm()?;
        Ok(self.alarm_match)
    }

    pub fn alarm(&mut self) -> Result<AlarmRegs, Error<D::Error>> {
        self.sync_alarm()?;
        Ok(self.alarm)
    }

    //
    // Time and date setters
    //

    /// Sets the sub-seconds, 0-999 ms
    pub fn set_sub_seconds(
        &mut self,
        sub_seconds: MillisDurationU32,
    ) -> Result<(), Error<D::Error>> {
        self.sync_time()?;
        self.time.sub_seconds = checked_sub_seconds(sub_seconds, self.time.sub_seconds);
        self.write_time()
    }

    /// Sets the seconds, 0-59
    pub fn set_seconds(&mut self, seconds: u8) -> Result<(), Error<D::Error>> {
        self.sync_time()?;
        self.time.seconds = checked("seconds", seconds, 0..=59, self.time.seconds);
        self.write_time()
    }

    /// Sets the minutes, 0-59
    pub fn set_minutes(&mut self, minutes: u8) -> Result<(), Error<D::Error>> {
        self.sync_time()?;
        self.time.minutes = checked("minutes", minutes, 0..=59, self.time.minutes);
        self.write_time()
    }

    /// Sets the hours, 0-23 or 1-12. `period` only matters in 12 hour format.
    pub fn set_hours(&mut self, hours: u8, period: Period) -> Result<(), Error<D::Error>> {
        self.sync_time()?;
        let (hours, period) = checked_hours(
            self.config.hour_format,
            hours,
            period,
            (self.time.hours, self.time.period),
        );
        self.time.hours = hours;
        self.time.period = period;
        self.write_time()
    }

    pub fn set_time(
        &mut self,
        hours: u8,
        minutes: u8,
        seconds: u8,
        sub_seconds: MillisDurationU32,
        period: Period,
    ) -> Result<(), Error<D::Error>> {
        self.sync_time()?;
        self.time.sub_seconds = checked_sub_seconds(sub_seconds, self.time.sub_seconds);
        self.time.seconds = checked("seconds", seconds, 0..=59, self.time.seconds);
        self.time.minutes = checked("minutes", minutes, 0..=59, self.time.minutes);
        let (hours, period) = checked_hours(
            self.config.hour_format,
            hours,
            period,
            (self.time.hours, self.time.period),
        );
        self.time.hours = hours;
        self.time.period = period;
        self.write_time()
    }

    /// Sets the day of the week, 1 (Monday) to 7 (Sunday)
    pub fn set_weekday(&mut self, weekday: u8) -> Result<(), Error<D::Error>> {
        self.sync_date()?;
        self.date.weekday = checked("weekday", weekday, 1..=7, self.date.weekday);
        self.write_date()
    }

    /// Sets the day of the month, 1-31
    pub fn set_day(&mut self, day: u8) -> Result<(), Error<D::Error>> {
        self.sync_date()?;
        self.date.day = checked("day", day, 1..=31, self.date.day);
        self.write_date()
    }

    /// Sets the month, 1-12
    pub fn set_month(&mut self, month: u8) -> Result<(), Error<D::Error>> {
        self.sync_date()?;
        self.date.month = checked("month", month, 1..=12, self.date.month);
        self.write_date()
    }

    /// Sets the year, 0-99 counted from 2000
    pub fn set_year(&mut self, year: u8) -> Result<(), Error<D::Error>> {
        self.sync_date()?;
        self.date.year = checked("year", year, 0..=99, self.date.year);
        self.write_date()
    }

    /// Sets day, month and year. The day of the week is left alone.
    pub fn set_date(&mut self, day: u8, month: u8, year: u8) -> Result<(), Error<D::Error>> {
        self.sync_date()?;
        self.date.day = checked("day", day, 1..=31, self.date.day);
        self.date.month = checked("month", month, 1..=12, self.date.month);
        self.date.year = checked("year", year, 0..=99, self.date.year);
        self.write_date()
    }

    pub fn set_weekday_date(
        &mut self,
        weekday: u8,
        day: u8,
        month: u8,
        year: u8,
    ) -> Result<(), Error<D::Error>> {
        self.sync_date()?;
        self.date.weekday = checked("weekday", weekday, 1..=7, self.date.weekday);
        self.date.day = checked("day", day, 1..=31, self.date.day);
        self.date.month = checked("month", month, 1..=12, self.date.month);
        self.date.year = checked("year", year, 0..=99, self.date.year);
        self.write_date()
    }

    //
    // Alarm setters, applied by `enable_alarm`
    //

    pub fn set_alarm_sub_seconds(&mut self, sub_seconds: MillisDurationU32) {
        self.alarm.sub_seconds = checked_sub_seconds(sub_seconds, self.alarm.sub_seconds);
        self.alarm_pending = true;
    }

    pub fn set_alarm_seconds(&mut self, seconds: u8) {
        self.alarm.seconds = checked("alarm seconds", seconds, 0..=59, self.alarm.seconds);
        self.alarm_pending = true;
    }

    pub fn set_alarm_minutes(&mut self, minutes: u8) {
        self.alarm.minutes = checked("alarm minutes", minutes, 0..=59, self.alarm.minutes);
        self.alarm_pending = true;
    }

    pub fn set_alarm_hours(&mut self, hours: u8, period: Period) {
        let (hours, period) = checked_hours(
            self.config.hour_format,
            hours,
            period,
            (self.alarm.hours, self.alarm.period),
        );
        self.alarm.hours = hours;
        self.alarm.period = period;
        self.alarm_pending = true;
    }

    pub fn set_alarm_time(
        &mut self,
        hours: u8,
        minutes: u8,
        seconds: u8,
        sub_seconds: MillisDurationU32,
        period: Period,
    ) {
        self.set_alarm_hours(hours, period);
        self.set_alarm_minutes(minutes);
        self.set_alarm_seconds(seconds);
        self.set_alarm_sub_seconds(sub_seconds);
    }

    /// Sets the alarm day of the month, 1-31
    pub fn set_alarm_day(&mut self, day: u8) {
        self.alarm.day = checked("alarm day", day, 1..=31, self.alarm.day);
        self.alarm_pending = true;
    }

    //
    // Epoch conversions
    //

    /// Current calendar as a date time
    pub fn datetime(&mut self) -> Result<PrimitiveDateTime, Error<D::Error>> {
        self.sync_date()?;
        self.sync_time()?;
        epoch::to_datetime(&self.date, &self.time, self.config.hour_format)
            .ok_or(Error::InvalidInputData)
    }

    /// Sets date, day of the week and time.
    ///
    /// Only years 2000 to 2099 can be stored.
    pub fn set_datetime(&mut self, datetime: &PrimitiveDateTime) -> Result<(), Error<D::Error>> {
        let (date, time) = epoch::from_datetime(datetime, self.config.hour_format)
            .ok_or(Error::InvalidInputData)?;
        self.date = date;
        self.time = time;
        self.write_date()?;
        self.write_time()
    }

    /// Seconds since 1970-01-01T00:00:00, the calendar being UTC
    pub fn epoch(&mut self) -> Result<u32, Error<D::Error>> {
        let datetime = self.datetime()?;
        epoch::to_unix(&datetime).ok_or(Error::InvalidInputData)
    }

    /// [`epoch`](Self::epoch) along with the sub-seconds
    pub fn epoch_with_sub_seconds(
        &mut self,
    ) -> Result<(u32, MillisDurationU32), Error<D::Error>> {
        let secs = self.epoch()?;
        Ok((secs, MillisDurationU32::from_ticks(self.time.sub_seconds)))
    }

    /// Seconds since 2000-01-01T00:00:00
    pub fn y2k_epoch(&mut self) -> Result<u32, Error<D::Error>> {
        let secs = self.epoch()?;
        secs.checked_sub(epoch::Y2K_OFFSET)
            .ok_or(Error::InvalidInputData)
    }

    /// Sets the calendar from a Unix timestamp. Timestamps before 2000 are
    /// raised to 2000-01-01T00:00:00.
    pub fn set_epoch(
        &mut self,
        ts: u32,
        sub_seconds: MillisDurationU32,
    ) -> Result<(), Error<D::Error>> {
        let datetime =
            epoch::from_unix(epoch::clamp_to_y2k(ts)).ok_or(Error::InvalidInputData)?;
        let (date, mut time) = epoch::from_datetime(&datetime, self.config.hour_format)
            .ok_or(Error::InvalidInputData)?;
        time.sub_seconds = checked_sub_seconds(sub_seconds, 0);

        self.date = date;
        self.time = time;
        self.write_date()?;
        self.write_time()
    }

    /// Sets the calendar from seconds since 2000-01-01T00:00:00
    pub fn set_y2k_epoch(&mut self, ts: u32) -> Result<(), Error<D::Error>> {
        let ts = ts
            .checked_add(epoch::Y2K_OFFSET)
            .ok_or(Error::InvalidInputData)?;
        self.set_epoch(ts, MillisDurationU32::from_ticks(0))
    }

    /// Loads the alarm from a Unix timestamp and arms it with `matching`.
    /// Month and year of the timestamp are not used.
    pub fn set_alarm_epoch(
        &mut self,
        ts: u32,
        matching: AlarmMatch,
        sub_seconds: MillisDurationU32,
    ) -> Result<(), Error<D::Error>> {
        let datetime =
            epoch::from_unix(epoch::clamp_to_y2k(ts)).ok_or(Error::InvalidInputData)?;
        let (hours, period) = epoch::from_24h(datetime.hour(), self.config.hour_format);

        self.set_alarm_day(datetime.day());
        self.set_alarm_hours(hours, period);
        self.set_alarm_minutes(datetime.minute());
        self.set_alarm_seconds(datetime.second());
        self.set_alarm_sub_seconds(sub_seconds);
        self.enable_alarm(matching)
    }

    //
    // Hardware synchronization
    //

    fn sync_time(&mut self) -> Result<(), Error<D::Error>> {
        self.time = self.driver.time().map_err(Error::Driver)?;
        Ok(())
    }

    fn sync_date(&mut self) -> Result<(), Error<D::Error>> {
        self.date = self.driver.date().map_err(Error::Driver)?;
        Ok(())
    }

    /// Pending alarm edits are never overwritten by the hardware copy
    fn sync_alarm(&mut self) -> Result<(), Error<D::Error>> {
        if self.alarm_pending {
            return Ok(());
        }

        let alarm = self.driver.alarm().map_err(Error::Driver)?;
        let armed = self.driver.is_alarm_set().map_err(Error::Driver)?;

        // A disarmed alarm may keep its mask bits
        self.alarm_match = if armed {
            AlarmMatch::from_mask(alarm.mask).unwrap_or_else(|| {
                log::warn!("rtc: unknown alarm mask {:#x}", alarm.mask.bits());
                AlarmMatch::Off
            })
        } else {
            AlarmMatch::Off
        };
        self.alarm = alarm;
        Ok(())
    }

    fn write_time(&mut self) -> Result<(), Error<D::Error>> {
        self.driver.set_time(&self.time).map_err(Error::Driver)?;
        self.time_set = true;
        Ok(())
    }

    fn write_date(&mut self) -> Result<(), Error<D::Error>> {
        self.driver.set_date(&self.date).map_err(Error::Driver)?;
        self.time_set = true;
        Ok(())
    }
}

/// `value` if it lies in `range`, `current` otherwise
fn checked(field: &str, value: u8, range: core::ops::RangeInclusive<u8>, current: u8) -> u8 {
    if range.contains(&value) {
        value
    } else {
        log::warn!("rtc: {} {} out of range, ignored", field, value);
        current
    }
}

fn checked_sub_seconds(value: MillisDurationU32, current: u32) -> u32 {
    let millis = value.ticks();
    if millis < 1000 {
        millis
    } else {
        log::warn!("rtc: sub-seconds {} ms out of range, ignored", millis);
        current
    }
}

fn checked_hours(
    format: HourFormat,
    hours: u8,
    period: Period,
    current: (u8, Period),
) -> (u8, Period) {
    match format {
        HourFormat::H24 => (checked("hours", hours, 0..=23, current.0), Period::AM),
        HourFormat::H12 => {
            if (1..=12).contains(&hours) {
                (hours, period)
            } else {
                log::warn!("rtc: hours {} out of range, ignored", hours);
                current
            }
        }
    }
}
