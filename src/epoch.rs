//! Calendar and epoch arithmetic
//!
//! The calendar stores two-digit years counted from 2000, so every instant
//! handled here lies between 2000-01-01T00:00:00 and 2099-12-31T23:59:59 UTC.

use time::{Date, Month, OffsetDateTime, PrimitiveDateTime, Time};

use crate::driver::{DateRegs, HourFormat, Period, TimeRegs};

/// 2000-01-01T00:00:00 UTC as a Unix timestamp
pub const Y2K_OFFSET: u32 = 946_684_800;

/// Year represented by a stored year of 0
pub const BASE_YEAR: i32 = 2000;

/// Converts calendar hours to 0-23
pub fn to_24h(hours: u8, period: Period, format: HourFormat) -> u8 {
    match format {
        HourFormat::H24 => hours,
        HourFormat::H12 => match period {
            Period::AM => hours % 12,
            Period::PM => hours % 12 + 12,
        },
    }
}

/// Converts 0-23 hours to the calendar representation for `format`
pub fn from_24h(hours: u8, format: HourFormat) -> (u8, Period) {
    match format {
        HourFormat::H24 => (hours, Period::AM),
        HourFormat::H12 => {
            let period = if hours >= 12 { Period::PM } else { Period::AM };
            match hours % 12 {
                0 => (12, period),
                h => (h, period),
            }
        }
    }
}

/// Raises timestamps before 2000 to [`Y2K_OFFSET`]
pub fn clamp_to_y2k(ts: u32) -> u32 {
    if ts < Y2K_OFFSET {
        log::warn!("rtc: timestamp {} predates 2000, clamped", ts);
    }
    ts.max(Y2K_OFFSET)
}

/// Builds a date time from register snapshots.
///
/// Returns `None` if the fields do not form a valid calendar date.
pub fn to_datetime(
    date: &DateRegs,
    time: &TimeRegs,
    format: HourFormat,
) -> Option<PrimitiveDateTime> {
    let month = Month::try_from(date.month).ok()?;
    let date = Date::from_calendar_date(BASE_YEAR + i32::from(date.year), month, date.day).ok()?;

    let millis = u16::try_from(time.sub_seconds).ok()?;
    let time = Time::from_hms_milli(
        to_24h(time.hours, time.period, format),
        time.minutes,
        time.seconds,
        millis,
    )
    .ok()?;

    Some(PrimitiveDateTime::new(date, time))
}

/// Splits a date time into register snapshots.
///
/// Returns `None` outside of 2000..=2099.
pub fn from_datetime(dt: &PrimitiveDateTime, format: HourFormat) -> Option<(DateRegs, TimeRegs)> {
    let year = u8::try_from(dt.year() - BASE_YEAR).ok().filter(|y| *y < 100)?;

    let date = DateRegs {
        year,
        month: u8::from(dt.month()),
        day: dt.day(),
        weekday: dt.weekday().number_from_monday(),
    };

    let (hours, period) = from_24h(dt.hour(), format);
    let time = TimeRegs {
        hours,
        minutes: dt.minute(),
        seconds: dt.second(),
        sub_seconds: u32::from(dt.millisecond()),
        period,
    };

    Some((date, time))
}

/// Seconds since the Unix epoch, the date time being taken as UTC
pub fn to_unix(dt: &PrimitiveDateTime) -> Option<u32> {
    u32::try_from(dt.assume_utc().unix_timestamp()).ok()
}

/// UTC calendar of a Unix timestamp
pub fn from_unix(ts: u32) -> Option<PrimitiveDateTime> {
    let utc = OffsetDateTime::from_unix_timestamp(i64::from(ts)).ok()?;
    Some(PrimitiveDateTime::new(utc.date(), utc.time()))
}
