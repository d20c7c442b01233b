//! Real time clock abstraction for the STM32 family of microcontrollers
//!
//! [`Rtc`](rtc::Rtc) exposes the calendar, time and alarm of the RTC
//! peripheral as plain fields, along with Unix and Y2K epoch conversions.
//! The hardware itself is reached through an [`RtcDriver`](driver::RtcDriver)
//! implementation supplied by the HAL of the target device.

#![cfg_attr(not(test), no_std)]

pub mod alarm;

pub mod driver;

pub mod epoch;

pub mod irq;

pub mod prelude;

pub mod rtc;

#[cfg(test)]
mod mock;

pub use crate::alarm::{AlarmMatch, MatchMask};
pub use crate::driver::{ClockSource, HourFormat, Period, RtcDriver};
pub use crate::rtc::{Error, Rtc, RtcConfig};
