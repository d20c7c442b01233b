pub use fugit::ExtU32 as _;

pub use crate::alarm::AlarmMatch;
pub use crate::driver::{ClockSource, HourFormat, Period, RtcDriver as _stm32_rtc_RtcDriver};
pub use crate::rtc::{Rtc, RtcConfig};
