//! In-memory driver used by the unit tests

use crate::alarm::MatchMask;
use crate::driver::{
    AlarmRegs, Callback, ClockSource, DateRegs, HourFormat, Prediv, RtcDriver, TimeRegs,
};
use crate::irq::CallbackSlot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError;

pub struct MockDriver {
    /// Calendar survives `init` unless this is cleared or a reset is requested
    pub backup_valid: bool,
    pub enabled: bool,
    pub format: HourFormat,
    pub source: ClockSource,
    pub prediv: Option<Prediv>,
    pub time: TimeRegs,
    pub date: DateRegs,
    pub alarm: AlarmRegs,
    pub alarm_armed: bool,
    pub seconds_irq: bool,
    pub fail: bool,
    pub inits: u32,
    pub time_writes: u32,
    pub date_writes: u32,
    pub alarm_slot: CallbackSlot,
    pub seconds_slot: CallbackSlot,
}

impl MockDriver {
    pub fn new() -> Self {
        Self {
            backup_valid: false,
            enabled: false,
            format: HourFormat::H24,
            source: ClockSource::Lsi,
            prediv: None,
            time: TimeRegs::default(),
            date: DateRegs::default(),
            alarm: AlarmRegs::default(),
            alarm_armed: false,
            seconds_irq: false,
            fail: false,
            inits: 0,
            time_writes: 0,
            date_writes: 0,
            alarm_slot: CallbackSlot::new(),
            seconds_slot: CallbackSlot::new(),
        }
    }

    fn check(&self) -> Result<(), MockError> {
        if self.fail {
            Err(MockError)
        } else {
            Ok(())
        }
    }
}

impl Default for MockDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl RtcDriver for MockDriver {
    type Error = MockError;

    fn init(
        &mut self,
        format: HourFormat,
        source: ClockSource,
        reset: bool,
    ) -> Result<bool, Self::Error> {
        self.check()?;
        self.inits += 1;
        self.enabled = true;
        self.format = format;
        self.source = source;

        if reset || !self.backup_valid {
            self.time = TimeRegs::default();
            self.date = DateRegs::default();
            if format == HourFormat::H12 {
                self.time.hours = 12;
            }
            self.alarm = AlarmRegs::default();
            self.alarm_armed = false;
            self.backup_valid = true;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn deinit(&mut self) -> Result<(), Self::Error> {
        self.check()?;
        self.enabled = false;
        self.backup_valid = false;
        Ok(())
    }

    fn set_clock_source(&mut self, source: ClockSource) -> Result<(), Self::Error> {
        self.check()?;
        self.source = source;
        Ok(())
    }

    fn prediv(&mut self) -> Result<Prediv, Self::Error> {
        self.check()?;
        Ok(self.prediv.unwrap_or(match self.source {
            ClockSource::Lse => Prediv {
                asynch: 127,
                synch: 255,
            },
            ClockSource::Lsi | ClockSource::Hse => Prediv {
                asynch: 127,
                synch: 249,
            },
        }))
    }

    fn set_prediv(&mut self, prediv: Option<Prediv>) -> Result<(), Self::Error> {
        self.check()?;
        self.prediv = prediv;
        Ok(())
    }

    fn time(&mut self) -> Result<TimeRegs, Self::Error> {
        self.check()?;
        Ok(self.time)
    }

    fn set_time(&mut self, time: &TimeRegs) -> Result<(), Self::Error> {
        self.check()?;
        self.time = *time;
        self.time_writes += 1;
        Ok(())
    }

    fn date(&mut self) -> Result<DateRegs, Self::Error> {
        self.check()?;
        Ok(self.date)
    }

    fn set_date(&mut self, date: &DateRegs) -> Result<(), Self::Error> {
        self.check()?;
        self.date = *date;
        self.date_writes += 1;
        Ok(())
    }

    fn start_alarm(&mut self, alarm: &AlarmRegs) -> Result<(), Self::Error> {
        self.check()?;
        self.alarm = *alarm;
        self.alarm_armed = true;
        Ok(())
    }

    fn stop_alarm(&mut self) -> Result<(), Self::Error> {
        self.check()?;
        self.alarm.mask = MatchMask::empty();
        self.alarm_armed = false;
        Ok(())
    }

    fn alarm(&mut self) -> Result<AlarmRegs, Self::Error> {
        self.check()?;
        Ok(self.alarm)
    }

    fn is_alarm_set(&mut self) -> Result<bool, Self::Error> {
        self.check()?;
        Ok(self.alarm_armed)
    }

    fn attach_alarm_callback(&mut self, callback: Callback) {
        self.alarm_slot.set(callback);
    }

    fn detach_alarm_callback(&mut self) {
        self.alarm_slot.clear();
    }

    fn has_seconds_interrupt(&self) -> bool {
        self.seconds_irq
    }

    fn attach_seconds_callback(&mut self, callback: Callback) {
        self.seconds_slot.set(callback);
    }

    fn detach_seconds_callback(&mut self) {
        self.seconds_slot.clear();
    }
}
