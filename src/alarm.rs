//! Alarm match policies

use bitflags::bitflags;

bitflags! {
    /// Calendar fields the hardware compares to fire the alarm
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MatchMask: u8 {
        const SECONDS = 1 << 0;
        const MINUTES = 1 << 1;
        const HOURS = 1 << 2;
        const DAY = 1 << 3;
        /// Not supported by the STM32 alarm units, drivers ignore it
        const MONTH = 1 << 4;
        /// Not supported by the STM32 alarm units, drivers ignore it
        const YEAR = 1 << 5;
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for MatchMask {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "MatchMask({=u8:#x})", self.bits());
    }
}

/// Which fields must match for the alarm to fire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmMatch {
    /// Alarm disabled
    #[default]
    Off,
    /// Every minute, when seconds match
    Ss,
    /// Every hour, when minutes and seconds match
    MmSs,
    /// Every day
    HhMmSs,
    /// Every month, on the alarm day of month
    DHhMmSs,
    /// Month is not compared by the hardware, behaves as [`AlarmMatch::DHhMmSs`]
    MmDdHhMmSs,
    /// Month and year are not compared by the hardware, behaves as [`AlarmMatch::DHhMmSs`]
    YyMmDdHhMmSs,
}

impl AlarmMatch {
    /// Fields compared under this policy
    pub const fn mask(self) -> MatchMask {
        let bits = match self {
            AlarmMatch::Off => 0x00,
            AlarmMatch::Ss => 0x01,
            AlarmMatch::MmSs => 0x03,
            AlarmMatch::HhMmSs => 0x07,
            AlarmMatch::DHhMmSs => 0x0F,
            AlarmMatch::MmDdHhMmSs => 0x1F,
            AlarmMatch::YyMmDdHhMmSs => 0x3F,
        };
        MatchMask::from_bits_truncate(bits)
    }

    /// Policy described by `mask`, if it is one of the supported ones
    pub fn from_mask(mask: MatchMask) -> Option<Self> {
        const ALL: [AlarmMatch; 7] = [
            AlarmMatch::Off,
            AlarmMatch::Ss,
            AlarmMatch::MmSs,
            AlarmMatch::HhMmSs,
            AlarmMatch::DHhMmSs,
            AlarmMatch::MmDdHhMmSs,
            AlarmMatch::YyMmDdHhMmSs,
        ];

        ALL.iter().copied().find(|m| m.mask() == mask)
    }

    pub fn is_enabled(self) -> bool {
        self != AlarmMatch::Off
    }
}

impl From<AlarmMatch> for MatchMask {
    fn from(m: AlarmMatch) -> Self {
        m.mask()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_nest() {
        assert!(!AlarmMatch::Ss.mask().is_empty());
        assert!(AlarmMatch::MmSs.mask().contains(AlarmMatch::Ss.mask()));
        assert!(AlarmMatch::HhMmSs.mask().contains(AlarmMatch::MmSs.mask()));
        assert!(AlarmMatch::DHhMmSs.mask().contains(MatchMask::DAY));
        assert!(!AlarmMatch::DHhMmSs.mask().contains(MatchMask::MONTH));
        assert_eq!(AlarmMatch::YyMmDdHhMmSs.mask(), MatchMask::all());
        assert!(AlarmMatch::Off.mask().is_empty());
    }

    #[test]
    fn mask_lookup() {
        assert_eq!(
            AlarmMatch::from_mask(MatchMask::SECONDS | MatchMask::MINUTES),
            Some(AlarmMatch::MmSs)
        );
        assert_eq!(AlarmMatch::from_mask(MatchMask::empty()), Some(AlarmMatch::Off));
        // hours without minutes is not a policy
        assert_eq!(
            AlarmMatch::from_mask(MatchMask::SECONDS | MatchMask::HOURS),
            None
        );
    }

    #[test]
    fn enabled() {
        assert!(!AlarmMatch::Off.is_enabled());
        assert!(AlarmMatch::HhMmSs.is_enabled());
        assert_eq!(AlarmMatch::default(), AlarmMatch::Off);
    }
}
