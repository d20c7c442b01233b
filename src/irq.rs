//! Callback storage shared with interrupt handlers
//!
//! A driver keeps one slot per interrupt line in a `static`, fills it from
//! [`RtcDriver::attach_alarm_callback`](crate::driver::RtcDriver::attach_alarm_callback)
//! and calls [`CallbackSlot::fire`] from the interrupt handler:
//!
//! ```ignore
//! static ALARM: CallbackSlot = CallbackSlot::new();
//!
//! #[interrupt]
//! fn RTC_ALARM() {
//!     // clear ALRAF and the EXTI line first
//!     ALARM.fire();
//! }
//! ```

use core::cell::Cell;

use critical_section::Mutex;

use crate::driver::Callback;

pub struct CallbackSlot {
    callback: Mutex<Cell<Option<Callback>>>,
}

impl CallbackSlot {
    pub const fn new() -> Self {
        Self {
            callback: Mutex::new(Cell::new(None)),
        }
    }

    pub fn set(&self, callback: Callback) {
        critical_section::with(|cs| self.callback.borrow(cs).set(Some(callback)));
    }

    pub fn clear(&self) {
        critical_section::with(|cs| self.callback.borrow(cs).set(None));
    }

    pub fn is_set(&self) -> bool {
        critical_section::with(|cs| self.callback.borrow(cs).get().is_some())
    }

    /// Runs the stored callback, outside of the critical section.
    ///
    /// Returns `false` if the slot is empty.
    pub fn fire(&self) -> bool {
        let callback = critical_section::with(|cs| self.callback.borrow(cs).get());
        match callback {
            Some(f) => {
                f();
                true
            }
            None => false,
        }
    }
}

impl Default for CallbackSlot {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicU32, Ordering};

    static HITS: AtomicU32 = AtomicU32::new(0);

    fn bump() {
        HITS.fetch_add(1, Ordering::SeqCst);
    }

    #[test]
    fn fire_runs_stored_callback() {
        static SLOT: CallbackSlot = CallbackSlot::new();

        assert!(!SLOT.fire());
        SLOT.set(bump);
        assert!(SLOT.is_set());

        let before = HITS.load(Ordering::SeqCst);
        assert!(SLOT.fire());
        assert!(SLOT.fire());
        assert_eq!(HITS.load(Ordering::SeqCst), before + 2);

        SLOT.clear();
        assert!(!SLOT.is_set());
        assert!(!SLOT.fire());
    }
}
