// Simulrs Timer Layer
// Per-slot one-shot timers that emit a source key's deferred press

mod manual;
mod service;

pub use manual::ManualTimers;
pub use service::TimerService;

use std::sync::Arc;

use crate::chord::SlotIndex;
use crate::input::EventIoError;

/// Called from a timer context when its emission fails. The main loop cannot
/// see these errors, so the handler decides how the process goes down.
pub type FaultHandler = Arc<dyn Fn(EventIoError) + Send + Sync>;

/// Errors that can occur while setting up timers
#[derive(Debug, thiserror::Error)]
pub enum TimerError {
    #[error("Failed to spawn timer thread: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Arm/disarm/query contract the chord engine drives.
///
/// Every query reflects whether the timer has already fired; nothing here is
/// a cached flag.
pub trait ChordTimers {
    /// Start (or restart) the threshold window for `slot`. Returns true when
    /// the slot was not already pending, i.e. this arming begins a new window
    /// rather than extending one.
    fn arm(&self, slot: SlotIndex) -> bool;

    /// Cancel a pending emission. Returns true only if one was pending, in
    /// which case the caller now owns emitting the deferred press.
    fn disarm(&self, slot: SlotIndex) -> bool;

    fn is_armed(&self, slot: SlotIndex) -> bool;

    /// Disarm every slot in `slots` if and only if all of them are armed.
    fn disarm_if_all_armed(&self, slots: &[SlotIndex]) -> bool {
        if !slots.iter().all(|s| self.is_armed(*s)) {
            return false;
        }
        for slot in slots {
            self.disarm(*slot);
        }
        true
    }
}

impl<T: ChordTimers + ?Sized> ChordTimers for Arc<T> {
    fn arm(&self, slot: SlotIndex) -> bool {
        (**self).arm(slot)
    }

    fn disarm(&self, slot: SlotIndex) -> bool {
        (**self).disarm(slot)
    }

    fn is_armed(&self, slot: SlotIndex) -> bool {
        (**self).is_armed(slot)
    }

    fn disarm_if_all_armed(&self, slots: &[SlotIndex]) -> bool {
        (**self).disarm_if_all_armed(slots)
    }
}
