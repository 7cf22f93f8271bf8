// Simulrs Manual Timers
// Deterministic timers for driving the chord engine step by step

use std::sync::Arc;

use parking_lot::Mutex;

use super::ChordTimers;
use crate::chord::SlotIndex;
use crate::input::{EventIoError, RawInputEvent};
use crate::output::EventSink;
use crate::Key;

/// Timers that only fire when told to.
///
/// `expire` plays the part of the threshold elapsing: it emits the slot's
/// deferred press through the sink exactly as `TimerService` would.
pub struct ManualTimers {
    armed: Mutex<Vec<bool>>,
    templates: Vec<RawInputEvent>,
    sink: Arc<dyn EventSink>,
}

impl ManualTimers {
    pub fn new(templates: Vec<RawInputEvent>, sink: Arc<dyn EventSink>) -> Self {
        Self {
            armed: Mutex::new(vec![false; templates.len()]),
            templates,
            sink,
        }
    }

    /// Let the threshold elapse for the slot whose template carries `key`.
    /// Returns whether anything fired.
    pub fn expire(&self, key: Key) -> Result<bool, EventIoError> {
        let index = self
            .templates
            .iter()
            .position(|t| t.code == key.code())
            .unwrap_or_else(|| panic!("{} is not a source key", key));

        let mut armed = self.armed.lock();
        if !armed[index] {
            return Ok(false);
        }
        armed[index] = false;
        self.sink.emit_key(self.templates[index], true)?;
        Ok(true)
    }

    pub fn armed_count(&self) -> usize {
        self.armed.lock().iter().filter(|a| **a).count()
    }
}

impl ChordTimers for ManualTimers {
    fn arm(&self, slot: SlotIndex) -> bool {
        !std::mem::replace(&mut self.armed.lock()[slot.get()], true)
    }

    fn disarm(&self, slot: SlotIndex) -> bool {
        std::mem::replace(&mut self.armed.lock()[slot.get()], false)
    }

    fn is_armed(&self, slot: SlotIndex) -> bool {
        self.armed.lock()[slot.get()]
    }
}
