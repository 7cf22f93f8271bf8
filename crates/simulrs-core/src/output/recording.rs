// Simulrs Output Layer - Recording Sink
// In-memory sink for exercising the engine without a byte stream

use parking_lot::Mutex;

use super::EventSink;
use crate::input::{EventIoError, RawInputEvent};

#[derive(Debug, Default)]
struct Recorded {
    events: Vec<RawInputEvent>,
    /// Key records passed to `emit_key`, with the settle flag they asked for
    key_frames: Vec<(RawInputEvent, bool)>,
}

/// Collects every emitted record, SYN_REPORTs included
#[derive(Debug, Default)]
pub struct RecordingSink {
    recorded: Mutex<Recorded>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far
    pub fn events(&self) -> Vec<RawInputEvent> {
        self.recorded.lock().events.clone()
    }

    /// Emitted key-change records only, SYN_REPORTs dropped
    pub fn key_events(&self) -> Vec<RawInputEvent> {
        self.recorded
            .lock()
            .events
            .iter()
            .copied()
            .filter(|e| e.is_key_event())
            .collect()
    }

    /// Key frames in emission order, each with whether it requested the settle delay
    pub fn key_frames(&self) -> Vec<(RawInputEvent, bool)> {
        self.recorded.lock().key_frames.clone()
    }

    /// Remove and return everything emitted so far
    pub fn take(&self) -> Vec<RawInputEvent> {
        let mut recorded = self.recorded.lock();
        recorded.key_frames.clear();
        std::mem::take(&mut recorded.events)
    }

    pub fn len(&self) -> usize {
        self.recorded.lock().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recorded.lock().events.is_empty()
    }
}

impl EventSink for RecordingSink {
    fn emit_raw(&self, event: RawInputEvent) -> Result<(), EventIoError> {
        self.recorded.lock().events.push(event);
        Ok(())
    }

    fn emit_key(&self, event: RawInputEvent, settle: bool) -> Result<(), EventIoError> {
        let mut recorded = self.recorded.lock();
        recorded.events.push(event);
        recorded.events.push(RawInputEvent::syn_report());
        recorded.key_frames.push((event, settle));
        Ok(())
    }
}
