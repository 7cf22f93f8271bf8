// Simulrs Output Layer
// Downstream write port shared by the main loop and timer callbacks

mod recording;
mod writer;

pub use recording::RecordingSink;
pub use writer::EventWriter;

use crate::input::{EventIoError, RawInputEvent};

/// Ordered, serialized output of event records.
///
/// Implementations must make each call atomic with respect to other callers:
/// a key record and its SYN_REPORT are never split by another writer.
pub trait EventSink: Send + Sync {
    /// Forward a record as-is, no synchronization record appended
    fn emit_raw(&self, event: RawInputEvent) -> Result<(), EventIoError>;

    /// Write a key-change record followed by SYN_REPORT. With `settle`, the
    /// next frame is held back by the configured settle delay.
    fn emit_key(&self, event: RawInputEvent, settle: bool) -> Result<(), EventIoError>;
}

impl<S: EventSink + ?Sized> EventSink for std::sync::Arc<S> {
    fn emit_raw(&self, event: RawInputEvent) -> Result<(), EventIoError> {
        (**self).emit_raw(event)
    }

    fn emit_key(&self, event: RawInputEvent, settle: bool) -> Result<(), EventIoError> {
        (**self).emit_key(event, settle)
    }
}
