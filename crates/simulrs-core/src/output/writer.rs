// Simulrs Output Layer - Serialized Writer
// One lock acquisition per emitted frame keeps concurrent writers from interleaving

use std::io::Write;
use std::time::Duration;

use parking_lot::Mutex;

use super::EventSink;
use crate::input::{EventIoError, RawInputEvent};

/// Output port over any byte sink (stdout in production).
///
/// The main loop and timer contexts share one `EventWriter` through an `Arc`.
pub struct EventWriter<W> {
    inner: Mutex<W>,
    settle_delay: Duration,
}

impl<W: Write + Send> EventWriter<W> {
    pub fn new(inner: W, settle_delay: Duration) -> Self {
        Self {
            inner: Mutex::new(inner),
            settle_delay,
        }
    }

    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    /// Consume the writer and hand back the underlying sink
    pub fn into_inner(self) -> W {
        self.inner.into_inner()
    }

    fn write_all(out: &mut W, events: &[RawInputEvent]) -> Result<(), EventIoError> {
        for event in events {
            out.write_all(&event.to_bytes())
                .map_err(EventIoError::Write)?;
        }
        out.flush().map_err(EventIoError::Write)
    }
}

impl<W: Write + Send> EventSink for EventWriter<W> {
    fn emit_raw(&self, event: RawInputEvent) -> Result<(), EventIoError> {
        let mut out = self.inner.lock();
        Self::write_all(&mut out, &[event])
    }

    fn emit_key(&self, event: RawInputEvent, settle: bool) -> Result<(), EventIoError> {
        let mut out = self.inner.lock();
        Self::write_all(&mut out, &[event, RawInputEvent::syn_report()])?;
        // The lock stays held through the settle delay so the next frame,
        // from any writer, starts only after it.
        if settle && !self.settle_delay.is_zero() {
            std::thread::sleep(self.settle_delay);
        }
        Ok(())
    }
}
