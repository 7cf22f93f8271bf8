// Simulrs Input Layer - Record Reader
// Blocking, ordered reads of fixed-size records from a byte stream

use std::io::{ErrorKind, Read};

use super::event::{RawInputEvent, RECORD_SIZE};
use super::EventIoError;

/// Reads one record at a time from the upstream byte stream
pub struct EventReader<R> {
    inner: R,
}

impl<R: Read> EventReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Block until the next record is available.
    ///
    /// Returns `Ok(None)` when the stream ends on a record boundary. A stream
    /// that ends part-way through a record is a transport failure.
    pub fn next_event(&mut self) -> Result<Option<RawInputEvent>, EventIoError> {
        let mut buf = [0u8; RECORD_SIZE];
        let mut filled = 0;

        while filled < RECORD_SIZE {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) if filled == 0 => return Ok(None),
                Ok(0) => {
                    return Err(EventIoError::Truncated {
                        got: filled,
                        expected: RECORD_SIZE,
                    })
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(EventIoError::Read(e)),
            }
        }

        Ok(Some(RawInputEvent::from_bytes(&buf)))
    }
}

impl<R: Read> Iterator for EventReader<R> {
    type Item = Result<RawInputEvent, EventIoError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_event().transpose()
    }
}
