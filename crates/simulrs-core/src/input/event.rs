// Simulrs Input Layer - Event Records
// Native `struct input_event` records as exchanged with the pipeline

use std::mem;

use crate::{Action, Key};

/// EV_SYN event type code
pub const EV_SYN: u16 = 0x00;
/// EV_KEY event type code
pub const EV_KEY: u16 = 0x01;
/// SYN_REPORT code, closes a frame of input events
pub const SYN_REPORT: u16 = 0x00;

/// Size in bytes of one record on the wire (native `struct input_event`)
pub const RECORD_SIZE: usize = mem::size_of::<libc::input_event>();

/// One event record.
///
/// The timestamp is carried through untouched; the chord engine never
/// interprets it and synthesized records use a zero timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawInputEvent {
    /// Event timestamp (seconds)
    pub time_sec: i64,

    /// Event timestamp (microseconds)
    pub time_usec: i64,

    /// Event type (EV_KEY = 0x01)
    pub event_type: u16,

    /// Key code
    pub code: u16,

    /// Event value (0=Release, 1=Press, 2=Repeat for key records)
    pub value: i32,
}

impl RawInputEvent {
    /// Synthesized key-change record
    pub fn key(key: Key, action: Action) -> Self {
        Self {
            time_sec: 0,
            time_usec: 0,
            event_type: EV_KEY,
            code: key.code(),
            value: action.to_i32(),
        }
    }

    /// The `{type=SYN, code=REPORT, value=0}` synchronization record
    pub fn syn_report() -> Self {
        Self {
            time_sec: 0,
            time_usec: 0,
            event_type: EV_SYN,
            code: SYN_REPORT,
            value: 0,
        }
    }

    pub fn is_key_event(&self) -> bool {
        self.event_type == EV_KEY
    }

    /// Key transition carried by this record, if it is one
    pub fn action(&self) -> Option<Action> {
        if self.is_key_event() {
            Action::from_i32(self.value)
        } else {
            None
        }
    }

    pub fn key_code(&self) -> Key {
        Key::from(self.code)
    }

    /// Encode in native `struct input_event` layout
    pub fn to_bytes(&self) -> [u8; RECORD_SIZE] {
        let raw = libc::input_event {
            time: libc::timeval {
                tv_sec: self.time_sec as libc::time_t,
                tv_usec: self.time_usec as libc::suseconds_t,
            },
            type_: self.event_type,
            code: self.code,
            value: self.value,
        };
        let mut out = [0u8; RECORD_SIZE];
        // SAFETY: input_event is a plain-old-data repr(C) struct without padding
        // and `out` is exactly its size.
        unsafe {
            std::ptr::write_unaligned(out.as_mut_ptr() as *mut libc::input_event, raw);
        }
        out
    }

    /// Decode from native `struct input_event` layout
    pub fn from_bytes(bytes: &[u8; RECORD_SIZE]) -> Self {
        // SAFETY: every bit pattern is a valid input_event and the buffer is
        // exactly its size; the read tolerates any alignment.
        let raw: libc::input_event =
            unsafe { std::ptr::read_unaligned(bytes.as_ptr() as *const libc::input_event) };
        Self::from(raw)
    }
}

impl From<libc::input_event> for RawInputEvent {
    fn from(raw: libc::input_event) -> Self {
        Self {
            time_sec: raw.time.tv_sec as i64,
            time_usec: raw.time.tv_usec as i64,
            event_type: raw.type_,
            code: raw.code,
            value: raw.value,
        }
    }
}
