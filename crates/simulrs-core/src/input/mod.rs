// Simulrs Input Layer
// Event records and the upstream read port

mod event;
mod reader;

pub use event::{RawInputEvent, EV_KEY, EV_SYN, RECORD_SIZE, SYN_REPORT};
pub use reader::EventReader;

/// Transport failures on either side of the pipeline
#[derive(Debug, thiserror::Error)]
pub enum EventIoError {
    #[error("Failed to read event: {0}")]
    Read(#[source] std::io::Error),

    #[error("Failed to write event: {0}")]
    Write(#[source] std::io::Error),

    #[error("Truncated event record: got {got} of {expected} bytes")]
    Truncated { got: usize, expected: usize },
}
