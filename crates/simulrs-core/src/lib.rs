// Simulrs Core Library
// Chord detection filter for keyboard event pipelines

pub mod action;
pub mod chord;
pub mod config;
pub mod input;
pub mod key;
pub mod output;
pub mod pipeline;
pub mod timer;

pub use action::Action;
pub use chord::{ChordEngine, ChordError, KeyTable, SlotIndex, SlotLookup, TargetState};
pub use config::{ChordConfig, ChordOverrides, ConfigError};
pub use input::{EventIoError, EventReader, RawInputEvent};
pub use key::{key_from_name, Key};
pub use output::{EventSink, EventWriter, RecordingSink};
pub use timer::{ChordTimers, FaultHandler, ManualTimers, TimerError, TimerService};

/// Result type for the filter as a whole
pub type SimulResult<T> = Result<T, SimulError>;

/// Every way the filter can fail. All of them are fatal to the process.
#[derive(Debug, thiserror::Error)]
pub enum SimulError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] EventIoError),

    #[error(transparent)]
    Timer(#[from] TimerError),
}
