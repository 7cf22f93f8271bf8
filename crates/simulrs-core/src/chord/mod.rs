// Simulrs Chord Layer
// Key table, recency tracking and the chord state machine

mod engine;
mod recency;
mod table;

pub use engine::{ChordEngine, TargetState};
pub use recency::RecencyOrder;
pub use table::{EventClass, KeyTable, SlotIndex, SlotLookup, SourceSlot, MAX_SOURCES, MIN_SOURCES};

use crate::Key;

/// Invalid chord definitions
#[derive(Debug, thiserror::Error)]
pub enum ChordError {
    #[error("Chords need {min} to {max} source keys, got {0}", min = MIN_SOURCES, max = MAX_SOURCES)]
    SourceCount(usize),

    #[error("Source key {0} listed more than once")]
    DuplicateSource(Key),

    #[error("Target key {0} is also a source key")]
    TargetIsSource(Key),
}
