// Simulrs Chord Key Table
// Static source/target configuration with cached event templates

use smallvec::SmallVec;

use super::ChordError;
use crate::input::RawInputEvent;
use crate::{Action, Key};

/// Fewest source keys a chord can have
pub const MIN_SOURCES: usize = 2;
/// Most source keys a chord can have
pub const MAX_SOURCES: usize = 3;

/// Position of a source key in the configured source list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotIndex(u8);

impl SlotIndex {
    /// Only the key table hands out indices, so every index is in range for it.
    pub(crate) fn new(index: usize) -> Self {
        debug_assert!(index < MAX_SOURCES);
        SlotIndex(index as u8)
    }

    pub fn get(self) -> usize {
        self.0 as usize
    }
}

/// Result of looking a key code up in the source set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotLookup {
    Found(SlotIndex),
    NotFound,
}

/// How the chord engine treats an incoming record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventClass {
    /// Not a key transition (SYN, MSC, unknown key values): forwarded untouched
    NonKey,
    /// A key transition, with the source slot it belongs to, if any
    Key { action: Action, slot: SlotLookup },
}

/// One configured source key and its pre-built records
#[derive(Debug, Clone, Copy)]
pub struct SourceSlot {
    pub key: Key,
    pub down: RawInputEvent,
    pub up: RawInputEvent,
}

impl SourceSlot {
    fn new(key: Key) -> Self {
        Self {
            key,
            down: RawInputEvent::key(key, Action::Press),
            up: RawInputEvent::key(key, Action::Release),
        }
    }
}

/// Source keys (2 or 3) and the single target key they combine into
#[derive(Debug, Clone)]
pub struct KeyTable {
    sources: SmallVec<[SourceSlot; MAX_SOURCES]>,
    target: Key,
    target_down: RawInputEvent,
    target_up: RawInputEvent,
}

impl KeyTable {
    pub fn new(sources: &[Key], target: Key) -> Result<Self, ChordError> {
        if !(MIN_SOURCES..=MAX_SOURCES).contains(&sources.len()) {
            return Err(ChordError::SourceCount(sources.len()));
        }
        for (i, key) in sources.iter().enumerate() {
            if sources[..i].contains(key) {
                return Err(ChordError::DuplicateSource(*key));
            }
        }
        if sources.contains(&target) {
            return Err(ChordError::TargetIsSource(target));
        }

        Ok(Self {
            sources: sources.iter().copied().map(SourceSlot::new).collect(),
            target,
            target_down: RawInputEvent::key(target, Action::Press),
            target_up: RawInputEvent::key(target, Action::Release),
        })
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn lookup(&self, code: u16) -> SlotLookup {
        self.sources
            .iter()
            .position(|s| s.key.code() == code)
            .map_or(SlotLookup::NotFound, |i| SlotLookup::Found(SlotIndex::new(i)))
    }

    pub fn classify(&self, event: &RawInputEvent) -> EventClass {
        match event.action() {
            Some(action) => EventClass::Key {
                action,
                slot: self.lookup(event.code),
            },
            None => EventClass::NonKey,
        }
    }

    pub fn slot(&self, slot: SlotIndex) -> &SourceSlot {
        &self.sources[slot.get()]
    }

    pub fn slots(&self) -> impl Iterator<Item = SlotIndex> + '_ {
        (0..self.sources.len()).map(SlotIndex::new)
    }

    /// Every slot except `slot`
    pub fn others(&self, slot: SlotIndex) -> SmallVec<[SlotIndex; MAX_SOURCES]> {
        self.slots().filter(|s| *s != slot).collect()
    }

    pub fn source_keys(&self) -> impl Iterator<Item = Key> + '_ {
        self.sources.iter().map(|s| s.key)
    }

    /// Deferred press records, in slot order, for the timer service
    pub fn down_templates(&self) -> Vec<RawInputEvent> {
        self.sources.iter().map(|s| s.down).collect()
    }

    pub fn target(&self) -> Key {
        self.target
    }

    pub fn target_down(&self) -> RawInputEvent {
        self.target_down
    }

    pub fn target_up(&self) -> RawInputEvent {
        self.target_up
    }
}
