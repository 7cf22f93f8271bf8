// Simulrs Chord Engine
// Turns near-simultaneous presses of the source keys into one target key
//
// All chord bookkeeping lives here and is touched only from the thread that
// calls `process`. Timer contexts never see this state: they emit a
// pre-built press record through the shared sink and nothing else.

use log::{debug, trace};
use smallvec::SmallVec;

use super::recency::RecencyOrder;
use super::table::{EventClass, KeyTable, SlotIndex, SlotLookup, MAX_SOURCES};
use crate::input::{EventIoError, RawInputEvent};
use crate::output::EventSink;
use crate::timer::ChordTimers;
use crate::Action;

/// Progress of the synthetic target key through one chord
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum TargetState {
    /// No chord in flight
    Init,
    /// Target press emitted, every chord member still held
    PressWritten,
    /// Target release emitted, waiting for the remaining members to be released
    ReleaseWritten,
}

/// Chord-detection state machine for one group of source keys
pub struct ChordEngine<T, S> {
    table: KeyTable,
    timers: T,
    sink: S,
    recency: RecencyOrder,
    target: TargetState,
    /// Chord members whose release has not been seen yet
    held: SmallVec<[SlotIndex; MAX_SOURCES]>,
}

impl<T: ChordTimers, S: EventSink> ChordEngine<T, S> {
    pub fn new(table: KeyTable, timers: T, sink: S) -> Self {
        let recency = RecencyOrder::new(table.len());
        Self {
            table,
            timers,
            sink,
            recency,
            target: TargetState::Init,
            held: SmallVec::new(),
        }
    }

    pub fn table(&self) -> &KeyTable {
        &self.table
    }

    pub fn target_state(&self) -> TargetState {
        self.target
    }

    pub fn recency(&self) -> &RecencyOrder {
        &self.recency
    }

    /// True when no chord is in flight and no press is deferred
    pub fn is_idle(&self) -> bool {
        self.target == TargetState::Init
            && self.held.is_empty()
            && self.table.slots().all(|s| !self.timers.is_armed(s))
    }

    /// Handle one input record, emitting zero or more records downstream
    pub fn process(&mut self, event: RawInputEvent) -> Result<(), EventIoError> {
        match self.table.classify(&event) {
            EventClass::NonKey => {
                trace!("pass through type={} code={} value={}", event.event_type, event.code, event.value);
                self.sink.emit_raw(event)
            }
            EventClass::Key {
                action,
                slot: SlotLookup::NotFound,
            } => self.on_other_key(event, action),
            EventClass::Key {
                action,
                slot: SlotLookup::Found(slot),
            } => match action {
                Action::Press => self.on_source_press(slot),
                Action::Release => self.on_source_release(event, slot),
                Action::Repeat => self.on_source_repeat(event, slot),
            },
        }
    }

    /// A key outside the source set. A press first flushes every deferred
    /// source press, oldest arming first, so nothing typed before it is lost
    /// or reordered.
    fn on_other_key(&mut self, event: RawInputEvent, action: Action) -> Result<(), EventIoError> {
        if action.is_press() {
            let pending: SmallVec<[SlotIndex; MAX_SOURCES]> = self.recency.oldest_first().collect();
            for slot in pending {
                if self.timers.disarm(slot) {
                    let source = self.table.slot(slot);
                    debug!("{} interrupted by code {}, flushing deferred press", source.key, event.code);
                    self.sink.emit_key(source.down, true)?;
                }
            }
        }
        self.sink.emit_key(event, false)
    }

    fn on_source_press(&mut self, slot: SlotIndex) -> Result<(), EventIoError> {
        let others = self.table.others(slot);
        if self.timers.disarm_if_all_armed(&others) {
            debug!(
                "chord complete on {}, pressing {}",
                self.table.slot(slot).key,
                self.table.target()
            );
            self.sink.emit_key(self.table.target_down(), false)?;
            self.target = TargetState::PressWritten;
            self.held = self.table.slots().collect();
            return Ok(());
        }

        trace!("{} pressed, deferring", self.table.slot(slot).key);
        // A press that only restarts a pending window keeps its place in the order.
        if self.timers.arm(slot) {
            self.recency.touch(slot);
        }
        Ok(())
    }

    fn on_source_release(&mut self, event: RawInputEvent, slot: SlotIndex) -> Result<(), EventIoError> {
        if let Some(pos) = self.held.iter().position(|s| *s == slot) {
            self.held.remove(pos);
            if self.target == TargetState::PressWritten {
                debug!("chord member {} released, releasing {}", self.table.slot(slot).key, self.table.target());
                self.sink.emit_key(self.table.target_up(), false)?;
                self.target = TargetState::ReleaseWritten;
            }
            if self.held.is_empty() {
                debug!("chord fully released");
                self.target = TargetState::Init;
            }
            return Ok(());
        }

        // Tapped within the threshold: restore the press the timer was holding back.
        if self.timers.disarm(slot) {
            trace!("{} tapped, flushing deferred press", self.table.slot(slot).key);
            self.sink.emit_key(self.table.slot(slot).down, true)?;
        }
        self.sink.emit_key(event, false)
    }

    /// Repeats are dropped while the key's press is withheld or absorbed into
    /// the chord; once the press is out they pass through.
    fn on_source_repeat(&mut self, event: RawInputEvent, slot: SlotIndex) -> Result<(), EventIoError> {
        if self.held.contains(&slot) || self.timers.is_armed(slot) {
            trace!("dropping repeat of {}", self.table.slot(slot).key);
            return Ok(());
        }
        self.sink.emit_key(event, false)
    }
}
