// Simulrs Recency Tracker
// Arming order of source timers, most recent first

use smallvec::SmallVec;

use super::table::{SlotIndex, MAX_SOURCES};

/// A permutation of all slot indices ordered by when each slot's timer was
/// last armed. Slots never armed keep their initial relative order at the back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecencyOrder {
    order: SmallVec<[SlotIndex; MAX_SOURCES]>,
}

impl RecencyOrder {
    pub fn new(len: usize) -> Self {
        Self {
            order: (0..len).map(SlotIndex::new).collect(),
        }
    }

    /// Move `slot` to the front
    pub fn touch(&mut self, slot: SlotIndex) {
        let pos = self
            .order
            .iter()
            .position(|s| *s == slot)
            .unwrap_or_else(|| unreachable!("slot {:?} outside recency order", slot));
        let slot = self.order.remove(pos);
        self.order.insert(0, slot);
    }

    pub fn most_recent_first(&self) -> impl DoubleEndedIterator<Item = SlotIndex> + '_ {
        self.order.iter().copied()
    }

    pub fn oldest_first(&self) -> impl Iterator<Item = SlotIndex> + '_ {
        self.most_recent_first().rev()
    }
}
