//! Bounded snapshot history for stepping backwards

use std::collections::VecDeque;

use crate::particle::Particle;
use crate::solver::ForceBreakdown;

/// Default number of ticks that can be rewound
pub const DEFAULT_HISTORY_CAPACITY: usize = 256;

/// Particle state as it was before one tick ran
#[derive(Clone, Debug)]
pub struct HistoryEntry {
    /// Tick counter at the time of recording
    pub tick: u64,
    pub particles: Vec<Particle>,
    /// Force decomposition the recorded particles were integrated with
    pub breakdowns: Vec<ForceBreakdown>,
}

/// Ring buffer of pre-tick snapshots. The oldest entry is dropped when full;
/// a capacity of zero disables recording.
#[derive(Clone, Debug)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity.min(DEFAULT_HISTORY_CAPACITY)),
            capacity,
        }
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Most recent entry
    pub fn pop(&mut self) -> Option<HistoryEntry> {
        self.entries.pop_back()
    }

    /// Pop up to `count` entries and return the oldest of them, plus how
    /// many were popped
    pub fn pop_many(&mut self, count: usize) -> Option<(HistoryEntry, usize)> {
        let mut last = None;
        let mut popped = 0;
        while popped < count {
            match self.entries.pop_back() {
                Some(entry) => {
                    last = Some(entry);
                    popped += 1;
                }
                None => break,
            }
        }
        last.map(|entry| (entry, popped))
    }

    pub fn clear(&mut self) {
        if !self.entries.is_empty() {
            log::debug!("Dropping {} history entries", self.entries.len());
        }
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
