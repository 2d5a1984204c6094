//! Undo/redo history of full store snapshots.
//!
//! The stack is seeded with a baseline (normally the empty document) so the
//! first user action can be undone. Each completed gesture pushes a deep copy
//! of the store; pushing after an undo discards the redo branch. The stack
//! holds at most [`HISTORY_LIMIT`] entries and drops the oldest beyond that.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use std::collections::VecDeque;

use crate::consts::HISTORY_LIMIT;
use crate::doc::Snapshot;

/// One recorded state.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub snapshot: Snapshot,
    /// Host clock time of the action that produced this entry, in milliseconds.
    pub timestamp_ms: f64,
}

/// Bounded snapshot stack with a movable cursor.
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
    index: usize,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(Snapshot::default())
    }
}

impl History {
    /// Start a history whose only entry is `baseline`.
    #[must_use]
    pub fn new(baseline: Snapshot) -> Self {
        Self::with_limit(baseline, HISTORY_LIMIT)
    }

    /// Start a history with a custom depth. A limit of zero is treated as one.
    #[must_use]
    pub fn with_limit(baseline: Snapshot, limit: usize) -> Self {
        let mut entries = VecDeque::with_capacity(limit.max(1));
        entries.push_back(HistoryEntry { snapshot: baseline, timestamp_ms: 0.0 });
        Self { entries, index: 0, limit: limit.max(1) }
    }

    /// Record `state` as the newest entry.
    ///
    /// Returns false without touching the stack when `state` equals the entry
    /// at the cursor.
    pub fn snapshot(&mut self, state: &Snapshot, timestamp_ms: f64) -> bool {
        if self.entries.get(self.index).is_some_and(|e| e.snapshot == *state) {
            return false;
        }
        self.entries.truncate(self.index + 1);
        self.entries.push_back(HistoryEntry { snapshot: state.clone(), timestamp_ms });
        while self.entries.len() > self.limit {
            self.entries.pop_front();
        }
        self.index = self.entries.len() - 1;
        true
    }

    /// Step back one entry. `None` when already at the oldest entry.
    pub fn undo(&mut self) -> Option<Snapshot> {
        if !self.can_undo() {
            return None;
        }
        self.index -= 1;
        self.entries.get(self.index).map(|e| e.snapshot.clone())
    }

    /// Step forward one entry. `None` when already at the newest entry.
    pub fn redo(&mut self) -> Option<Snapshot> {
        if !self.can_redo() {
            return None;
        }
        self.index += 1;
        self.entries.get(self.index).map(|e| e.snapshot.clone())
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    /// Drop every entry and start over from `baseline`.
    pub fn reset(&mut self, baseline: Snapshot) {
        self.entries.clear();
        self.entries.push_back(HistoryEntry { snapshot: baseline, timestamp_ms: 0.0 });
        self.index = 0;
    }

    /// The entry at the cursor.
    #[must_use]
    pub fn current(&self) -> Option<&HistoryEntry> {
        self.entries.get(self.index)
    }

    /// Cursor position, 0-based from the oldest retained entry.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of retained entries, baseline included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: the stack keeps at least its baseline.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
