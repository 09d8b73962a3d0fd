//! Bounded undo/redo history of whole-state snapshots.
//!
//! Every logical edit records one snapshot. Undo and redo move a cursor
//! through the list; recording after an undo discards the redo branch.

use chrono::{DateTime, Utc};

/// One recorded state.
#[derive(Debug, Clone)]
pub struct HistoryEntry<T> {
    /// Snapshot of the state after the edit
    pub state: T,
    /// When the snapshot was recorded
    pub recorded_at: DateTime<Utc>,
}

impl<T> HistoryEntry<T> {
    fn new(state: T) -> Self {
        Self {
            state,
            recorded_at: Utc::now(),
        }
    }
}

/// Snapshot history with a movable cursor.
///
/// Always holds at least one entry, the current state.
#[derive(Debug, Clone)]
pub struct History<T: Clone> {
    entries: Vec<HistoryEntry<T>>,
    cursor: usize,
    limit: usize,
}

impl<T: Clone> History<T> {
    /// Starts a history at `initial`, keeping at most `limit` entries.
    #[must_use]
    pub fn new(initial: T, limit: usize) -> Self {
        Self {
            entries: vec![HistoryEntry::new(initial)],
            cursor: 0,
            limit: limit.max(1),
        }
    }

    /// The state at the cursor.
    #[must_use]
    pub fn current(&self) -> &T {
        &self.entries[self.cursor].state
    }

    /// When the current state was recorded.
    #[must_use]
    pub fn current_recorded_at(&self) -> DateTime<Utc> {
        self.entries[self.cursor].recorded_at
    }

    /// Maximum number of entries kept.
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Number of entries held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; a history holds at least its current state.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records a new current state, dropping any redo entries.
    pub fn record(&mut self, state: T) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(HistoryEntry::new(state));
        if self.entries.len() > self.limit {
            let excess = self.entries.len() - self.limit;
            self.entries.drain(..excess);
        }
        self.cursor = self.entries.len() - 1;
    }

    /// Records the state produced by applying `edit` to a copy of the current one.
    pub fn record_with(&mut self, edit: impl FnOnce(&mut T)) {
        let mut next = self.current().clone();
        edit(&mut next);
        self.record(next);
    }

    /// Edits the current state in place without creating an entry.
    ///
    /// Used to fold continuing input, such as the rest of a paint stroke,
    /// into the entry recorded when it began.
    pub fn update_current(&mut self, edit: impl FnOnce(&mut T)) {
        edit(&mut self.entries[self.cursor].state);
    }

    /// Whether an older state exists.
    #[must_use]
    pub const fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Whether a newer state exists.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Steps back; returns the restored state.
    pub fn undo(&mut self) -> Option<&T> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        Some(self.current())
    }

    /// Steps forward; returns the restored state.
    pub fn redo(&mut self) -> Option<&T> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        Some(self.current())
    }

    /// Discards all entries and starts over at `state`.
    pub fn reset(&mut self, state: T) {
        self.entries = vec![HistoryEntry::new(state)];
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_undo_redo() {
        let mut history = History::new(0, 10);
        assert!(!history.can_undo());
        history.record(1);
        history.record(2);
        assert_eq!(*history.current(), 2);

        assert_eq!(history.undo(), Some(&1));
        assert_eq!(history.undo(), Some(&0));
        assert_eq!(history.undo(), None);
        assert!(history.can_redo());
        assert_eq!(history.redo(), Some(&1));
    }

    #[test]
    fn test_record_after_undo_discards_redo() {
        let mut history = History::new(0, 10);
        history.record(1);
        history.record(2);
        history.undo();
        history.record_with(|s| *s += 10);
        assert_eq!(*history.current(), 11);
        assert!(!history.can_redo());
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn test_limit_drops_oldest() {
        let mut history = History::new(0, 3);
        for i in 1..=5 {
            history.record(i);
        }
        assert_eq!(history.len(), 3);
        history.undo();
        history.undo();
        assert_eq!(*history.current(), 3);
        assert!(!history.can_undo());
    }

    #[test]
    fn test_update_current_and_reset() {
        let mut history = History::new(vec![1], 5);
        history.record_with(|v| v.push(2));
        history.update_current(|v| v.push(3));
        assert_eq!(history.len(), 2);
        assert_eq!(history.current(), &vec![1, 2, 3]);
        assert_eq!(history.undo(), Some(&vec![1]));

        history.reset(vec![9]);
        assert_eq!(history.len(), 1);
        assert!(!history.can_undo() && !history.can_redo());
        assert!(!history.is_empty());
        assert!(history.current_recorded_at() <= Utc::now());
    }
}
