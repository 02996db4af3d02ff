//! Conversion history
//!
//! Bounded, most-recent-first record of successful conversions. The session
//! owns one `ConversionHistory` exclusively; nothing here is shared or persisted.

use std::collections::VecDeque;
use std::fmt;

use crate::shared::types::HistoryEntry;

/// Number of lines kept when no limit is configured
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// Storage backend for history entries
pub trait HistoryStorage: Send + fmt::Debug {
    /// Prepend `entry`, evicting from the back until at most `capacity` remain.
    /// Returns the evicted entries, oldest last.
    fn save_entry(&mut self, entry: HistoryEntry, capacity: usize) -> Vec<HistoryEntry>;
    fn load_entries(&self, limit: usize) -> Vec<HistoryEntry>;
    fn clear_all(&mut self);
    fn count(&self) -> usize;
}

/// Process-local storage backed by a `VecDeque`
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    items: VecDeque<HistoryEntry>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HistoryStorage for InMemoryStorage {
    fn save_entry(&mut self, entry: HistoryEntry, capacity: usize) -> Vec<HistoryEntry> {
        self.items.push_front(entry);
        let mut evicted = Vec::new();
        while self.items.len() > capacity {
            if let Some(oldest) = self.items.pop_back() {
                evicted.push(oldest);
            }
        }
        evicted
    }

    fn load_entries(&self, limit: usize) -> Vec<HistoryEntry> {
        self.items.iter().take(limit).cloned().collect()
    }

    fn clear_all(&mut self) {
        self.items.clear();
    }

    fn count(&self) -> usize {
        self.items.len()
    }
}

/// History manager enforcing the capacity bound over a storage backend
#[derive(Debug)]
pub struct ConversionHistory {
    storage: Box<dyn HistoryStorage>,
    capacity: usize,
}

impl ConversionHistory {
    /// A capacity of zero is raised to one
    pub fn new(capacity: usize) -> Self {
        Self::with_storage(Box::new(InMemoryStorage::new()), capacity)
    }

    pub fn with_storage(storage: Box<dyn HistoryStorage>, capacity: usize) -> Self {
        Self {
            storage,
            capacity: capacity.max(1),
        }
    }

    /// Prepend an entry; the oldest entries beyond capacity are dropped
    pub fn push(&mut self, entry: HistoryEntry) {
        let evicted = self.storage.save_entry(entry, self.capacity);
        for old in &evicted {
            tracing::debug!(line = %old.line, "evicted history entry");
        }
    }

    /// Display lines, most recent first
    pub fn lines(&self) -> Vec<String> {
        self.entries().into_iter().map(|e| e.line).collect()
    }

    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.storage.load_entries(self.capacity)
    }

    pub fn len(&self) -> usize {
        self.storage.count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.storage.clear_all();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for ConversionHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(n: usize) -> HistoryEntry {
        HistoryEntry::new(format!("Item {}", n), "m", "ft", n as f64, n as f64 * 3.28084)
    }

    #[test]
    fn test_push_and_lines() {
        let mut history = ConversionHistory::default();
        history.push(entry(1));
        history.push(entry(2));

        let lines = history.lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "Item 2"); // Most recent first
        assert_eq!(lines[1], "Item 1");
    }

    #[test]
    fn test_capacity_bound() {
        let mut history = ConversionHistory::new(10);
        for i in 0..25 {
            history.push(entry(i));
        }

        let lines = history.lines();
        assert_eq!(lines.len(), 10);
        assert_eq!(lines[0], "Item 24");
        assert_eq!(lines[9], "Item 15");
    }

    #[test]
    fn test_zero_capacity_is_raised() {
        let mut history = ConversionHistory::new(0);
        assert_eq!(history.capacity(), 1);
        history.push(entry(1));
        history.push(entry(2));
        assert_eq!(history.lines(), vec!["Item 2".to_string()]);
    }

    #[test]
    fn test_clear() {
        let mut history = ConversionHistory::default();
        history.push(entry(1));
        history.push(entry(2));
        assert_eq!(history.len(), 2);

        history.clear();

        assert!(history.is_empty());
        assert!(history.entries().is_empty());
    }

    #[test]
    fn test_storage_reports_evictions() {
        let mut storage = InMemoryStorage::new();
        assert!(storage.save_entry(entry(1), 2).is_empty());
        assert!(storage.save_entry(entry(2), 2).is_empty());
        let evicted = storage.save_entry(entry(3), 2);
        assert_eq!(evicted.len(), 1);
        assert_eq!(evicted[0].line, "Item 1");
        assert_eq!(storage.count(), 2);
    }
}
