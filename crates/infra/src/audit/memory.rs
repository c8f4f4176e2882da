use std::collections::VecDeque;

use ksef_core::ApiLogSink;
use ksef_domain::ApiLogEntry;
use parking_lot::Mutex;

/// Default number of entries kept by [`MemoryApiLog`].
pub const DEFAULT_CAPACITY: usize = 50;

/// Bounded buffer of the most recent audit entries
///
/// Oldest entries are evicted once `capacity` is reached.
#[derive(Debug)]
pub struct MemoryApiLog {
    capacity: usize,
    entries: Mutex<VecDeque<ApiLogEntry>>,
}

impl MemoryApiLog {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Buffer keeping at most `capacity` entries (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { capacity, entries: Mutex::new(VecDeque::with_capacity(capacity)) }
    }

    /// Entries oldest first.
    pub fn entries(&self) -> Vec<ApiLogEntry> {
        self.entries.lock().iter().cloned().collect()
    }

    pub fn last(&self) -> Option<ApiLogEntry> {
        self.entries.lock().back().cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl Default for MemoryApiLog {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiLogSink for MemoryApiLog {
    fn record(&self, entry: ApiLogEntry) {
        let mut entries = self.entries.lock();
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }
}
