//! Append-only in-memory history of relayed messages.

use std::collections::VecDeque;
use std::sync::Arc;

/// A single relayed message.
///
/// Immutable once appended. The sequence number is the arrival order at the
/// relay hub, starting at 1.
#[derive(Debug)]
pub struct HistoryEntry {
    pub seq: u64,
    pub text: String,
}

/// Ordered log of every message broadcast since process start.
///
/// Insertion order equals arrival order. With a configured capacity the log
/// acts as a ring buffer and evicts the oldest entries; without one it grows
/// for the process lifetime.
pub struct HistoryLog {
    entries: VecDeque<Arc<HistoryEntry>>,
    next_seq: u64,
    capacity: Option<usize>,
}

impl HistoryLog {
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            entries: VecDeque::new(),
            next_seq: 0,
            capacity,
        }
    }

    /// Append a payload, assigning it the next sequence number.
    /// Evicts the oldest entry if the log exceeds its capacity.
    pub fn append(&mut self, text: String) -> Arc<HistoryEntry> {
        self.next_seq += 1;
        let entry = Arc::new(HistoryEntry {
            seq: self.next_seq,
            text,
        });
        self.entries.push_back(entry.clone());
        if let Some(capacity) = self.capacity {
            while self.entries.len() > capacity {
                self.entries.pop_front();
            }
        }
        entry
    }

    /// The full ordered sequence of retained entries at the time of the call.
    pub fn snapshot(&self) -> Vec<Arc<HistoryEntry>> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
