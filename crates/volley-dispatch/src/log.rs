use std::collections::VecDeque;

use chrono::Utc;
use uuid::Uuid;

use crate::types::{LogEntry, LogKind};

/// Rolling log capacity. The oldest entry is evicted once exceeded.
pub const LOG_CAP: usize = 100;

/// Bounded, append-only outcome log. Single writer (the controller and the
/// job task); readers get cloned snapshots.
#[derive(Debug, Default)]
pub struct LogBuffer {
    entries: VecDeque<LogEntry>,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(LOG_CAP),
        }
    }

    /// Append a new entry, evicting from the front past [`LOG_CAP`].
    pub fn append(&mut self, kind: LogKind, message: impl Into<String>) -> LogEntry {
        let entry = LogEntry {
            id: short_id(),
            timestamp: Utc::now().to_rfc3339(),
            kind,
            message: message.into(),
        };
        self.entries.push_back(entry.clone());
        while self.entries.len() > LOG_CAP {
            self.entries.pop_front();
        }
        entry
    }

    /// Drop all entries. Called on every job start, never on stop.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// 8-hex-char random token. Collisions within one 100-entry window are
/// negligible.
fn short_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_preserves_insertion_order() {
        let mut log = LogBuffer::new();
        log.append(LogKind::Info, "first");
        log.append(LogKind::Success, "second");
        log.append(LogKind::Error, "third");

        let snap = log.snapshot();
        assert_eq!(snap.len(), 3);
        assert_eq!(snap[0].message, "first");
        assert_eq!(snap[2].message, "third");
        assert_eq!(snap[1].kind, LogKind::Success);
    }

    #[test]
    fn cap_evicts_oldest_first() {
        let mut log = LogBuffer::new();
        for i in 0..LOG_CAP {
            log.append(LogKind::Info, format!("entry {i}"));
        }
        assert_eq!(log.len(), LOG_CAP);

        log.append(LogKind::Info, "overflow");
        let snap = log.snapshot();
        assert_eq!(snap.len(), LOG_CAP);
        assert_eq!(snap[0].message, "entry 1");
        assert_eq!(snap.last().unwrap().message, "overflow");
    }

    #[test]
    fn clear_empties_the_buffer() {
        let mut log = LogBuffer::new();
        log.append(LogKind::Info, "stale");
        log.clear();
        assert!(log.is_empty());
    }

    #[test]
    fn ids_are_short_and_distinct() {
        let mut log = LogBuffer::new();
        let a = log.append(LogKind::Info, "a");
        let b = log.append(LogKind::Info, "b");
        assert_eq!(a.id.len(), 8);
        assert_ne!(a.id, b.id);
    }
}
