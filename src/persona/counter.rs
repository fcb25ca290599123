// src/persona/counter.rs
// Per-session request counters (in-memory, process lifetime)

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Session id -> number of qualifying requests seen for that session.
///
/// The lock is only held for the read-modify-write of a single entry and
/// never across an await point.
#[derive(Debug, Default)]
pub struct SessionCounters {
    counts: Mutex<HashMap<String, u64>>,
}

impl SessionCounters {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while holding the lock cannot leave a half-written u64,
    // so a poisoned table is still usable.
    fn table(&self) -> MutexGuard<'_, HashMap<String, u64>> {
        self.counts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Increment the session's counter (starting from 0) and return the new value
    pub fn increment(&self, session_id: &str) -> u64 {
        let mut table = self.table();
        let count = table.entry(session_id.to_string()).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    /// Current count for a session, `None` if the session was never seen
    pub fn get(&self, session_id: &str) -> Option<u64> {
        self.table().get(session_id).copied()
    }

    /// Number of tracked sessions
    pub fn len(&self) -> usize {
        self.table().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table().is_empty()
    }

    /// Forget every session. Safe to call repeatedly.
    pub fn clear(&self) {
        self.table().clear();
    }
}
