//! Bounded invocation log kept by each agent.
//!
//! Purely observational: nothing in the request path reads it back, it only
//! feeds the `/v1/agents` introspection surface. Capped at the most recent
//! 100 records, oldest evicted first.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Maximum records retained per agent
pub const MEMORY_CAP: usize = 100;

/// One timestamped invocation record
#[derive(Debug, Clone, Serialize)]
pub struct MemoryRecord {
    pub timestamp: DateTime<Utc>,
    pub payload: Value,
}

/// Mutex-guarded ring of invocation records
#[derive(Debug, Default)]
pub struct MemoryLog {
    entries: Mutex<VecDeque<MemoryRecord>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record, evicting the oldest when over the cap
    pub fn push(&self, payload: Value) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.push_back(MemoryRecord {
            timestamp: Utc::now(),
            payload,
        });
        while entries.len() > MEMORY_CAP {
            entries.pop_front();
        }
    }

    /// Number of retained records
    pub fn depth(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Copy of the current records, oldest first
    pub fn snapshot(&self) -> Vec<MemoryRecord> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .cloned()
            .collect()
    }
}
