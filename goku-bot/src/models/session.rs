//! Per-user in-memory state.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Instant;

/// Usage counters for one user, kept for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSession {
    /// Successful translations.
    pub translation_count: u64,

    /// Characters of input text translated.
    pub characters_translated: u64,

    pub first_seen: DateTime<Utc>,

    pub last_seen: DateTime<Utc>,
}

impl UserSession {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            translation_count: 0,
            characters_translated: 0,
            first_seen: now,
            last_seen: now,
        }
    }
}

/// Request timestamps inside the current rate window.
#[derive(Debug, Clone)]
pub struct RateWindow {
    pub timestamps: Vec<Instant>,
    pub window_start: Instant,
}

impl RateWindow {
    pub fn new(now: Instant) -> Self {
        Self {
            timestamps: Vec::new(),
            window_start: now,
        }
    }

    /// Start a fresh window containing only `now`.
    pub fn reset(&mut self, now: Instant) {
        self.timestamps.clear();
        self.timestamps.push(now);
        self.window_start = now;
    }
}
