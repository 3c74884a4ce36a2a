//! Per-user usage statistics, kept in memory for the process lifetime.

use crate::models::{UserId, UserSession};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;

/// Owns every [`UserSession`]; other components only read copies.
#[derive(Clone, Default)]
pub struct UsageTracker {
    sessions: Arc<DashMap<UserId, UserSession>>,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one successful translation of `char_count` input characters.
    pub fn record(&self, user_id: UserId, char_count: usize) {
        self.record_at(user_id, char_count, Utc::now());
    }

    pub fn record_at(&self, user_id: UserId, char_count: usize, now: DateTime<Utc>) {
        let mut session = self
            .sessions
            .entry(user_id)
            .or_insert_with(|| UserSession::new(now));

        session.translation_count += 1;
        session.characters_translated += char_count as u64;
        session.last_seen = now;
    }

    /// Snapshot of the user's counters, if any translation succeeded.
    pub fn report(&self, user_id: UserId) -> Option<UserSession> {
        self.sessions.get(&user_id).map(|s| s.clone())
    }

    pub fn user_count(&self) -> usize {
        self.sessions.len()
    }
}
