//! Per-user request throttling.
//!
//! Fixed window that resets once it is older than the window length. Bursts
//! straddling a reset are not smoothed.

use crate::models::{RateWindow, UserId};
use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

pub const DEFAULT_CEILING: u32 = 20;
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Returned by [`RateLimiter::guard`] when the user is over the ceiling.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("rate limited, retry after {retry_after:?}")]
pub struct RateLimited {
    pub retry_after: Duration,
}

/// Rate limiter keyed by user; each entry is updated under its map-shard lock.
#[derive(Clone)]
pub struct RateLimiter {
    windows: Arc<DashMap<UserId, RateWindow>>,
    ceiling: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new(ceiling: u32) -> Self {
        Self::with_window(ceiling, DEFAULT_WINDOW)
    }

    pub fn with_window(ceiling: u32, window: Duration) -> Self {
        Self {
            windows: Arc::new(DashMap::new()),
            ceiling: ceiling.max(1) as usize,
            window,
        }
    }

    pub fn allow(&self, user_id: UserId) -> bool {
        self.allow_at(user_id, Instant::now())
    }

    /// Decide for a request arriving at `now`.
    pub fn allow_at(&self, user_id: UserId, now: Instant) -> bool {
        let mut entry = self
            .windows
            .entry(user_id)
            .or_insert_with(|| RateWindow::new(now));

        if now.saturating_duration_since(entry.window_start) > self.window {
            entry.reset(now);
            return true;
        }

        if entry.timestamps.len() < self.ceiling {
            entry.timestamps.push(now);
            true
        } else {
            false
        }
    }

    /// Time until the user's current window resets.
    pub fn retry_after_at(&self, user_id: UserId, now: Instant) -> Duration {
        self.windows
            .get(&user_id)
            .map(|w| {
                self.window
                    .saturating_sub(now.saturating_duration_since(w.window_start))
            })
            .unwrap_or_default()
    }

    /// Run `next` only if the user is within the ceiling.
    pub async fn guard<F, Fut, T>(&self, user_id: UserId, next: F) -> Result<T, RateLimited>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let now = Instant::now();

        if self.allow_at(user_id, now) {
            Ok(next().await)
        } else {
            Err(RateLimited {
                retry_after: self.retry_after_at(user_id, now),
            })
        }
    }

    pub fn tracked_users(&self) -> usize {
        self.windows.len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_CEILING)
    }
}
