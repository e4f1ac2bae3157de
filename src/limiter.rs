use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::error::ApiError;

/// Default quota applied to every contact route: 2 requests per 5 seconds
/// per identity per route.
pub const DEFAULT_QUOTA: usize = 2;
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(5);

/// RateLimiter
///
/// A sliding-window invocation counter keyed by (identity, route tag).
/// Each hit records an instant; hits older than the window are evicted before
/// the quota comparison, so the limit is over any rolling window rather than
/// fixed buckets.
///
/// The counter map is the only cross-request mutable state this service owns.
/// The mutex is held just long enough to prune and count one key; no I/O or
/// await happens under the lock.
pub struct RateLimiter {
    quota: usize,
    window: Duration,
    hits: Mutex<HashMap<(Uuid, &'static str), VecDeque<Instant>>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_QUOTA, DEFAULT_WINDOW)
    }
}

impl RateLimiter {
    pub fn new(quota: usize, window: Duration) -> Self {
        Self {
            quota,
            window,
            hits: Mutex::new(HashMap::new()),
        }
    }

    /// Records one invocation for the caller on the given route, or rejects
    /// it with 429 if the quota for the current window is already spent.
    /// A rejected request does not consume quota.
    pub fn hit(&self, caller: Uuid, route: &'static str) -> Result<(), ApiError> {
        let now = Instant::now();
        let mut hits = self.hits.lock().unwrap_or_else(|e| e.into_inner());
        let timestamps = hits.entry((caller, route)).or_default();

        while let Some(&oldest) = timestamps.front() {
            if now.duration_since(oldest) >= self.window {
                timestamps.pop_front();
            } else {
                break;
            }
        }

        if timestamps.len() >= self.quota {
            tracing::warn!(caller = %caller, route, "rate limit exceeded");
            return Err(ApiError::TooManyRequests("Too many requests".to_string()));
        }

        timestamps.push_back(now);
        Ok(())
    }
}
