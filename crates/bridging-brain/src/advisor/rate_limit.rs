use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};
use tracing::warn;

/// Sliding one-hour request window per chat session.
#[derive(Debug)]
pub struct SessionRateLimiter {
    limit: usize,
    window: Duration,
    requests: Mutex<HashMap<String, VecDeque<DateTime<Utc>>>>,
}

impl SessionRateLimiter {
    pub fn per_hour(limit: usize) -> Self {
        Self {
            limit,
            window: Duration::hours(1),
            requests: Mutex::new(HashMap::new()),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Sessions with at least one request inside the current window.
    pub fn tracked_sessions(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Records the request and returns `true` when the session is still under its limit.
    /// Sessions whose window has emptied are dropped.
    pub fn check(&self, session_id: &str, now: DateTime<Utc>) -> bool {
        let mut requests = self.requests.lock().unwrap_or_else(PoisonError::into_inner);
        let window_start = now - self.window;
        requests.retain(|_, timestamps| {
            while timestamps.front().is_some_and(|seen| *seen <= window_start) {
                timestamps.pop_front();
            }
            !timestamps.is_empty()
        });
        let timestamps = requests.entry(session_id.to_string()).or_default();

        if timestamps.len() >= self.limit {
            warn!(session_id, limit = self.limit, "advisor rate limit reached");
            return false;
        }

        timestamps.push_back(now);
        true
    }
}
