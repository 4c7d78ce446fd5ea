//! In-process limiter for failed attempts: logins keyed by normalized email,
//! OTP checks keyed by user id.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use crate::config::AuthThrottleConfig;

/// Map size at which stale entries are swept on the next failure.
const SWEEP_THRESHOLD: usize = 1024;

#[derive(Debug, Clone)]
struct AttemptEntry {
    failures: u32,
    window_start: Instant,
    locked_until: Option<Instant>,
}

#[derive(Debug)]
pub struct LoginThrottle {
    max_attempts: u32,
    window: Duration,
    lockout: Duration,
    entries: Mutex<HashMap<String, AttemptEntry>>,
}

impl LoginThrottle {
    #[must_use]
    pub fn new(config: &AuthThrottleConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            window: Duration::from_secs(config.window_seconds),
            lockout: Duration::from_secs(config.lockout_seconds),
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Remaining lockout if `key` is currently locked out.
    pub async fn check(&self, key: &str) -> Option<Duration> {
        self.check_at(key, Instant::now()).await
    }

    /// Counts a failure for `key`. Returns the lockout when this failure
    /// reached the limit.
    pub async fn record_failure(&self, key: &str) -> Option<Duration> {
        self.record_failure_at(key, Instant::now()).await
    }

    pub async fn record_success(&self, key: &str) {
        self.entries.lock().await.remove(key);
    }

    async fn check_at(&self, key: &str, now: Instant) -> Option<Duration> {
        let mut entries = self.entries.lock().await;
        let locked_until = entries.get(key)?.locked_until;

        match locked_until {
            Some(until) if until > now => Some(until - now),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    async fn record_failure_at(&self, key: &str, now: Instant) -> Option<Duration> {
        let mut entries = self.entries.lock().await;

        if entries.len() >= SWEEP_THRESHOLD {
            entries.retain(|_, entry| !self.is_stale(entry, now));
        }

        let entry = entries.entry(key.to_string()).or_insert(AttemptEntry {
            failures: 0,
            window_start: now,
            locked_until: None,
        });

        if now.duration_since(entry.window_start) > self.window {
            entry.failures = 0;
            entry.window_start = now;
        }

        entry.failures += 1;
        if entry.failures >= self.max_attempts {
            entry.locked_until = Some(now + self.lockout);
            return Some(self.lockout);
        }

        None
    }

    /// Outside its counting window and not locked.
    fn is_stale(&self, entry: &AttemptEntry, now: Instant) -> bool {
        now.duration_since(entry.window_start) > self.window
            && entry.locked_until.is_none_or(|until| until <= now)
    }
}
