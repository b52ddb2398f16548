//! Fixed-window request limiting keyed by client identifier.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::RateLimitConfig;

const WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub max_requests: u32,
    pub window: Duration,
}

impl RateLimitPolicy {
    pub const fn per_minute(max_requests: u32) -> Self {
        Self {
            max_requests,
            window: WINDOW,
        }
    }
}

/// The two public route policies.
#[derive(Debug, Clone, Copy)]
pub struct PublicPolicies {
    pub read: RateLimitPolicy,
    pub write: RateLimitPolicy,
}

impl PublicPolicies {
    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self {
            read: RateLimitPolicy::per_minute(config.public_read_per_minute.max(1)),
            write: RateLimitPolicy::per_minute(config.public_write_per_minute.max(1)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
    /// Whole seconds until the window resets, rounded up.
    pub retry_after_secs: u64,
    /// Window reset as Unix epoch milliseconds.
    pub reset_at_ms: i64,
}

#[derive(Debug)]
struct WindowEntry {
    count: u32,
    reset_at: Instant,
}

/// Bounded map of client key to window.
///
/// At most `max_tracked` keys are held. When full, expired windows are
/// dropped first and then the window closest to expiry is evicted.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    entries: Arc<Mutex<HashMap<String, WindowEntry>>>,
    max_tracked: usize,
}

impl RateLimiter {
    pub fn new(max_tracked: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            max_tracked: max_tracked.max(1),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.max_tracked_clients)
    }

    pub async fn check(&self, key: &str, policy: RateLimitPolicy) -> RateLimitDecision {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        let expired = entries.get(key).is_none_or(|entry| now >= entry.reset_at);
        if expired {
            if !entries.contains_key(key) && entries.len() >= self.max_tracked {
                make_room(&mut entries, now, self.max_tracked);
            }
            let reset_at = now + policy.window;
            entries.insert(key.to_string(), WindowEntry { count: 1, reset_at });
            return decision(true, policy.max_requests.saturating_sub(1), reset_at, now);
        }

        let Some(entry) = entries.get_mut(key) else {
            return decision(true, policy.max_requests.saturating_sub(1), now + policy.window, now);
        };
        entry.count = entry.count.saturating_add(1);
        if entry.count > policy.max_requests {
            return decision(false, 0, entry.reset_at, now);
        }
        decision(true, policy.max_requests - entry.count, entry.reset_at, now)
    }

    /// Drops every window that has already reset. Returns how many were removed.
    pub async fn sweep(&self) -> usize {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        let before = entries.len();
        entries.retain(|_, entry| now < entry.reset_at);
        before - entries.len()
    }

    pub async fn tracked(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Sweeps every `interval` until `shutdown` is cancelled.
    pub fn spawn_sweeper(&self, interval: Duration, shutdown: CancellationToken) -> JoinHandle<()> {
        let limiter = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = ticker.tick() => {
                        let removed = limiter.sweep().await;
                        if removed > 0 {
                            debug!(removed, "Swept expired rate limit windows");
                        }
                    }
                }
            }
        })
    }
}

fn make_room(entries: &mut HashMap<String, WindowEntry>, now: Instant, max_tracked: usize) {
    entries.retain(|_, entry| now < entry.reset_at);
    while entries.len() >= max_tracked {
        let Some(oldest) = entries
            .iter()
            .min_by_key(|(_, entry)| entry.reset_at)
            .map(|(key, _)| key.clone())
        else {
            break;
        };
        entries.remove(&oldest);
    }
}

fn decision(allowed: bool, remaining: u32, reset_at: Instant, now: Instant) -> RateLimitDecision {
    let left = reset_at.saturating_duration_since(now);
    let retry_after_secs = left.as_millis().div_ceil(1000) as u64;
    let left_ms = i64::try_from(left.as_millis()).unwrap_or(i64::MAX);
    RateLimitDecision {
        allowed,
        remaining,
        retry_after_secs,
        reset_at_ms: Utc::now().timestamp_millis().saturating_add(left_ms),
    }
}
