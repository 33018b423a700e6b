//! In-process fixed-window rate limiter.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::policy::RateLimitPolicy;

/// Counter for one (client, route) pair.
#[derive(Clone, Debug)]
struct Window {
    count: u32,
    started_at: Instant,
    length: Duration,
}

impl Window {
    fn open(now: Instant, length: Duration) -> Self {
        Self {
            count: 0,
            started_at: now,
            length,
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started_at) >= self.length
    }

    fn time_left(&self, now: Instant) -> Duration {
        self.length
            .saturating_sub(now.saturating_duration_since(self.started_at))
    }
}

/// Outcome of a rate-limit check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLimitDecision {
    /// Whether the request may proceed
    pub allowed: bool,
    /// Policy maximum
    pub limit: u32,
    /// Requests left in the current window
    pub remaining: u32,
    /// Time until the current window closes
    pub reset_after: Duration,
    /// Set when denied: how long to wait before retrying
    pub retry_after: Option<Duration>,
}

impl RateLimitDecision {
    /// `reset_after` rounded up to whole seconds.
    pub fn reset_after_secs(&self) -> u64 {
        ceil_secs(self.reset_after)
    }

    /// `retry_after` rounded up to whole seconds, never below 1.
    pub fn retry_after_secs(&self) -> Option<u64> {
        self.retry_after.map(|d| ceil_secs(d).max(1))
    }
}

fn ceil_secs(d: Duration) -> u64 {
    d.as_secs() + u64::from(d.subsec_nanos() > 0)
}

/// Fixed-window rate limiter.
///
/// Thread-safe; every check is a single read-modify-write on the
/// window's map shard.
#[derive(Debug, Default)]
pub struct RateLimiter {
    windows: DashMap<String, Window>,
}

impl RateLimiter {
    /// Creates an empty limiter.
    pub fn new() -> Self {
        Self::default()
    }

    fn key(client: &str, route: &str) -> String {
        format!("{}|{}", client, route)
    }

    /// Counts a request from `client` on `route` against `policy`.
    ///
    /// Denied requests are not counted.
    pub fn check(&self, client: &str, route: &str, policy: &RateLimitPolicy) -> RateLimitDecision {
        let now = Instant::now();
        let mut window = self
            .windows
            .entry(Self::key(client, route))
            .or_insert_with(|| Window::open(now, policy.window));

        if window.is_expired(now) {
            *window = Window::open(now, policy.window);
        }

        let reset_after = window.time_left(now);

        if window.count < policy.max_requests {
            window.count += 1;
            RateLimitDecision {
                allowed: true,
                limit: policy.max_requests,
                remaining: policy.max_requests - window.count,
                reset_after,
                retry_after: None,
            }
        } else {
            drop(window);
            warn!(
                client,
                route,
                limit = policy.max_requests,
                retry_after_ms = reset_after.as_millis() as u64,
                "Rate limit exceeded"
            );
            RateLimitDecision {
                allowed: false,
                limit: policy.max_requests,
                remaining: 0,
                reset_after,
                retry_after: Some(reset_after),
            }
        }
    }

    /// Forgets the window for a client on a route.
    pub fn reset(&self, client: &str, route: &str) {
        self.windows.remove(&Self::key(client, route));
    }

    /// Removes all windows whose interval has elapsed.
    ///
    /// Returns the number removed.
    pub fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let mut removed = 0;
        self.windows.retain(|_, w| {
            let keep = !w.is_expired(now);
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }

    /// Spawns a task that sweeps expired windows every `every`.
    ///
    /// The task stops once the limiter is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let limiter = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(limiter) = limiter.upgrade() else {
                    break;
                };
                let swept = limiter.sweep_expired();
                if swept > 0 {
                    debug!(swept, remaining = limiter.len(), "Swept expired rate-limit windows");
                }
            }
        })
    }

    /// Returns the number of tracked windows.
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    /// Returns true if no windows are tracked.
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}
