//! Per-connection inbound event rate limiting.
//!
//! A sliding one-second window caps how many events a single connection may
//! send. Exceeding the limit is the only condition under which the server
//! closes a connection; room state survives and reconnecting is allowed.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::{Duration, Instant};
use uuid::Uuid;

/// Rate limiting configuration
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Sliding window length
    pub window: Duration,
    /// Maximum inbound events per window
    pub max_events: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(1),
            max_events: 20,
        }
    }
}

/// Event timestamps inside the current window for one connection.
#[derive(Debug, Default)]
struct ConnectionWindow {
    events: VecDeque<Instant>,
}

impl ConnectionWindow {
    /// Drop timestamps older than the window, then admit or reject.
    fn try_event(&mut self, now: Instant, config: &RateLimitConfig) -> bool {
        while let Some(oldest) = self.events.front() {
            if now.duration_since(*oldest) >= config.window {
                self.events.pop_front();
            } else {
                break;
            }
        }
        if self.events.len() < config.max_events as usize {
            self.events.push_back(now);
            true
        } else {
            false
        }
    }

    fn last_event(&self) -> Option<Instant> {
        self.events.back().copied()
    }
}

/// Rate limiter keyed by connection id.
pub struct ConnectionRateLimiter {
    config: RateLimitConfig,
    entries: Arc<RwLock<HashMap<Uuid, ConnectionWindow>>>,
}

impl ConnectionRateLimiter {
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Record one inbound event for `connection`. `Err` means the connection
    /// must be closed.
    pub async fn check_event(&self, connection: &Uuid) -> Result<(), RateLimitExceeded> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let entry = entries.entry(*connection).or_default();

        if entry.try_event(now, &self.config) {
            Ok(())
        } else {
            Err(RateLimitExceeded {
                max_events: self.config.max_events,
                window: self.config.window,
            })
        }
    }

    /// Forget a connection once its socket closes.
    pub async fn forget(&self, connection: &Uuid) {
        self.entries.write().await.remove(connection);
    }

    /// Clean up entries idle past the window to prevent memory leaks.
    pub async fn cleanup_old_entries(&self) {
        let now = Instant::now();
        let threshold = self.config.window * 2;
        let mut entries = self.entries.write().await;
        entries.retain(|_, window| {
            window
                .last_event()
                .is_some_and(|last| now.duration_since(last) < threshold)
        });
    }

    /// Start a background task to periodically clean up old entries.
    pub fn start_cleanup_task(self: Arc<Self>) {
        let limiter = Arc::clone(&self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(limiter.config.window.max(Duration::from_secs(30)));
            loop {
                interval.tick().await;
                limiter.cleanup_old_entries().await;
            }
        });
    }
}

/// Raised when a connection exceeds its event budget.
#[derive(Debug, Clone)]
pub struct RateLimitExceeded {
    pub max_events: u32,
    pub window: Duration,
}

impl std::fmt::Display for RateLimitExceeded {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Rate limit exceeded: more than {} events in {} ms",
            self.max_events,
            self.window.as_millis()
        )
    }
}

impl std::error::Error for RateLimitExceeded {}
