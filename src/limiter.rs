// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Fixed-window rate limiter for the contact endpoint.
//!
//! Each client identifier owns a counter and the instant its window ends.
//! The first request after that instant replaces the entry with a fresh
//! window; requests inside a window increment the counter until the limit
//! is reached. Denied requests leave the window untouched.
//!
//! State lives in process memory, so limits only hold per instance.

use crate::clock::{Clock, SystemClock};
use crate::config::RateLimitConfig;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Outcome of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    /// Whether the request may proceed
    pub allowed: bool,
    /// Configured requests per window
    pub limit: u32,
    /// Requests left in the current window
    pub remaining: u32,
    /// When the current window ends
    pub reset_at: DateTime<Utc>,
}

impl RateLimitDecision {
    /// Whole seconds until the window ends, rounded up.
    pub fn retry_after_secs(&self, now: DateTime<Utc>) -> u64 {
        let millis = (self.reset_at - now).num_milliseconds();
        if millis <= 0 {
            0
        } else {
            (millis as u64).div_ceil(1000)
        }
    }
}

/// Counter for one client.
#[derive(Debug, Clone, Copy)]
struct WindowEntry {
    count: u32,
    reset_at: DateTime<Utc>,
}

/// Thread-safe fixed-window rate limiter.
pub struct RateLimiter {
    limit: u32,
    window: chrono::Duration,
    clock: Arc<dyn Clock>,
    entries: RwLock<HashMap<String, WindowEntry>>,
}

impl RateLimiter {
    /// Create a rate limiter backed by the system clock.
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a rate limiter reading time from `clock`.
    pub fn with_clock(config: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        let window = chrono::Duration::from_std(config.window_duration())
            .unwrap_or_else(|_| chrono::Duration::days(365));

        Self {
            limit: config.max_requests,
            window,
            clock,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Count a request from `identifier` and decide whether it may proceed.
    pub async fn check(&self, identifier: &str) -> RateLimitDecision {
        let now = self.clock.now();
        let mut entries = self.entries.write().await;

        let window_end = self.window_end(now);

        let entry = entries
            .entry(identifier.to_string())
            .or_insert(WindowEntry {
                count: 0,
                reset_at: window_end,
            });

        if entry.count == 0 || now > entry.reset_at {
            *entry = WindowEntry {
                count: 1,
                reset_at: window_end,
            };
            return self.decision(true, self.limit.saturating_sub(1), entry.reset_at);
        }

        if entry.count >= self.limit {
            debug!(identifier, reset_at = %entry.reset_at, "Contact rate limit exceeded");
            return self.decision(false, 0, entry.reset_at);
        }

        entry.count += 1;
        self.decision(true, self.limit - entry.count, entry.reset_at)
    }

    /// Drop every entry whose window has ended. Returns how many were removed.
    pub async fn cleanup(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| now <= entry.reset_at);
        let removed = before - entries.len();

        debug!(removed, remaining = entries.len(), "Rate limiter sweep");
        removed
    }

    /// Number of clients currently tracked.
    pub async fn tracked_clients(&self) -> usize {
        self.entries.read().await.len()
    }

    /// End of a window opened at `now`, saturating at the last representable instant.
    fn window_end(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_add_signed(self.window)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    fn decision(&self, allowed: bool, remaining: u32, reset_at: DateTime<Utc>) -> RateLimitDecision {
        RateLimitDecision {
            allowed,
            limit: self.limit,
            remaining,
            reset_at,
        }
    }
}
