// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Podcast feed adapter.
//!
//! Fetches the show's RSS document, extracts the episode list and keeps
//! the result for a fixed time before fetching again. A failed fetch is
//! never cached and never yields a partial list.

mod parser;

pub use parser::{format_duration, parse_feed, Episode};

use crate::clock::{Clock, SystemClock};
use crate::config::FeedConfig;
use crate::metrics::AppMetrics;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Feed retrieval errors.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Feed request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed host answered with status {0}")]
    Status(u16),

    #[error("Document is not an RSS feed")]
    NotRss,
}

/// Episode list together with when it was fetched.
#[derive(Debug, Clone)]
pub struct FeedSnapshot {
    pub episodes: Arc<Vec<Episode>>,
    pub fetched_at: DateTime<Utc>,
}

/// Fetches and caches the podcast episode list.
pub struct FeedService {
    client: reqwest::Client,
    url: String,
    ttl: chrono::Duration,
    clock: Arc<dyn Clock>,
    cache: RwLock<Option<FeedSnapshot>>,
    metrics: Option<Arc<AppMetrics>>,
}

impl FeedService {
    pub fn new(config: &FeedConfig) -> Result<Self, FeedError> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: &FeedConfig, clock: Arc<dyn Clock>) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        let ttl = chrono::Duration::from_std(config.cache_ttl())
            .unwrap_or_else(|_| chrono::Duration::days(1));

        Ok(Self {
            client,
            url: config.url.clone(),
            ttl,
            clock,
            cache: RwLock::new(None),
            metrics: None,
        })
    }

    pub fn with_metrics(mut self, metrics: Arc<AppMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Current episode list, from cache while it is fresh.
    pub async fn snapshot(&self) -> Result<FeedSnapshot, FeedError> {
        let now = self.clock.now();

        if let Some(cached) = self.cache.read().await.as_ref() {
            let fresh = cached
                .fetched_at
                .checked_add_signed(self.ttl)
                .map_or(true, |expires_at| now < expires_at);
            if fresh {
                debug!(age_secs = (now - cached.fetched_at).num_seconds(), "Serving cached podcast feed");
                self.record("hit");
                return Ok(cached.clone());
            }
        }

        let episodes = match self.fetch().await {
            Ok(episodes) => episodes,
            Err(err) => {
                warn!(url = %self.url, error = %err, "Failed to fetch podcast feed");
                self.record("error");
                return Err(err);
            }
        };

        let snapshot = FeedSnapshot {
            episodes: Arc::new(episodes),
            fetched_at: now,
        };
        *self.cache.write().await = Some(snapshot.clone());
        self.record("fetched");

        Ok(snapshot)
    }

    async fn fetch(&self) -> Result<Vec<Episode>, FeedError> {
        let response = self.client.get(&self.url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let episodes = parse_feed(&body)?;
        debug!(episodes = episodes.len(), "Fetched podcast feed");

        Ok(episodes)
    }

    fn record(&self, result: &str) {
        if let Some(metrics) = &self.metrics {
            metrics.record_feed(result);
        }
    }
}
