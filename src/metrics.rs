// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus counters for contact intake, mail delivery and feed fetches.
//!
//! Counters live in a registry owned by the application rather than the
//! global default registry, so several app instances (tests) can coexist.

use crate::mailer::Provider;
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

/// Outcome labels for `contact_submissions_total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Accepted,
    Spam,
    Invalid,
    RateLimited,
    Malformed,
    Failed,
}

impl SubmissionOutcome {
    fn as_str(self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Spam => "spam",
            Self::Invalid => "invalid",
            Self::RateLimited => "rate_limited",
            Self::Malformed => "malformed",
            Self::Failed => "failed",
        }
    }
}

/// Application metrics.
pub struct AppMetrics {
    registry: Registry,
    submissions: IntCounterVec,
    dispatches: IntCounterVec,
    feed_requests: IntCounterVec,
}

impl AppMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let submissions = IntCounterVec::new(
            Opts::new("contact_submissions_total", "Contact form submissions by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(submissions.clone()))?;

        let dispatches = IntCounterVec::new(
            Opts::new("mail_dispatch_total", "Mail transport attempts by provider and result"),
            &["provider", "result"],
        )?;
        registry.register(Box::new(dispatches.clone()))?;

        let feed_requests = IntCounterVec::new(
            Opts::new("podcast_feed_requests_total", "Podcast feed lookups by result"),
            &["result"],
        )?;
        registry.register(Box::new(feed_requests.clone()))?;

        Ok(Self {
            registry,
            submissions,
            dispatches,
            feed_requests,
        })
    }

    pub fn record_submission(&self, outcome: SubmissionOutcome) {
        self.submissions.with_label_values(&[outcome.as_str()]).inc();
    }

    pub fn record_dispatch(&self, provider: Provider, result: &str) {
        self.dispatches
            .with_label_values(&[provider.as_str(), result])
            .inc();
    }

    pub fn record_feed(&self, result: &str) {
        self.feed_requests.with_label_values(&[result]).inc();
    }

    /// Current value of `contact_submissions_total{outcome}`.
    pub fn submissions(&self, outcome: SubmissionOutcome) -> u64 {
        self.submissions.with_label_values(&[outcome.as_str()]).get()
    }

    /// Text exposition of every registered metric.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
