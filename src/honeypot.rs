// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Honeypot spam filter.
//!
//! The contact form carries a `company` input hidden from humans. Bots that
//! fill it get the normal success response but nothing is mailed, so the
//! trap stays invisible to them.

use crate::validator::ContactSubmission;
use tracing::info;

/// Verdict on a validated submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpamVerdict {
    Human,
    Bot,
}

/// Classify a submission by its honeypot field.
pub fn inspect(submission: &ContactSubmission, client: &str) -> SpamVerdict {
    match submission.honeypot.as_deref().map(str::trim) {
        Some(trap) if !trap.is_empty() => {
            info!(client, "Contact honeypot triggered");
            SpamVerdict::Bot
        }
        _ => SpamVerdict::Human,
    }
}
