// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Marketing Site API
//!
//! Backend for the consulting marketing site:
//!
//! - Contact form intake (`POST /contact`) with per-client fixed-window
//!   rate limiting, field validation, a honeypot spam filter and mail
//!   delivery over an ordered transport fallback chain (Resend, SMTP,
//!   log only)
//! - Podcast episode list (`GET /podcast-feed`) extracted from the
//!   show's RSS feed and cached in-process

pub mod client_ip;
pub mod clock;
pub mod config;
pub mod error;
pub mod feed;
pub mod handlers;
pub mod honeypot;
pub mod limiter;
pub mod mailer;
pub mod metrics;
pub mod validator;

pub use config::Config;
pub use handlers::{router, AppState};
pub use limiter::{RateLimitDecision, RateLimiter};
pub use validator::{ContactSubmission, ContactValidator};
