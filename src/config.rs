// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the marketing site API.
//!
//! Values come from environment variables (see [`Config::from_env`]); every
//! setting has a default so the service starts with nothing configured.
//! Missing mail credentials are a supported setup: submissions are then
//! logged instead of mailed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Configuration for the marketing site API service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Deployment environment (default: production)
    #[serde(default)]
    pub environment: Environment,

    /// Read the client address from `X-Forwarded-For` / `X-Real-IP` (default: true)
    #[serde(default = "default_true")]
    pub trust_proxy_headers: bool,

    /// Origins allowed by CORS; empty allows any origin
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,

    /// Contact form rate limiting
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Mail delivery
    #[serde(default)]
    pub mail: MailConfig,

    /// Podcast RSS feed
    #[serde(default)]
    pub feed: FeedConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Production,
    Development,
}

impl Environment {
    /// Whether internal error details may be returned to clients.
    pub fn exposes_error_details(self) -> bool {
        self == Self::Development
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "development" | "dev" => Ok(Self::Development),
            other => Err(ConfigError::UnknownEnvironment(other.to_string())),
        }
    }
}

/// Fixed-window rate limiting for the contact endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Maximum submissions per window per client (default: 5)
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    /// Window length in seconds (default: 900)
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    /// Interval of the expired-entry sweep in seconds (default: 900)
    #[serde(default = "default_window_secs")]
    pub cleanup_interval_secs: u64,
}

/// Mail delivery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// Recipient of contact notifications
    #[serde(default = "default_to")]
    pub to: String,

    /// Sender mailbox, `Name <address>` or bare address
    #[serde(default = "default_from")]
    pub from: String,

    /// Timeout for a single transport attempt in seconds (default: 10)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Resend transactional API; tried first when present
    #[serde(default)]
    pub resend: Option<ResendConfig>,

    /// SMTP relay; tried after Resend when present
    #[serde(default)]
    pub smtp: Option<SmtpConfig>,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ResendConfig {
    pub api_key: String,

    #[serde(default = "default_resend_endpoint")]
    pub endpoint: String,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub host: String,

    #[serde(default = "default_smtp_port")]
    pub port: u16,

    /// Implicit TLS; STARTTLS otherwise
    #[serde(default)]
    pub secure: bool,

    pub user: String,

    pub password: String,
}

impl fmt::Debug for ResendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResendConfig")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("secure", &self.secure)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Podcast feed configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// RSS document URL
    #[serde(default = "default_feed_url")]
    pub url: String,

    /// How long a fetched episode list is served before re-fetching (default: 3600)
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Fetch timeout in seconds (default: 10)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

/// Invalid configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown environment: {0}")]
    UnknownEnvironment(String),

    #[error("Invalid URL for {name}: {url}")]
    InvalidUrl { name: &'static str, url: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("{name} must be at most {max} seconds")]
    TooLong { name: &'static str, max: u64 },
}

/// Upper bound for every duration setting (one year).
pub const MAX_DURATION_SECS: u64 = 365 * 24 * 60 * 60;

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_max_requests() -> u32 {
    5
}

fn default_window_secs() -> u64 {
    15 * 60
}

fn default_to() -> String {
    "contact@ferreiracto.com".to_string()
}

fn default_from() -> String {
    "Ferreira CTO <no-reply@ferreiracto.com>".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_resend_endpoint() -> String {
    "https://api.resend.com/emails".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_feed_url() -> String {
    "https://anchor.fm/s/10871358c/podcast/rss".to_string()
}

fn default_cache_ttl_secs() -> u64 {
    3600
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            environment: Environment::default(),
            trust_proxy_headers: default_true(),
            cors_allowed_origins: Vec::new(),
            rate_limit: RateLimitConfig::default(),
            mail: MailConfig::default(),
            feed: FeedConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
            cleanup_interval_secs: default_window_secs(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            to: default_to(),
            from: default_from(),
            timeout_secs: default_timeout_secs(),
            resend: None,
            smtp: None,
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: default_feed_url(),
            cache_ttl_secs: default_cache_ttl_secs(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl RateLimitConfig {
    /// Get the rate window duration
    pub fn window_duration(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    /// Get the sweep interval
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }
}

impl MailConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl FeedConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// - `BIND_ADDR`, `APP_ENV`, `TRUST_PROXY_HEADERS`, `CORS_ALLOWED_ORIGINS`
    /// - `CONTACT_RATE_LIMIT`, `CONTACT_RATE_WINDOW_SECS`, `CONTACT_RATE_CLEANUP_SECS`
    /// - `CONTACT_TO_EMAIL`, `CONTACT_FROM_EMAIL`, `MAIL_TIMEOUT_SECS`
    /// - `RESEND_API_KEY`, `RESEND_API_URL`
    /// - `SMTP_HOST`, `SMTP_PORT`, `SMTP_SECURE`, `SMTP_USER`, `SMTP_PASS`
    /// - `PODCAST_RSS_URL`, `PODCAST_CACHE_SECS`, `PODCAST_TIMEOUT_SECS`
    /// - `METRICS_ENABLED`
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match env_opt("APP_ENV") {
            Some(value) => value.parse()?,
            None => Environment::default(),
        };

        let resend = env_opt("RESEND_API_KEY").map(|api_key| ResendConfig {
            api_key,
            endpoint: env_opt("RESEND_API_URL").unwrap_or_else(default_resend_endpoint),
        });

        let smtp = match (env_opt("SMTP_HOST"), env_opt("SMTP_USER"), env_opt("SMTP_PASS")) {
            (Some(host), Some(user), Some(password)) => Some(SmtpConfig {
                host,
                port: env_parse("SMTP_PORT", default_smtp_port()),
                secure: env_parse("SMTP_SECURE", false),
                user,
                password,
            }),
            _ => None,
        };

        let config = Config {
            bind_addr: env_opt("BIND_ADDR").unwrap_or_else(default_bind_addr),
            environment,
            trust_proxy_headers: env_parse("TRUST_PROXY_HEADERS", true),
            cors_allowed_origins: env_opt("CORS_ALLOWED_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
            rate_limit: RateLimitConfig {
                max_requests: env_parse("CONTACT_RATE_LIMIT", default_max_requests()),
                window_secs: env_parse("CONTACT_RATE_WINDOW_SECS", default_window_secs()),
                cleanup_interval_secs: env_parse(
                    "CONTACT_RATE_CLEANUP_SECS",
                    default_window_secs(),
                ),
            },
            mail: MailConfig {
                to: env_opt("CONTACT_TO_EMAIL").unwrap_or_else(default_to),
                from: env_opt("CONTACT_FROM_EMAIL").unwrap_or_else(default_from),
                timeout_secs: env_parse("MAIL_TIMEOUT_SECS", default_timeout_secs()),
                resend,
                smtp,
            },
            feed: FeedConfig {
                url: env_opt("PODCAST_RSS_URL").unwrap_or_else(default_feed_url),
                cache_ttl_secs: env_parse("PODCAST_CACHE_SECS", default_cache_ttl_secs()),
                timeout_secs: env_parse("PODCAST_TIMEOUT_SECS", default_timeout_secs()),
            },
            metrics: MetricsConfig {
                enabled: env_parse("METRICS_ENABLED", true),
                ..Default::default()
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject values the service cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rate_limit.max_requests == 0 {
            return Err(ConfigError::Zero("CONTACT_RATE_LIMIT"));
        }
        if self.rate_limit.window_secs == 0 {
            return Err(ConfigError::Zero("CONTACT_RATE_WINDOW_SECS"));
        }
        if self.rate_limit.cleanup_interval_secs == 0 {
            return Err(ConfigError::Zero("CONTACT_RATE_CLEANUP_SECS"));
        }

        for (name, secs) in [
            ("CONTACT_RATE_WINDOW_SECS", self.rate_limit.window_secs),
            ("CONTACT_RATE_CLEANUP_SECS", self.rate_limit.cleanup_interval_secs),
            ("PODCAST_CACHE_SECS", self.feed.cache_ttl_secs),
            ("PODCAST_TIMEOUT_SECS", self.feed.timeout_secs),
            ("MAIL_TIMEOUT_SECS", self.mail.timeout_secs),
        ] {
            if secs > MAX_DURATION_SECS {
                return Err(ConfigError::TooLong {
                    name,
                    max: MAX_DURATION_SECS,
                });
            }
        }

        check_http_url("PODCAST_RSS_URL", &self.feed.url)?;
        if let Some(resend) = &self.mail.resend {
            check_http_url("RESEND_API_URL", &resend.endpoint)?;
        }

        Ok(())
    }
}

fn check_http_url(name: &'static str, value: &str) -> Result<(), ConfigError> {
    match Url::parse(value) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host_str().is_some() => Ok(()),
        _ => Err(ConfigError::InvalidUrl {
            name,
            url: value.to_string(),
        }),
    }
}

/// Non-empty environment variable.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parsed environment variable, falling back to `default` when unset or invalid.
fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    env_opt(key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
