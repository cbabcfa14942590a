// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the marketing site API.
//!
//! A contact submission passes, in order: rate limiter, validator, honeypot,
//! mail dispatcher. The rate limiter runs first so every attempt counts,
//! including malformed and honeypot submissions.

use crate::client_ip::ClientId;
use crate::config::Config;
use crate::error::{ApiError, Result};
use crate::feed::{Episode, FeedError, FeedService};
use crate::honeypot::{self, SpamVerdict};
use crate::limiter::RateLimiter;
use crate::mailer::{MailDispatcher, TransportError};
use crate::metrics::{AppMetrics, SubmissionOutcome};
use crate::validator::{ContactForm, ContactValidator};
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Shared application state.
pub struct AppState {
    pub limiter: RateLimiter,
    pub validator: ContactValidator,
    pub dispatcher: MailDispatcher,
    pub feed: FeedService,
    pub metrics: Arc<AppMetrics>,
    pub config: Config,
}

/// Failures while assembling the application state.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("Metrics registry: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("Mail transport: {0}")]
    Mail(#[from] TransportError),

    #[error("Feed client: {0}")]
    Feed(#[from] FeedError),
}

impl AppState {
    /// Build every component from `config`.
    pub fn new(config: Config) -> std::result::Result<Self, InitError> {
        let metrics = Arc::new(AppMetrics::new()?);
        let dispatcher = MailDispatcher::from_config(&config.mail)?.with_metrics(metrics.clone());
        let feed = FeedService::new(&config.feed)?.with_metrics(metrics.clone());

        Ok(Self {
            limiter: RateLimiter::new(config.rate_limit.clone()),
            validator: ContactValidator::new(),
            dispatcher,
            feed,
            metrics,
            config,
        })
    }
}

/// Successful contact submission body.
#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    /// Return at most this many episodes; ignored unless a non-negative integer
    pub limit: Option<String>,
}

impl FeedQuery {
    fn limit(&self) -> Option<usize> {
        self.limit.as_deref().and_then(|raw| raw.trim().parse().ok())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedResponse {
    pub episodes: Vec<Episode>,
    pub updated_at: String,
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    let mut router = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/contact", post(submit_contact).get(contact_method_not_allowed))
        .route("/podcast-feed", get(podcast_feed));

    if state.config.metrics.enabled {
        router = router.route(&state.config.metrics.path, get(metrics));
    }

    let cors = cors_layer(&state.config);

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    if config.cors_allowed_origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "marketing-site-api",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Accept a contact form submission.
pub async fn submit_contact(
    State(state): State<Arc<AppState>>,
    client: ClientId,
    body: Bytes,
) -> Result<Json<ContactResponse>> {
    let decision = state.limiter.check(client.as_str()).await;
    if !decision.allowed {
        let retry_after_secs = decision.retry_after_secs(state.limiter.now());
        info!(%client, retry_after_secs, "Contact submission rate limited");
        state.metrics.record_submission(SubmissionOutcome::RateLimited);
        return Err(ApiError::RateLimited {
            decision,
            retry_after_secs,
        });
    }

    let expose_details = state.config.environment.exposes_error_details();

    let form = match parse_form(&body) {
        Ok(form) => form,
        Err(err) => {
            warn!(%client, error = %err, "Unreadable contact form body");
            state.metrics.record_submission(SubmissionOutcome::Malformed);
            return Err(ApiError::SendFailed {
                details: expose_details.then(|| format!("invalid form data: {err}")),
            });
        }
    };

    let submission = match state.validator.validate(&form) {
        Ok(submission) => submission,
        Err(errors) => {
            let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
            info!(%client, ?fields, "Contact form validation failed");
            state.metrics.record_submission(SubmissionOutcome::Invalid);
            return Err(ApiError::InvalidForm(errors));
        }
    };

    if honeypot::inspect(&submission, client.as_str()) == SpamVerdict::Bot {
        state.metrics.record_submission(SubmissionOutcome::Spam);
        return Ok(Json(ContactResponse {
            success: true,
            message: None,
        }));
    }

    match state.dispatcher.dispatch(&submission, client.known()).await {
        Ok(outcome) => {
            info!(%client, provider = %outcome.provider, "Contact submission accepted");
            state.metrics.record_submission(SubmissionOutcome::Accepted);
            Ok(Json(ContactResponse {
                success: true,
                message: Some("Message sent successfully!"),
            }))
        }
        Err(err) => {
            error!(%client, error = %err, "Contact submission could not be delivered");
            state.metrics.record_submission(SubmissionOutcome::Failed);
            Err(ApiError::SendFailed {
                details: expose_details.then(|| err.to_string()),
            })
        }
    }
}

/// Decode a contact body, which must be a JSON object.
fn parse_form(body: &[u8]) -> std::result::Result<ContactForm, serde_json::Error> {
    match serde_json::from_slice::<serde_json::Value>(body)? {
        value @ serde_json::Value::Object(_) => serde_json::from_value(value),
        _ => Err(serde::de::Error::custom("expected a JSON object")),
    }
}

/// `GET /contact` is not supported.
pub async fn contact_method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Latest podcast episodes.
pub async fn podcast_feed(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FeedQuery>,
) -> Result<Json<FeedResponse>> {
    let snapshot = state
        .feed
        .snapshot()
        .await
        .map_err(|_| ApiError::FeedUnavailable)?;

    let limit = query.limit().unwrap_or(snapshot.episodes.len());
    let episodes = snapshot.episodes.iter().take(limit).cloned().collect();

    Ok(Json(FeedResponse {
        episodes,
        updated_at: snapshot
            .fetched_at
            .to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}

/// Prometheus text exposition.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    match state.metrics.render() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(err) => {
            error!(error = %err, "Failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
