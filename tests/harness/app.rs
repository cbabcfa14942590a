// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! In-memory application wiring for HTTP-level tests.

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{HeaderMap, Request, StatusCode},
    Router,
};
use marketing_site_api::{
    config::Config,
    feed::FeedService,
    handlers::{router, AppState},
    limiter::RateLimiter,
    mailer::{
        Delivery, FailurePolicy, MailDispatcher, MailTransport, Notification, Provider,
        TransportError,
    },
    metrics::AppMetrics,
    validator::ContactValidator,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// Mail transport double that records every notification it is given.
#[derive(Clone)]
pub struct RecordingTransport {
    provider: Provider,
    policy: FailurePolicy,
    fail: bool,
    pub sent: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingTransport {
    /// A transport that always succeeds.
    pub fn ok(provider: Provider) -> Self {
        Self {
            provider,
            policy: FailurePolicy::Surface,
            fail: false,
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A transport that always fails with `policy`.
    pub fn failing(provider: Provider, policy: FailurePolicy) -> Self {
        Self {
            provider,
            policy,
            fail: true,
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }

    pub fn boxed(&self) -> Box<dyn MailTransport> {
        Box::new(self.clone())
    }
}

#[async_trait]
impl MailTransport for RecordingTransport {
    fn provider(&self) -> Provider {
        self.provider
    }

    fn failure_policy(&self) -> FailurePolicy {
        self.policy
    }

    async fn send(&self, notification: &Notification) -> Result<Delivery, TransportError> {
        self.sent.lock().unwrap().push(notification.clone());
        if self.fail {
            return Err(TransportError::Rejected {
                status: "550".to_string(),
                body: "mailbox unavailable".to_string(),
            });
        }
        Ok(Delivery {
            message_id: Some("recorded".to_string()),
        })
    }
}

/// Application state with an explicit transport chain.
pub fn state_with(config: Config, transports: Vec<Box<dyn MailTransport>>) -> Arc<AppState> {
    let metrics = Arc::new(AppMetrics::new().unwrap());
    let dispatcher = MailDispatcher::new(config.mail.from.clone(), config.mail.to.clone(), transports)
        .with_metrics(metrics.clone());
    let feed = FeedService::new(&config.feed)
        .unwrap()
        .with_metrics(metrics.clone());

    Arc::new(AppState {
        limiter: RateLimiter::new(config.rate_limit.clone()),
        validator: ContactValidator::new(),
        dispatcher,
        feed,
        metrics,
        config,
    })
}

pub fn app(state: &Arc<AppState>) -> Router {
    router(state.clone())
}

/// A submission every validator rule accepts.
pub fn valid_submission() -> Value {
    json!({
        "name": "Ada Lovelace",
        "email": "ada@example.com",
        "org": "Analytical Engines",
        "message": "We would like to talk about a fractional CTO engagement.",
        "company": "",
    })
}

/// `POST /contact` with a JSON body, optionally from a forwarded address.
pub fn contact_request(body: &Value, client: Option<&str>) -> Request<Body> {
    raw_contact_request(body.to_string(), client)
}

pub fn raw_contact_request(body: String, client: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/contact")
        .header("content-type", "application/json");
    if let Some(ip) = client {
        builder = builder.header("x-forwarded-for", ip);
    }
    builder.body(Body::from(body)).unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

/// Send `request` and return status, headers and the body as JSON
/// (`Value::Null` when the body is not JSON).
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, headers, body)
}

/// Send `request` and return status and the raw body text.
pub async fn send_text(app: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}
