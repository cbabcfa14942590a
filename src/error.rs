// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP-facing errors and their response bodies.

use crate::limiter::RateLimitDecision;
use crate::validator::FieldError;
use axum::{
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Errors returned by the API handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Too many requests")]
    RateLimited {
        decision: RateLimitDecision,
        retry_after_secs: u64,
    },

    #[error("Invalid form data")]
    InvalidForm(Vec<FieldError>),

    /// Delivery failed or the body could not be read. `details` is only
    /// filled outside production.
    #[error("Failed to send message")]
    SendFailed { details: Option<String> },

    #[error("Failed to fetch podcast feed")]
    FeedUnavailable,

    #[error("Method not allowed")]
    MethodNotAllowed,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse<D: Serialize> {
    pub error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<D>,
}

/// 429 response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitedResponse {
    pub error: &'static str,
    pub retry_after: u64,
}

/// One rejected form field.
#[derive(Debug, Serialize)]
pub struct FieldErrorBody {
    pub field: &'static str,
    pub message: String,
}

impl From<&FieldError> for FieldErrorBody {
    fn from(err: &FieldError) -> Self {
        Self {
            field: err.field,
            message: err.error.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::RateLimited {
                decision,
                retry_after_secs,
            } => (
                StatusCode::TOO_MANY_REQUESTS,
                [
                    (header::RETRY_AFTER, retry_after_secs.to_string()),
                    (
                        HeaderName::from_static("x-ratelimit-limit"),
                        decision.limit.to_string(),
                    ),
                    (
                        HeaderName::from_static("x-ratelimit-remaining"),
                        decision.remaining.to_string(),
                    ),
                    (
                        HeaderName::from_static("x-ratelimit-reset"),
                        decision.reset_at.timestamp_millis().to_string(),
                    ),
                ],
                Json(RateLimitedResponse {
                    error: "Too many requests. Please try again later.",
                    retry_after: retry_after_secs,
                }),
            )
                .into_response(),
            ApiError::InvalidForm(errors) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "Invalid form data",
                    details: Some(errors.iter().map(FieldErrorBody::from).collect::<Vec<_>>()),
                }),
            )
                .into_response(),
            ApiError::SendFailed { details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to send message. Please try again later.",
                    details,
                }),
            )
                .into_response(),
            ApiError::FeedUnavailable => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::<()> {
                    error: "Failed to fetch podcast feed",
                    details: None,
                }),
            )
                .into_response(),
            ApiError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                Json(ErrorResponse::<()> {
                    error: "Method not allowed",
                    details: None,
                }),
            )
                .into_response(),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ApiError>;
