// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact form validator.
//!
//! Checks every field independently and reports all failures at once so
//! the form can highlight each offending input:
//! - name: 2 to 100 characters
//! - email: `local@domain.tld` shape, at most 255 characters
//! - org: at most 100 characters, optional
//! - message: 10 to 5000 characters
//!
//! Values are trimmed before checking; email is lower-cased. Non-string
//! values are rejected rather than coerced.

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::debug;

const NAME_MIN: usize = 2;
const NAME_MAX: usize = 100;
const EMAIL_MAX: usize = 255;
const ORG_MAX: usize = 100;
const MESSAGE_MIN: usize = 10;
const MESSAGE_MAX: usize = 5000;

static EMAIL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@.]+(\.[^\s@.]+)+$").unwrap());

/// Contact form as submitted, before any checking.
///
/// Fields stay untyped JSON so a number in place of a string is reported
/// as a field error instead of failing the whole body.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub email: Option<Value>,
    #[serde(default)]
    pub org: Option<Value>,
    #[serde(default)]
    pub message: Option<Value>,
    /// Honeypot, hidden from humans
    #[serde(default)]
    pub company: Option<Value>,
}

/// A well-formed, normalized contact submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    pub name: String,
    pub email: String,
    pub organization: Option<String>,
    pub message: String,
    pub honeypot: Option<String>,
}

/// Why a single field was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required")]
    Missing,

    #[error("Expected string")]
    NotAString,

    #[error("{label} must be at least {min} characters")]
    TooShort { label: &'static str, min: usize },

    #[error("{label} must be less than {max} characters")]
    TooLong { label: &'static str, max: usize },

    #[error("Please enter a valid email address")]
    InvalidEmail,
}

/// A rejected field and the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub error: ValidationError,
}

impl FieldError {
    fn new(field: &'static str, error: ValidationError) -> Self {
        Self { field, error }
    }
}

/// Contact form validator.
#[derive(Debug, Default, Clone, Copy)]
pub struct ContactValidator;

impl ContactValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate and normalize a submitted form.
    pub fn validate(&self, form: &ContactForm) -> Result<ContactSubmission, Vec<FieldError>> {
        let mut errors = Vec::new();

        let name = required(&mut errors, "name", form.name.as_ref()).and_then(|name| {
            check_length(&mut errors, "name", &name, "Name", NAME_MIN, NAME_MAX).then_some(name)
        });

        let email = required(&mut errors, "email", form.email.as_ref())
            .map(|email| email.to_lowercase())
            .and_then(|email| {
                let mut valid = true;
                if !EMAIL_SHAPE.is_match(&email) {
                    errors.push(FieldError::new("email", ValidationError::InvalidEmail));
                    valid = false;
                }
                if email.chars().count() > EMAIL_MAX {
                    errors.push(FieldError::new(
                        "email",
                        ValidationError::TooLong {
                            label: "Email",
                            max: EMAIL_MAX,
                        },
                    ));
                    valid = false;
                }
                valid.then_some(email)
            });

        let organization = optional(&mut errors, "org", form.org.as_ref())
            .filter(|org| !org.is_empty())
            .filter(|org| check_length(&mut errors, "org", org, "Company name", 0, ORG_MAX));

        let message = required(&mut errors, "message", form.message.as_ref()).and_then(|message| {
            check_length(
                &mut errors,
                "message",
                &message,
                "Message",
                MESSAGE_MIN,
                MESSAGE_MAX,
            )
            .then_some(message)
        });

        let honeypot = optional(&mut errors, "company", form.company.as_ref());

        match (name, email, message) {
            (Some(name), Some(email), Some(message)) if errors.is_empty() => Ok(ContactSubmission {
                name,
                email,
                organization,
                message,
                honeypot,
            }),
            _ => {
                debug!(failed = errors.len(), "Contact form validation failed");
                Err(errors)
            }
        }
    }
}

/// Trimmed string value of a required field.
fn required(errors: &mut Vec<FieldError>, field: &'static str, value: Option<&Value>) -> Option<String> {
    match value {
        None => {
            errors.push(FieldError::new(field, ValidationError::Missing));
            None
        }
        Some(value) => as_trimmed(errors, field, value),
    }
}

/// Trimmed string value of an optional field.
fn optional(errors: &mut Vec<FieldError>, field: &'static str, value: Option<&Value>) -> Option<String> {
    value.and_then(|value| as_trimmed(errors, field, value))
}

fn as_trimmed(errors: &mut Vec<FieldError>, field: &'static str, value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        _ => {
            errors.push(FieldError::new(field, ValidationError::NotAString));
            None
        }
    }
}

fn check_length(
    errors: &mut Vec<FieldError>,
    field: &'static str,
    value: &str,
    label: &'static str,
    min: usize,
    max: usize,
) -> bool {
    let len = value.chars().count();
    if len < min {
        errors.push(FieldError::new(field, ValidationError::TooShort { label, min }));
        false
    } else if len > max {
        errors.push(FieldError::new(field, ValidationError::TooLong { label, max }));
        false
    } else {
        true
    }
}
