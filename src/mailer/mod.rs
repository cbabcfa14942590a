// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Mail delivery for contact submissions.
//!
//! Transports are tried in order until one succeeds:
//! 1. Resend API (falls through on failure)
//! 2. SMTP relay (failure is returned to the caller)
//!
//! When no transport is configured, or every configured one fell through,
//! the submission is written to the log and reported as delivered.

mod notification;
pub mod resend;
pub mod smtp;

pub use notification::Notification;
pub use resend::ResendTransport;
pub use smtp::SmtpTransport;

use crate::config::MailConfig;
use crate::metrics::AppMetrics;
use crate::validator::ContactSubmission;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

/// Which transport delivered a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Resend,
    Smtp,
    /// Written to the log only
    Console,
}

impl Provider {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Resend => "resend",
            Self::Smtp => "smtp",
            Self::Console => "console",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the dispatcher does when a transport fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Log and try the next transport
    FallThrough,
    /// Stop and return the error
    Surface,
}

/// Transport-level delivery errors.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider rejected message ({status}): {body}")]
    Rejected { status: String, body: String },

    #[error("Invalid mailbox: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Could not build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("Could not render notification: {0}")]
    Template(#[from] tera::Error),
}

/// Returned when a transport with [`FailurePolicy::Surface`] fails.
#[derive(Debug, Error)]
#[error("{provider} delivery failed: {source}")]
pub struct DispatchError {
    pub provider: Provider,
    #[source]
    pub source: TransportError,
}

/// Successful hand-off to a transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delivery {
    /// Provider-assigned identifier, when one is returned
    pub message_id: Option<String>,
}

/// Result of dispatching a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub provider: Provider,
    pub message_id: Option<String>,
}

/// A way of delivering a notification.
#[async_trait]
pub trait MailTransport: Send + Sync {
    fn provider(&self) -> Provider;

    fn failure_policy(&self) -> FailurePolicy;

    async fn send(&self, notification: &Notification) -> Result<Delivery, TransportError>;
}

/// Delivers contact submissions over the configured transport chain.
pub struct MailDispatcher {
    from: String,
    to: String,
    transports: Vec<Box<dyn MailTransport>>,
    metrics: Option<Arc<AppMetrics>>,
}

impl MailDispatcher {
    /// Dispatcher over an explicit transport chain.
    pub fn new(from: impl Into<String>, to: impl Into<String>, transports: Vec<Box<dyn MailTransport>>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            transports,
            metrics: None,
        }
    }

    /// Dispatcher over the transports enabled in `config`, Resend first.
    pub fn from_config(config: &MailConfig) -> Result<Self, TransportError> {
        let mut transports: Vec<Box<dyn MailTransport>> = Vec::new();

        if let Some(resend) = &config.resend {
            transports.push(Box::new(ResendTransport::new(resend, config.timeout())?));
        }
        if let Some(smtp) = &config.smtp {
            transports.push(Box::new(SmtpTransport::new(smtp, config.timeout())?));
        }

        Ok(Self::new(config.from.clone(), config.to.clone(), transports))
    }

    pub fn with_metrics(mut self, metrics: Arc<AppMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Providers in the order they are tried.
    pub fn providers(&self) -> Vec<Provider> {
        self.transports.iter().map(|t| t.provider()).collect()
    }

    /// Deliver `submission`, recording `client` in the notification.
    pub async fn dispatch(
        &self,
        submission: &ContactSubmission,
        client: Option<&str>,
    ) -> Result<DispatchOutcome, DispatchError> {
        let notification = Notification::for_submission(submission, client, &self.from, &self.to)
            .map_err(|err| {
                error!(client = ?client, error = %err, "Failed to render contact notification");
                DispatchError {
                    provider: Provider::Console,
                    source: err.into(),
                }
            })?;

        for transport in &self.transports {
            let provider = transport.provider();
            info!(%provider, client = ?client, "Sending contact notification");

            match transport.send(&notification).await {
                Ok(delivery) => {
                    info!(%provider, message_id = ?delivery.message_id, "Contact notification sent");
                    self.record(provider, "sent");
                    return Ok(DispatchOutcome {
                        provider,
                        message_id: delivery.message_id,
                    });
                }
                Err(err) => {
                    self.record(provider, "failed");
                    match transport.failure_policy() {
                        FailurePolicy::FallThrough => {
                            warn!(%provider, client = ?client, error = %err, "Mail transport failed, trying next");
                        }
                        FailurePolicy::Surface => {
                            error!(%provider, client = ?client, error = %err, "Mail transport failed");
                            return Err(DispatchError { provider, source: err });
                        }
                    }
                }
            }
        }

        info!(
            name = %submission.name,
            email = %submission.email,
            organization = ?submission.organization,
            message = %submission.message,
            client = ?client,
            "No mail transport delivered the submission; logged only"
        );
        self.record(Provider::Console, "sent");

        Ok(DispatchOutcome {
            provider: Provider::Console,
            message_id: None,
        })
    }

    fn record(&self, provider: Provider, result: &str) {
        if let Some(metrics) = &self.metrics {
            metrics.record_dispatch(provider, result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Transport double that records subjects and answers from a script.
    struct ScriptedTransport {
        provider: Provider,
        policy: FailurePolicy,
        fail: bool,
        sent: Arc<Mutex<Vec<String>>>,
    }

    impl ScriptedTransport {
        fn boxed(
            provider: Provider,
            policy: FailurePolicy,
            fail: bool,
            sent: &Arc<Mutex<Vec<String>>>,
        ) -> Box<dyn MailTransport> {
            Box::new(Self {
                provider,
                policy,
                fail,
                sent: sent.clone(),
            })
        }
    }

    #[async_trait]
    impl MailTransport for ScriptedTransport {
        fn provider(&self) -> Provider {
            self.provider
        }

        fn failure_policy(&self) -> FailurePolicy {
            self.policy
        }

        async fn send(&self, notification: &Notification) -> Result<Delivery, TransportError> {
            self.sent
                .lock()
                .unwrap()
                .push(format!("{}:{}", self.provider, notification.subject));
            if self.fail {
                Err(TransportError::Rejected {
                    status: "503".to_string(),
                    body: "unavailable".to_string(),
                })
            } else {
                Ok(Delivery {
                    message_id: Some(format!("{}-1", self.provider)),
                })
            }
        }
    }

    fn submission() -> ContactSubmission {
        ContactSubmission {
            name: "Grace".to_string(),
            email: "grace@example.com".to_string(),
            organization: Some("Navy".to_string()),
            message: "Long enough message body".to_string(),
            honeypot: None,
        }
    }

    #[tokio::test]
    async fn test_unconfigured_dispatch_is_logged_only() {
        let dispatcher = MailDispatcher::from_config(&MailConfig::default()).unwrap();
        assert!(dispatcher.providers().is_empty());

        let outcome = dispatcher.dispatch(&submission(), Some("10.0.0.1")).await.unwrap();
        assert_eq!(outcome.provider, Provider::Console);
        assert_eq!(outcome.message_id, None);
    }

    #[tokio::test]
    async fn test_first_success_short_circuits() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let dispatcher = MailDispatcher::new(
            "from@example.com",
            "to@example.com",
            vec![
                ScriptedTransport::boxed(Provider::Resend, FailurePolicy::FallThrough, false, &sent),
                ScriptedTransport::boxed(Provider::Smtp, FailurePolicy::Surface, false, &sent),
            ],
        );

        let outcome = dispatcher.dispatch(&submission(), None).await.unwrap();
        assert_eq!(outcome.provider, Provider::Resend);
        assert_eq!(outcome.message_id.as_deref(), Some("resend-1"));
        assert_eq!(*sent.lock().unwrap(), vec!["resend:New Inquiry from Grace"]);
    }

    #[tokio::test]
    async fn test_resend_failure_falls_back_to_smtp() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let dispatcher = MailDispatcher::new(
            "from@example.com",
            "to@example.com",
            vec![
                ScriptedTransport::boxed(Provider::Resend, FailurePolicy::FallThrough, true, &sent),
                ScriptedTransport::boxed(Provider::Smtp, FailurePolicy::Surface, false, &sent),
            ],
        );

        let outcome = dispatcher.dispatch(&submission(), None).await.unwrap();
        assert_eq!(outcome.provider, Provider::Smtp);
        assert_eq!(sent.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_smtp_failure_is_surfaced() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let dispatcher = MailDispatcher::new(
            "from@example.com",
            "to@example.com",
            vec![
                ScriptedTransport::boxed(Provider::Resend, FailurePolicy::FallThrough, true, &sent),
                ScriptedTransport::boxed(Provider::Smtp, FailurePolicy::Surface, true, &sent),
            ],
        );

        let err = dispatcher.dispatch(&submission(), None).await.unwrap_err();
        assert_eq!(err.provider, Provider::Smtp);
        assert!(matches!(err.source, TransportError::Rejected { .. }));
    }

    #[tokio::test]
    async fn test_resend_only_failure_is_logged_only() {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let dispatcher = MailDispatcher::new(
            "from@example.com",
            "to@example.com",
            vec![ScriptedTransport::boxed(
                Provider::Resend,
                FailurePolicy::FallThrough,
                true,
                &sent,
            )],
        );

        let outcome = dispatcher.dispatch(&submission(), None).await.unwrap();
        assert_eq!(outcome.provider, Provider::Console);
    }

    #[test]
    fn test_provider_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Provider::Smtp).unwrap(), "\"smtp\"");
        assert_eq!(Provider::Console.to_string(), "console");
    }
}
