// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! SMTP relay transport. Last real transport in the chain, so its failures
//! reach the caller.

use super::{Delivery, FailurePolicy, MailTransport, Notification, Provider, TransportError};
use crate::config::SmtpConfig;
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::time::Duration;

/// Sends plain-text notifications through an authenticated SMTP relay.
#[derive(Clone)]
pub struct SmtpTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpTransport {
    /// Implicit TLS when `secure` is set, STARTTLS otherwise.
    pub fn new(config: &SmtpConfig, timeout: Duration) -> Result<Self, TransportError> {
        let builder = if config.secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
        };

        let transport = builder
            .port(config.port)
            .credentials(Credentials::new(config.user.clone(), config.password.clone()))
            .timeout(Some(timeout))
            .build();

        Ok(Self { transport })
    }
}

/// Build the MIME message for `notification`.
pub(crate) fn build_message(notification: &Notification) -> Result<Message, TransportError> {
    let mut builder = Message::builder()
        .from(notification.from.parse::<Mailbox>()?)
        .to(notification.to.parse::<Mailbox>()?)
        .subject(notification.subject.as_str())
        .header(ContentType::TEXT_PLAIN);

    if let Some(reply_to) = &notification.reply_to {
        builder = builder.reply_to(reply_to.parse::<Mailbox>()?);
    }

    Ok(builder.body(notification.text.clone())?)
}

#[async_trait]
impl MailTransport for SmtpTransport {
    fn provider(&self) -> Provider {
        Provider::Smtp
    }

    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::Surface
    }

    async fn send(&self, notification: &Notification) -> Result<Delivery, TransportError> {
        let message = build_message(notification)?;
        let response = self.transport.send(message).await?;

        let reply = response
            .message()
            .map(|line| line.to_string())
            .collect::<Vec<_>>()
            .join(" ");

        if !response.is_positive() {
            return Err(TransportError::Rejected {
                status: response.code().to_string(),
                body: reply,
            });
        }

        Ok(Delivery {
            message_id: (!reply.is_empty()).then_some(reply),
        })
    }
}
