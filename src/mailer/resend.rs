// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Resend transactional email API transport.

use super::{Delivery, FailurePolicy, MailTransport, Notification, Provider, TransportError};
use crate::config::ResendConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Longest provider error body kept in an error.
const MAX_ERROR_BODY: usize = 512;

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct SendEmailResponse {
    id: Option<String>,
}

/// Sends notifications through the Resend HTTP API.
pub struct ResendTransport {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl ResendTransport {
    pub fn new(config: &ResendConfig, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl MailTransport for ResendTransport {
    fn provider(&self) -> Provider {
        Provider::Resend
    }

    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::FallThrough
    }

    async fn send(&self, notification: &Notification) -> Result<Delivery, TransportError> {
        let request = SendEmailRequest {
            from: &notification.from,
            to: [&notification.to],
            subject: &notification.subject,
            html: &notification.html,
            text: &notification.text,
            reply_to: notification.reply_to.as_deref(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let cut = (0..=MAX_ERROR_BODY)
                    .rev()
                    .find(|&i| body.is_char_boundary(i))
                    .unwrap_or(0);
                body.truncate(cut);
            }
            return Err(TransportError::Rejected {
                status: status.as_u16().to_string(),
                body,
            });
        }

        let sent: SendEmailResponse = response.json().await?;
        Ok(Delivery { message_id: sent.id })
    }
}
