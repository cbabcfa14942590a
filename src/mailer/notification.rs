// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Rendering of a contact submission into a mail notification.

use crate::validator::ContactSubmission;
use serde::Serialize;
use std::sync::LazyLock;
use tera::{Context, Tera};

const HTML_TEMPLATE_NAME: &str = "contact_notification.html";
const HTML_TEMPLATE: &str = include_str!("../../templates/contact_notification.html");

// The `.html` name turns on autoescaping for every interpolated value.
static TEMPLATES: LazyLock<Tera> = LazyLock::new(|| {
    let mut tera = Tera::default();
    tera.add_raw_template(HTML_TEMPLATE_NAME, HTML_TEMPLATE).unwrap();
    tera
});

/// A rendered notification, ready for any transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub from: String,
    pub to: String,
    /// Submitter's address, so a reply goes straight to the lead
    pub reply_to: Option<String>,
    pub subject: String,
    pub text: String,
    pub html: String,
}

#[derive(Debug, Serialize)]
struct HtmlContext<'a> {
    name: &'a str,
    email: &'a str,
    organization: &'a str,
    message: &'a str,
    client: Option<&'a str>,
}

impl Notification {
    /// Render `submission` as a notification from `from` to `to`.
    pub fn for_submission(
        submission: &ContactSubmission,
        client: Option<&str>,
        from: &str,
        to: &str,
    ) -> Result<Self, tera::Error> {
        let organization = submission.organization.as_deref().unwrap_or("Not provided");

        let text = format!(
            "Name: {}\nEmail: {}\nCompany: {}\n\nMessage:\n{}\n\nIP: {}",
            submission.name,
            submission.email,
            organization,
            submission.message,
            client.unwrap_or("Unknown"),
        );

        let context = Context::from_serialize(HtmlContext {
            name: &submission.name,
            email: &submission.email,
            organization,
            message: &submission.message,
            client,
        })?;
        let html = TEMPLATES.render(HTML_TEMPLATE_NAME, &context)?;

        Ok(Self {
            from: from.to_string(),
            to: to.to_string(),
            reply_to: Some(submission.email.clone()),
            subject: format!("New Inquiry from {}", submission.name),
            text,
            html,
        })
    }
}
