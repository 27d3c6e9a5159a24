// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Enquiry email dispatch.
//!
//! Admitted enquiries are forwarded as a plain-text email through the Resend
//! HTTP API. The enquirer's address goes in `reply_to` so the agent can
//! answer directly.

use crate::config::MailConfig;
use crate::submission::Enquiry;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum characters of the inquiry label carried into the subject.
const SUBJECT_LABEL_MAX_CHARS: usize = 120;

/// Mail dispatch errors.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail provider API key not configured")]
    NotConfigured,

    #[error("mail request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("mail provider rejected message with HTTP {status}: {body}")]
    Rejected {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// Provider acknowledgement for a sent message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchReceipt {
    #[serde(default)]
    pub id: Option<String>,
}

/// Sends admitted enquiries on to a person.
#[async_trait]
pub trait EnquiryMailer: Send + Sync {
    async fn send(&self, enquiry: &Enquiry) -> Result<DispatchReceipt, MailError>;
}

/// Human label for an inquiry type code. Unknown codes pass through.
pub fn inquiry_type_label(code: &str) -> &str {
    match code {
        "inspection" => "Private Inspection",
        "floor-plans" => "Request Floor Plans",
        "pricing" => "Pricing Enquiry",
        "general" => "General Information",
        "other" => "Other",
        other => other,
    }
}

/// Build the subject line. Line breaks in the label are flattened so a
/// submitter cannot inject headers, and the label is capped in length.
pub fn subject_line(inquiry_type: &str, listing_name: &str) -> String {
    let label: String = inquiry_type_label(inquiry_type)
        .chars()
        .map(|c| if c == '\r' || c == '\n' { ' ' } else { c })
        .take(SUBJECT_LABEL_MAX_CHARS)
        .collect();
    format!("New Enquiry: {label} - {listing_name}")
}

/// Plain-text body listing the submitted fields.
pub fn text_body(enquiry: &Enquiry, listing_name: &str) -> String {
    let mut body = format!(
        "New property enquiry for {listing_name}\n\n\
         Name: {}\n\
         Phone: {}\n\
         Email: {}\n\
         Enquiry Type: {}\n",
        enquiry.full_name,
        enquiry.phone,
        enquiry.email,
        inquiry_type_label(&enquiry.inquiry_type),
    );
    if let Some(message) = &enquiry.message {
        body.push_str("\nMessage:\n");
        body.push_str(message);
        body.push('\n');
    }
    body
}

#[derive(Debug, Serialize)]
struct ResendEmail<'a> {
    from: &'a str,
    to: &'a [String],
    reply_to: &'a str,
    subject: String,
    text: String,
}

/// Resend HTTP API mailer.
pub struct ResendMailer {
    client: reqwest::Client,
    config: MailConfig,
}

impl ResendMailer {
    pub fn new(client: reqwest::Client, config: MailConfig) -> Self {
        Self { client, config }
    }

    /// Build a mailer whose provider requests give up after
    /// `config.timeout_ms`.
    pub fn from_config(config: MailConfig) -> Result<Self, MailError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self::new(client, config))
    }

    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }
}

#[async_trait]
impl EnquiryMailer for ResendMailer {
    async fn send(&self, enquiry: &Enquiry) -> Result<DispatchReceipt, MailError> {
        let api_key = self.config.api_key.as_deref().ok_or(MailError::NotConfigured)?;

        let email = ResendEmail {
            from: &self.config.from,
            to: &self.config.to,
            reply_to: &enquiry.email,
            subject: subject_line(&enquiry.inquiry_type, &self.config.listing_name),
            text: text_body(enquiry, &self.config.listing_name),
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(api_key)
            .json(&email)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected { status, body });
        }

        Ok(response.json().await?)
    }
}
