// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Enquiry form payloads.
//!
//! [`EnquirySubmission`] is the untrusted wire shape posted by the contact
//! form. Every field is optional at the type level and any JSON value that is
//! not a string is read as absent, so a malformed field ends up as a
//! validation failure rather than a deserialization error.

use serde::{Deserialize, Deserializer, Serialize};

/// Raw contact form submission.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnquirySubmission {
    #[serde(default, deserialize_with = "lenient_string")]
    pub full_name: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub phone: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub email: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub inquiry_type: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub message: Option<String>,

    /// Honeypot. Hidden from people, filled in by naive bots.
    #[serde(default, deserialize_with = "lenient_string")]
    pub website: Option<String>,

    /// Opaque token from the challenge widget.
    #[serde(
        default,
        alias = "turnstileToken",
        alias = "recaptchaToken",
        deserialize_with = "lenient_string"
    )]
    pub verification_token: Option<String>,
}

/// A submission that passed shape validation. All fields are trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Enquiry {
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub inquiry_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        _ => None,
    })
}

fn trimmed(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl EnquirySubmission {
    /// Check that every required field is present and non-blank.
    ///
    /// Returns the trimmed enquiry, or `None` if any required field is
    /// missing.
    pub fn validate(&self) -> Option<Enquiry> {
        Some(Enquiry {
            full_name: trimmed(&self.full_name)?.to_string(),
            phone: trimmed(&self.phone)?.to_string(),
            email: trimmed(&self.email)?.to_string(),
            inquiry_type: trimmed(&self.inquiry_type)?.to_string(),
            message: trimmed(&self.message).map(String::from),
        })
    }

    /// Whether the honeypot field carries anything other than whitespace.
    pub fn honeypot_triggered(&self) -> bool {
        trimmed(&self.website).is_some()
    }

    /// The verification token, trimmed, if one was sent.
    pub fn verification_token(&self) -> Option<&str> {
        trimmed(&self.verification_token)
    }
}
