// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Enquiry admission gate.
//!
//! Decides whether a contact form submission may be dispatched. Checks run
//! in a fixed order and the first failure wins:
//!
//! 1. required fields present
//! 2. honeypot empty
//! 3. bot verification token accepted (when verification is configured)
//! 4. per-client rate limit
//!
//! Only step 4 has a side effect, so a submission rejected earlier never
//! consumes a rate-limit slot. The gate does no logging and no I/O of its
//! own beyond the verifier call; the HTTP layer maps the decision to a
//! response.

use crate::identity::ClientIdentity;
use crate::limiter::{RateLimitLedger, RateLimitResult};
use crate::submission::{Enquiry, EnquirySubmission};
use crate::verification::Verification;
use chrono::{DateTime, Utc};

/// Shared by every abuse-related denial so callers cannot tell which
/// defence fired.
pub const ABUSE_MESSAGE: &str =
    "Unable to submit enquiry right now. Please try again or contact us directly.";

pub const MISSING_FIELDS_MESSAGE: &str = "Missing required fields";

pub const UNAVAILABLE_MESSAGE: &str =
    "Enquiries are temporarily unavailable. Please contact us directly by phone or email.";

/// Why a submission was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// A required field is absent or blank
    MissingFields,
    /// The hidden honeypot field was filled in
    Honeypot,
    /// Verification token missing, rejected, or the provider unreachable
    BotCheckFailed,
    /// A verification provider is selected but not usable
    VerificationUnavailable,
    /// Too many accepted submissions from this client in the window
    RateLimited { retry_after_secs: u64 },
}

impl Denial {
    /// Message safe to show the submitter.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::MissingFields => MISSING_FIELDS_MESSAGE,
            Self::VerificationUnavailable => UNAVAILABLE_MESSAGE,
            Self::Honeypot | Self::BotCheckFailed | Self::RateLimited { .. } => ABUSE_MESSAGE,
        }
    }

    pub fn retry_after_secs(&self) -> Option<u64> {
        match self {
            Self::RateLimited { retry_after_secs } => Some(*retry_after_secs),
            _ => None,
        }
    }

    /// Internal label, for logs and metrics only.
    pub fn label(&self) -> &'static str {
        match self {
            Self::MissingFields => "missing_fields",
            Self::Honeypot => "honeypot",
            Self::BotCheckFailed => "bot_check_failed",
            Self::VerificationUnavailable => "verification_unavailable",
            Self::RateLimited { .. } => "rate_limited",
        }
    }
}

/// Outcome of [`AdmissionGate::evaluate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdmissionDecision {
    /// Dispatch may proceed with this validated enquiry
    Allowed(Enquiry),
    Denied(Denial),
}

impl AdmissionDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AdmissionDecision::Allowed(_))
    }

    pub fn denial(&self) -> Option<Denial> {
        match self {
            AdmissionDecision::Allowed(_) => None,
            AdmissionDecision::Denied(denial) => Some(*denial),
        }
    }
}

/// The admission gate for one protected route.
pub struct AdmissionGate {
    ledger: RateLimitLedger,
    verification: Verification,
}

impl AdmissionGate {
    pub fn new(ledger: RateLimitLedger, verification: Verification) -> Self {
        Self {
            ledger,
            verification,
        }
    }

    pub fn ledger(&self) -> &RateLimitLedger {
        &self.ledger
    }

    pub fn verification(&self) -> &Verification {
        &self.verification
    }

    /// Evaluate one submission from `client` at `now`.
    pub async fn evaluate(
        &self,
        submission: &EnquirySubmission,
        client: &ClientIdentity,
        now: DateTime<Utc>,
    ) -> AdmissionDecision {
        let Some(enquiry) = submission.validate() else {
            return AdmissionDecision::Denied(Denial::MissingFields);
        };

        if submission.honeypot_triggered() {
            return AdmissionDecision::Denied(Denial::Honeypot);
        }

        if let Some(denial) = self.check_human(submission, client).await {
            return AdmissionDecision::Denied(denial);
        }

        // No await past this point: the ledger update must stay atomic
        match self.ledger.check(client.key(), now) {
            RateLimitResult::Allowed { .. } => AdmissionDecision::Allowed(enquiry),
            RateLimitResult::Limited { retry_after_secs } => {
                AdmissionDecision::Denied(Denial::RateLimited { retry_after_secs })
            }
        }
    }

    async fn check_human(
        &self,
        submission: &EnquirySubmission,
        client: &ClientIdentity,
    ) -> Option<Denial> {
        match &self.verification {
            Verification::Disabled => None,
            Verification::Unavailable { .. } => Some(Denial::VerificationUnavailable),
            Verification::Enabled(verifier) => {
                let Some(token) = submission.verification_token() else {
                    return Some(Denial::BotCheckFailed);
                };
                match verifier.verify(token, client.remote_ip()).await {
                    Ok(true) => None,
                    Ok(false) | Err(_) => Some(Denial::BotCheckFailed),
                }
            }
        }
    }
}
