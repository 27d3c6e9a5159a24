// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Enquiry Admission Gate
//!
//! Guards the contact form endpoint of a property listing site. A submission
//! is dispatched by email only after it passes, in order:
//!
//! - Required field validation
//! - Honeypot check
//! - Bot verification (Turnstile or reCAPTCHA v3, when configured)
//! - Per-client fixed-window rate limiting (5 per 600 s by default)
//!
//! Abuse-related denials share one message so a scripted caller cannot tell
//! which defence stopped it.

pub mod config;
pub mod gate;
pub mod handlers;
pub mod identity;
pub mod limiter;
pub mod mailer;
pub mod metrics;
pub mod submission;
pub mod verification;

pub use config::Config;
pub use gate::{AdmissionDecision, AdmissionGate, Denial};
pub use identity::ClientIdentity;
pub use limiter::{RateLimitLedger, RateLimitResult};
pub use submission::{Enquiry, EnquirySubmission};
pub use verification::{HumanVerifier, Verification};
