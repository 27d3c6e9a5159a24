// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Bot verification through a third-party challenge provider.
//!
//! The gate only sees [`HumanVerifier`]. Turnstile and reCAPTCHA v3 both use
//! a "siteverify" form POST carrying the secret key and the widget token;
//! they differ in how the answer is judged.

use crate::config::{VerificationConfig, VerificationProvider};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

pub const TURNSTILE_SITEVERIFY_URL: &str =
    "https://challenges.cloudflare.com/turnstile/v0/siteverify";
pub const RECAPTCHA_SITEVERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";

/// Errors talking to a verification provider.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("verification request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("verification endpoint returned HTTP {0}")]
    Status(reqwest::StatusCode),
}

/// Something that can tell whether a challenge token came from a human.
#[async_trait]
pub trait HumanVerifier: Send + Sync {
    /// Verify `token`, optionally bound to the submitting client's address.
    async fn verify(&self, token: &str, remote_ip: Option<&str>) -> Result<bool, VerifyError>;

    fn provider(&self) -> VerificationProvider;
}

/// Body returned by both providers' siteverify endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct SiteverifyResponse {
    pub success: bool,
    /// reCAPTCHA v3 only
    #[serde(default)]
    pub score: Option<f64>,
    /// reCAPTCHA v3 only
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default, rename = "error-codes")]
    pub error_codes: Vec<String>,
}

async fn siteverify(
    client: &reqwest::Client,
    endpoint: &str,
    secret: &str,
    token: &str,
    remote_ip: Option<&str>,
) -> Result<SiteverifyResponse, VerifyError> {
    let result = post_siteverify(client, endpoint, secret, token, remote_ip).await;
    if let Err(err) = &result {
        warn!(error = %err, "Siteverify call failed");
    }
    result
}

async fn post_siteverify(
    client: &reqwest::Client,
    endpoint: &str,
    secret: &str,
    token: &str,
    remote_ip: Option<&str>,
) -> Result<SiteverifyResponse, VerifyError> {
    let mut form = vec![("secret", secret), ("response", token)];
    if let Some(ip) = remote_ip {
        form.push(("remoteip", ip));
    }

    let response = client.post(endpoint).form(&form).send().await?;
    if !response.status().is_success() {
        return Err(VerifyError::Status(response.status()));
    }
    Ok(response.json().await?)
}

/// Cloudflare Turnstile verifier.
pub struct TurnstileVerifier {
    client: reqwest::Client,
    secret: String,
    endpoint: String,
}

impl TurnstileVerifier {
    pub fn new(client: reqwest::Client, secret: impl Into<String>) -> Self {
        Self::with_endpoint(client, secret, TURNSTILE_SITEVERIFY_URL)
    }

    pub fn with_endpoint(
        client: reqwest::Client,
        secret: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            client,
            secret: secret.into(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl HumanVerifier for TurnstileVerifier {
    async fn verify(&self, token: &str, remote_ip: Option<&str>) -> Result<bool, VerifyError> {
        let answer = siteverify(&self.client, &self.endpoint, &self.secret, token, remote_ip).await?;
        if !answer.success {
            warn!(error_codes = ?answer.error_codes, "Turnstile rejected token");
        }
        Ok(answer.success)
    }

    fn provider(&self) -> VerificationProvider {
        VerificationProvider::Turnstile
    }
}

/// Google reCAPTCHA v3 verifier.
pub struct RecaptchaVerifier {
    client: reqwest::Client,
    secret: String,
    endpoint: String,
    min_score: f64,
    action: String,
}

impl RecaptchaVerifier {
    pub fn new(
        client: reqwest::Client,
        secret: impl Into<String>,
        min_score: f64,
        action: impl Into<String>,
    ) -> Self {
        Self::with_endpoint(client, secret, min_score, action, RECAPTCHA_SITEVERIFY_URL)
    }

    pub fn with_endpoint(
        client: reqwest::Client,
        secret: impl Into<String>,
        min_score: f64,
        action: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            client,
            secret: secret.into(),
            endpoint: endpoint.into(),
            min_score,
            action: action.into(),
        }
    }

    /// Judge a v3 answer: it must succeed, match the form's action and
    /// reach the minimum score.
    pub fn accepts(&self, answer: &SiteverifyResponse) -> bool {
        answer.success
            && answer.action.as_deref() == Some(self.action.as_str())
            && answer.score.is_some_and(|score| score >= self.min_score)
    }
}

#[async_trait]
impl HumanVerifier for RecaptchaVerifier {
    async fn verify(&self, token: &str, remote_ip: Option<&str>) -> Result<bool, VerifyError> {
        let answer = siteverify(&self.client, &self.endpoint, &self.secret, token, remote_ip).await?;
        let accepted = self.accepts(&answer);
        if !accepted {
            warn!(
                success = answer.success,
                score = ?answer.score,
                action = ?answer.action,
                error_codes = ?answer.error_codes,
                "reCAPTCHA rejected token"
            );
        }
        Ok(accepted)
    }

    fn provider(&self) -> VerificationProvider {
        VerificationProvider::Recaptcha
    }
}

/// How the gate handles the bot verification step.
#[derive(Clone)]
pub enum Verification {
    /// No provider selected; the step is skipped.
    Disabled,
    /// A provider is selected but cannot be used. Every submission is
    /// blocked until the configuration is fixed.
    Unavailable { provider: VerificationProvider },
    /// Tokens are checked with this verifier.
    Enabled(Arc<dyn HumanVerifier>),
}

impl std::fmt::Debug for Verification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disabled => write!(f, "Disabled"),
            Self::Unavailable { provider } => write!(f, "Unavailable({})", provider.as_str()),
            Self::Enabled(verifier) => write!(f, "Enabled({})", verifier.provider().as_str()),
        }
    }
}

impl Verification {
    /// Build the verification policy from configuration.
    ///
    /// Both the site key and the secret key of the selected provider must be
    /// set: without the site key the form cannot render the widget, without
    /// the secret the token cannot be checked.
    pub fn from_config(config: &VerificationConfig) -> Self {
        let provider = config.provider;
        if provider == VerificationProvider::None {
            return Self::Disabled;
        }

        let (Some(_site_key), Some(secret)) = (config.site_key(), config.secret_key()) else {
            warn!(provider = provider.as_str(), "Bot verification keys missing");
            return Self::Unavailable { provider };
        };

        let client = match reqwest::Client::builder().timeout(config.timeout()).build() {
            Ok(client) => client,
            Err(err) => {
                warn!(error = %err, "Failed to build verification client");
                return Self::Unavailable { provider };
            }
        };

        match provider {
            VerificationProvider::Turnstile => {
                Self::Enabled(Arc::new(TurnstileVerifier::new(client, secret)))
            }
            VerificationProvider::Recaptcha => Self::Enabled(Arc::new(RecaptchaVerifier::new(
                client,
                secret,
                config.recaptcha_min_score,
                config.recaptcha_action.clone(),
            ))),
            VerificationProvider::None | VerificationProvider::Unrecognized => {
                Self::Unavailable { provider }
            }
        }
    }

    /// Provider name reported to the form.
    pub fn provider(&self) -> VerificationProvider {
        match self {
            Self::Disabled => VerificationProvider::None,
            Self::Unavailable { provider } => *provider,
            Self::Enabled(verifier) => verifier.provider(),
        }
    }
}
