// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the enquiry admission gate.
//!
//! Everything is resolved once at process start from environment variables
//! (see [`Config::from_env`]). Numeric rate-limit settings that are missing,
//! malformed, zero or negative fall back to their defaults instead of
//! producing a window that blocks all traffic.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

/// Settings that cannot be defaulted away and must stop startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid bind address {addr:?}: {source}")]
    InvalidBindAddr {
        addr: String,
        source: std::net::AddrParseError,
    },

    #[error("{name} must start with '/', got {value:?}")]
    InvalidPath { name: &'static str, value: String },
}

/// Configuration for the enquiry gate service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Route discriminator appended to the client address to form the
    /// rate-limit key (default: /api/contact)
    #[serde(default = "default_route")]
    pub route: String,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Bot verification configuration
    #[serde(default)]
    pub verification: VerificationConfig,

    /// Email dispatch configuration
    #[serde(default)]
    pub mail: MailConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Fixed-window rate limit settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Window length in seconds (default: 600)
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    /// Maximum accepted submissions per client within one window (default: 5)
    #[serde(default = "default_max_requests")]
    pub max_requests: u64,
}

/// Third-party bot verification provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationProvider {
    /// No challenge widget; the bot check step is skipped.
    #[default]
    None,
    /// Cloudflare Turnstile
    Turnstile,
    /// Google reCAPTCHA v3
    Recaptcha,
    /// A provider name we do not know. Treated as misconfigured.
    #[serde(other)]
    Unrecognized,
}

impl VerificationProvider {
    /// Parse a provider name. Matching is case-insensitive and ignores
    /// surrounding whitespace; an empty value means [`VerificationProvider::None`].
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "none" | "off" => Self::None,
            "turnstile" => Self::Turnstile,
            "recaptcha" | "recaptcha-v3" | "recaptcha_v3" => Self::Recaptcha,
            _ => Self::Unrecognized,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Turnstile => "turnstile",
            Self::Recaptcha => "recaptcha",
            Self::Unrecognized => "unrecognized",
        }
    }
}

/// Bot verification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationConfig {
    #[serde(default)]
    pub provider: VerificationProvider,

    #[serde(default)]
    pub turnstile_site_key: Option<String>,

    #[serde(default)]
    pub turnstile_secret_key: Option<String>,

    #[serde(default)]
    pub recaptcha_site_key: Option<String>,

    #[serde(default)]
    pub recaptcha_secret_key: Option<String>,

    /// Minimum reCAPTCHA v3 score accepted as human (default: 0.5)
    #[serde(default = "default_recaptcha_min_score")]
    pub recaptcha_min_score: f64,

    /// Action name the form submits with (default: contact)
    #[serde(default = "default_recaptcha_action")]
    pub recaptcha_action: String,

    /// Timeout for the siteverify call in milliseconds (default: 5000)
    #[serde(default = "default_verify_timeout_ms")]
    pub timeout_ms: u64,
}

/// Email dispatch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// Resend API key. Without it every dispatch fails.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    #[serde(default = "default_mail_api_url")]
    pub api_url: String,

    #[serde(default = "default_mail_from")]
    pub from: String,

    #[serde(default = "default_mail_to")]
    pub to: Vec<String>,

    /// Listing name used in the subject line
    #[serde(default = "default_listing_name")]
    pub listing_name: String,

    /// Timeout for the provider request in milliseconds (default: 10000)
    #[serde(default = "default_mail_timeout_ms")]
    pub timeout_ms: u64,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_route() -> String {
    "/api/contact".to_string()
}

pub const DEFAULT_WINDOW_SECS: u64 = 600;
pub const DEFAULT_MAX_REQUESTS: u64 = 5;

fn default_window_secs() -> u64 {
    DEFAULT_WINDOW_SECS
}

fn default_max_requests() -> u64 {
    DEFAULT_MAX_REQUESTS
}

fn default_recaptcha_min_score() -> f64 {
    0.5
}

fn default_recaptcha_action() -> String {
    "contact".to_string()
}

fn default_verify_timeout_ms() -> u64 {
    5000
}

fn default_mail_api_url() -> String {
    "https://api.resend.com/emails".to_string()
}

fn default_mail_from() -> String {
    "Springbank Enquiry <onboarding@resend.dev>".to_string()
}

fn default_mail_to() -> Vec<String> {
    vec!["sgbcproperty@icloud.com".to_string()]
}

fn default_listing_name() -> String {
    "Springbank, 30 O'Malleys Rd Mardan".to_string()
}

fn default_mail_timeout_ms() -> u64 {
    10_000
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            route: default_route(),
            rate_limit: RateLimitConfig::default(),
            verification: VerificationConfig::default(),
            mail: MailConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_secs: default_window_secs(),
            max_requests: default_max_requests(),
        }
    }
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            provider: VerificationProvider::default(),
            turnstile_site_key: None,
            turnstile_secret_key: None,
            recaptcha_site_key: None,
            recaptcha_secret_key: None,
            recaptcha_min_score: default_recaptcha_min_score(),
            recaptcha_action: default_recaptcha_action(),
            timeout_ms: default_verify_timeout_ms(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_mail_api_url(),
            from: default_mail_from(),
            to: default_mail_to(),
            listing_name: default_listing_name(),
            timeout_ms: default_mail_timeout_ms(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl RateLimitConfig {
    /// Get the rate window duration
    pub fn window_duration(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl MailConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl VerificationConfig {
    /// Public site key of the selected provider, if set.
    pub fn site_key(&self) -> Option<&str> {
        match self.provider {
            VerificationProvider::Turnstile => self.turnstile_site_key.as_deref(),
            VerificationProvider::Recaptcha => self.recaptcha_site_key.as_deref(),
            _ => None,
        }
    }

    /// Secret key of the selected provider, if set.
    pub fn secret_key(&self) -> Option<&str> {
        match self.provider {
            VerificationProvider::Turnstile => self.turnstile_secret_key.as_deref(),
            VerificationProvider::Recaptcha => self.recaptcha_secret_key.as_deref(),
            _ => None,
        }
    }

    /// Provider implied by whichever keys are present when none is named.
    /// A lone key still selects its provider so the half-configured pair
    /// fails closed.
    pub fn inferred_provider(&self) -> VerificationProvider {
        if self.turnstile_site_key.is_some() || self.turnstile_secret_key.is_some() {
            VerificationProvider::Turnstile
        } else if self.recaptcha_site_key.is_some() || self.recaptcha_secret_key.is_some() {
            VerificationProvider::Recaptcha
        } else {
            VerificationProvider::None
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Parse a strictly positive integer, returning `fallback` for anything else.
///
/// Leading and trailing whitespace is ignored. Missing values, non-numeric
/// text, zero and negative numbers all yield `fallback`.
pub fn parse_positive_int(raw: Option<&str>, fallback: u64) -> u64 {
    match raw.map(str::trim).map(str::parse::<u64>) {
        Some(Ok(value)) if value > 0 => value,
        _ => fallback,
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty strings count as unset
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let defaults = Config::default();

        let mut config = Config {
            bind_addr: var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            route: var("CONTACT_ROUTE").unwrap_or(defaults.route),
            rate_limit: RateLimitConfig {
                window_secs: parse_positive_int(
                    var("CONTACT_RATE_LIMIT_WINDOW_SECONDS").as_deref(),
                    DEFAULT_WINDOW_SECS,
                ),
                max_requests: parse_positive_int(
                    var("CONTACT_RATE_LIMIT_MAX_REQUESTS").as_deref(),
                    DEFAULT_MAX_REQUESTS,
                ),
            },
            verification: VerificationConfig {
                provider: VerificationProvider::None,
                turnstile_site_key: var("TURNSTILE_SITE_KEY"),
                turnstile_secret_key: var("TURNSTILE_SECRET_KEY"),
                recaptcha_site_key: var("RECAPTCHA_SITE_KEY"),
                recaptcha_secret_key: var("RECAPTCHA_SECRET_KEY"),
                recaptcha_min_score: var("RECAPTCHA_MIN_SCORE")
                    .and_then(|v| v.parse::<f64>().ok())
                    .filter(|score| (0.0..=1.0).contains(score))
                    .unwrap_or(defaults.verification.recaptcha_min_score),
                recaptcha_action: var("RECAPTCHA_ACTION")
                    .unwrap_or(defaults.verification.recaptcha_action),
                timeout_ms: parse_positive_int(
                    var("BOT_VERIFICATION_TIMEOUT_MS").as_deref(),
                    defaults.verification.timeout_ms,
                ),
            },
            mail: MailConfig {
                api_key: var("RESEND_API_KEY"),
                api_url: var("RESEND_API_URL").unwrap_or(defaults.mail.api_url),
                from: var("CONTACT_MAIL_FROM").unwrap_or(defaults.mail.from),
                to: var("CONTACT_MAIL_TO")
                    .map(|v| {
                        v.split(',')
                            .map(str::trim)
                            .filter(|s| !s.is_empty())
                            .map(String::from)
                            .collect::<Vec<_>>()
                    })
                    .filter(|to| !to.is_empty())
                    .unwrap_or(defaults.mail.to),
                listing_name: var("CONTACT_LISTING_NAME").unwrap_or(defaults.mail.listing_name),
                timeout_ms: parse_positive_int(
                    var("RESEND_TIMEOUT_MS").as_deref(),
                    defaults.mail.timeout_ms,
                ),
            },
            metrics: MetricsConfig {
                enabled: var("METRICS_ENABLED")
                    .map(|v| !matches!(v.to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off"))
                    .unwrap_or(defaults.metrics.enabled),
                path: var("METRICS_PATH").unwrap_or(defaults.metrics.path),
            },
        };

        config.verification.provider = match var("BOT_VERIFICATION_PROVIDER") {
            Some(name) => VerificationProvider::parse(&name),
            None => config.verification.inferred_provider(),
        };
        config
    }

    /// Check the settings that have no safe fallback.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.socket_addr()?;
        check_path("CONTACT_ROUTE", &self.route)?;
        if self.metrics.enabled {
            check_path("METRICS_PATH", &self.metrics.path)?;
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind_addr
            .parse()
            .map_err(|source| ConfigError::InvalidBindAddr {
                addr: self.bind_addr.clone(),
                source,
            })
    }
}

fn check_path(name: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.starts_with('/') {
        Ok(())
    } else {
        Err(ConfigError::InvalidPath {
            name,
            value: value.to_string(),
        })
    }
}
