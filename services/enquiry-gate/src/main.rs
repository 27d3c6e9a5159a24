// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Enquiry Gate Service
//!
//! Serves the contact form endpoint for the listing site. Submissions are
//! validated, screened for bots, rate limited per client and then emailed
//! through Resend.
//!
//! ## Configuration
//!
//! Configuration is read once at startup from environment variables (an
//! optional `.env` file is loaded first):
//!
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:8080)
//! - `CONTACT_RATE_LIMIT_WINDOW_SECONDS`: Rate limit window (default: 600)
//! - `CONTACT_RATE_LIMIT_MAX_REQUESTS`: Submissions per window (default: 5)
//! - `BOT_VERIFICATION_PROVIDER`: `none`, `turnstile` or `recaptcha` (default: inferred from the keys set)
//! - `TURNSTILE_SITE_KEY` / `TURNSTILE_SECRET_KEY`
//! - `RECAPTCHA_SITE_KEY` / `RECAPTCHA_SECRET_KEY`
//! - `RESEND_API_KEY`: Mail provider key
//! - `RESEND_TIMEOUT_MS`: Mail provider request timeout (default: 10000)
//! - `CONTACT_MAIL_TO`: Comma-separated recipients

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use enquiry_gate::{
    config::Config,
    gate::AdmissionGate,
    handlers::{router, AppState},
    limiter::RateLimitLedger,
    mailer::ResendMailer,
    metrics::GateMetrics,
    verification::Verification,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is normal in production
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Load configuration
    let config = Config::from_env();
    config.validate()?;
    info!(
        bind_addr = %config.bind_addr,
        route = %config.route,
        window_secs = config.rate_limit.window_secs,
        max_requests = config.rate_limit.max_requests,
        verification = config.verification.provider.as_str(),
        "Starting enquiry gate"
    );

    // Create application state
    let verification = Verification::from_config(&config.verification);
    let gate = AdmissionGate::new(RateLimitLedger::new(config.rate_limit.clone()), verification);

    let mailer = ResendMailer::from_config(config.mail.clone())?;
    if !mailer.is_configured() {
        warn!("RESEND_API_KEY not set, admitted enquiries will fail to send");
    }

    let state = Arc::new(AppState {
        gate,
        mailer: Arc::new(mailer),
        metrics: GateMetrics::new()?,
        config: config.clone(),
    });

    let app = router(state);

    // Start server
    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
