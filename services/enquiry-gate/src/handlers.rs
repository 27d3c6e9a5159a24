// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the enquiry gate service.
//!
//! The contact handler runs the admission gate and, when the submission is
//! admitted, hands it to the mailer. Every denial is mapped to a status and a
//! `{"error": ...}` body here; the gate itself knows nothing about HTTP.

use crate::config::Config;
use crate::gate::{AdmissionDecision, AdmissionGate, Denial};
use crate::identity::ClientIdentity;
use crate::mailer::{DispatchReceipt, EnquiryMailer};
use crate::metrics::GateMetrics;
use crate::submission::{Enquiry, EnquirySubmission};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

pub const INVALID_BODY_MESSAGE: &str = "Invalid request body";
pub const DISPATCH_FAILED_MESSAGE: &str = "Failed to send email";
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Shared application state.
pub struct AppState {
    pub gate: AdmissionGate,
    pub mailer: Arc<dyn EnquiryMailer>,
    pub metrics: GateMetrics,
    pub config: Config,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
}

/// Body returned once an enquiry has been sent.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    pub data: DispatchReceipt,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Which challenge widget the form should render.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationInfo {
    pub provider: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_key: Option<String>,
}

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    let route = state.config.route.clone();
    let mut app = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route(&route, post(contact))
        .route(&format!("{route}/verification"), get(verification_info));

    if state.config.metrics.enabled {
        app = app.route(&state.config.metrics.path, get(metrics));
    }

    app.layer(CatchPanicLayer::custom(internal_error))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn error_response(status: StatusCode, message: &'static str) -> Response {
    (status, Json(ErrorResponse { error: message })).into_response()
}

fn internal_error(_panic: Box<dyn Any + Send + 'static>) -> Response {
    error!("Handler panicked");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
}

/// HTTP status for a denial.
pub fn denial_status(denial: &Denial) -> StatusCode {
    match denial {
        Denial::MissingFields | Denial::Honeypot => StatusCode::BAD_REQUEST,
        Denial::BotCheckFailed => StatusCode::FORBIDDEN,
        Denial::VerificationUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        Denial::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
    }
}

fn denial_response(denial: Denial) -> Response {
    let status = denial_status(&denial);
    let body = Json(ErrorResponse {
        error: denial.public_message(),
    });

    match denial.retry_after_secs() {
        Some(secs) => (status, [(header::RETRY_AFTER, secs.to_string())], body).into_response(),
        None => (status, body).into_response(),
    }
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "enquiry-gate",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Tell the contact form which verification widget to load.
pub async fn verification_info(State(state): State<Arc<AppState>>) -> Json<VerificationInfo> {
    let verification = &state.config.verification;
    Json(VerificationInfo {
        provider: state.gate.verification().provider().as_str(),
        site_key: verification.site_key().map(String::from),
    })
}

/// Prometheus metrics endpoint.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    match state.metrics.render() {
        Ok(text) => text.into_response(),
        Err(err) => {
            error!(error = %err, "Failed to render metrics");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
        }
    }
}

/// Accept a contact form submission.
pub async fn contact(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<EnquirySubmission>, JsonRejection>,
) -> Response {
    let Json(submission) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            info!(error = %rejection.body_text(), "Rejected unreadable enquiry body");
            return error_response(StatusCode::BAD_REQUEST, INVALID_BODY_MESSAGE);
        }
    };

    let client = ClientIdentity::from_headers(&headers, &state.config.route);
    debug!(client = %client.address(), "Processing enquiry");

    let decision = state.gate.evaluate(&submission, &client, Utc::now()).await;
    state.metrics.record_decision(&decision);
    state
        .metrics
        .set_tracked_keys(state.gate.ledger().tracked_keys());

    match decision {
        AdmissionDecision::Allowed(enquiry) => dispatch(&state, &client, enquiry).await,
        AdmissionDecision::Denied(denial) => {
            match denial {
                Denial::MissingFields => {
                    debug!(client = %client.address(), "Enquiry missing required fields")
                }
                Denial::VerificationUnavailable => {
                    error!("Enquiry blocked: bot verification is not configured")
                }
                _ => info!(
                    client = %client.address(),
                    reason = denial.label(),
                    retry_after_secs = ?denial.retry_after_secs(),
                    "Enquiry denied"
                ),
            }
            denial_response(denial)
        }
    }
}

async fn dispatch(state: &AppState, client: &ClientIdentity, enquiry: Enquiry) -> Response {
    match state.mailer.send(&enquiry).await {
        Ok(receipt) => {
            info!(
                client = %client.address(),
                inquiry_type = %enquiry.inquiry_type,
                message_id = ?receipt.id,
                "Enquiry dispatched"
            );
            (
                StatusCode::OK,
                Json(SuccessResponse {
                    success: true,
                    data: receipt,
                }),
            )
                .into_response()
        }
        Err(err) => {
            error!(client = %client.address(), error = %err, "Failed to send enquiry email");
            state.metrics.record_dispatch_failure();
            error_response(StatusCode::INTERNAL_SERVER_ERROR, DISPATCH_FAILED_MESSAGE)
        }
    }
}
