// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Client identity derived from proxy headers.
//!
//! The service runs behind a reverse proxy, so the peer address is the
//! proxy's. The submitting client is taken from `X-Forwarded-For` (first
//! hop), then `X-Real-IP`, then the literal `unknown`. All clients without
//! either header therefore share one bucket.

use axum::http::HeaderMap;

pub const UNKNOWN_CLIENT: &str = "unknown";

/// Who is submitting, and the rate-limit key derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    address: String,
    key: String,
}

impl ClientIdentity {
    /// Bucket `address` under `route`, so the same client is counted
    /// separately on each protected endpoint.
    pub fn new(address: impl Into<String>, route: &str) -> Self {
        let address = address.into();
        let key = format!("{address}:{route}");
        Self { address, key }
    }

    pub fn from_headers(headers: &HeaderMap, route: &str) -> Self {
        Self::new(client_address(headers), route)
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Rate-limit key, e.g. `1.2.3.4:/api/contact`.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Address to bind a verification token to, if one is known.
    pub fn remote_ip(&self) -> Option<&str> {
        (self.address != UNKNOWN_CLIENT).then_some(self.address.as_str())
    }
}

/// Derive the client address from forwarding headers.
pub fn client_address(headers: &HeaderMap) -> String {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

    if let Some(forwarded_for) = header("x-forwarded-for") {
        let first = forwarded_for.split(',').next().unwrap_or("").trim();
        return if first.is_empty() {
            UNKNOWN_CLIENT.to_string()
        } else {
            first.to_string()
        };
    }

    if let Some(real_ip) = header("x-real-ip") {
        let real_ip = real_ip.trim();
        return if real_ip.is_empty() {
            UNKNOWN_CLIENT.to_string()
        } else {
            real_ip.to_string()
        };
    }

    UNKNOWN_CLIENT.to_string()
}
