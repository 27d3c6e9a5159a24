// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Abuse patterns for security testing.

/// What kind of submission an attacker sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    /// Well-formed enquiries
    Legitimate,
    /// Honeypot filled in
    Honeypot,
    /// Required field missing
    Incomplete,
}

/// Attack pattern configuration.
#[derive(Debug, Clone)]
pub struct AttackConfig {
    /// Total number of submissions to send
    pub total_requests: usize,
    /// Simulated gap between submissions in milliseconds
    pub interval_ms: i64,
    /// Number of unique client addresses to rotate through
    pub unique_ips: usize,
    /// Submission shape
    pub payload: Payload,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            total_requests: 100,
            interval_ms: 100,
            unique_ips: 1,
            payload: Payload::Legitimate,
        }
    }
}

/// Predefined attack patterns.
impl AttackConfig {
    /// Single IP flood - one client hammering the form.
    pub fn single_ip_flood() -> Self {
        Self {
            total_requests: 200,
            interval_ms: 10,
            ..Default::default()
        }
    }

    /// Distributed flood - many clients, a few submissions each.
    pub fn distributed_flood() -> Self {
        Self {
            total_requests: 1000,
            interval_ms: 20,
            unique_ips: 100,
            ..Default::default()
        }
    }

    /// Form-filling bot that falls for the honeypot.
    pub fn honeypot_bot() -> Self {
        Self {
            total_requests: 50,
            interval_ms: 1_000,
            unique_ips: 10,
            payload: Payload::Honeypot,
        }
    }

    /// Scripted posts with fields missing.
    pub fn missing_fields() -> Self {
        Self {
            total_requests: 50,
            interval_ms: 1_000,
            unique_ips: 5,
            payload: Payload::Incomplete,
        }
    }

    /// Slow drip - one client spacing submissions just over the average
    /// allowed rate.
    pub fn slow_drip(window_secs: u64, max_requests: u64) -> Self {
        let spacing = (window_secs as i64 * 1000) / max_requests as i64 + 1;
        Self {
            total_requests: 60,
            interval_ms: spacing,
            ..Default::default()
        }
    }
}
