// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Outcome collection for abuse simulation results.

use enquiry_gate::gate::{AdmissionDecision, Denial};
use std::collections::{HashMap, HashSet};

/// Possible outcomes for a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Allowed,
    MissingFields,
    Honeypot,
    BotCheckFailed,
    Unavailable,
    RateLimited,
}

impl From<&AdmissionDecision> for Outcome {
    fn from(decision: &AdmissionDecision) -> Self {
        match decision {
            AdmissionDecision::Allowed(_) => Outcome::Allowed,
            AdmissionDecision::Denied(Denial::MissingFields) => Outcome::MissingFields,
            AdmissionDecision::Denied(Denial::Honeypot) => Outcome::Honeypot,
            AdmissionDecision::Denied(Denial::BotCheckFailed) => Outcome::BotCheckFailed,
            AdmissionDecision::Denied(Denial::VerificationUnavailable) => Outcome::Unavailable,
            AdmissionDecision::Denied(Denial::RateLimited { .. }) => Outcome::RateLimited,
        }
    }
}

/// Collects outcomes during an attack simulation.
#[derive(Debug, Default)]
pub struct AttackMetrics {
    /// Count of submissions by outcome
    outcomes: HashMap<Outcome, usize>,
    /// Count of allowed submissions by client
    allowed_per_ip: HashMap<String, usize>,
    /// Clients seen
    ips: HashSet<String>,
    /// Distinct public messages returned for abuse denials
    abuse_messages: HashSet<&'static str>,
    /// Largest Retry-After advertised, in seconds
    max_retry_after_secs: u64,
}

impl AttackMetrics {
    /// Create a new metrics collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a decision for `ip`.
    pub fn record(&mut self, decision: &AdmissionDecision, ip: &str) {
        let outcome = Outcome::from(decision);
        *self.outcomes.entry(outcome).or_insert(0) += 1;
        self.ips.insert(ip.to_string());

        match decision {
            AdmissionDecision::Allowed(_) => {
                *self.allowed_per_ip.entry(ip.to_string()).or_insert(0) += 1;
            }
            AdmissionDecision::Denied(denial) => {
                if matches!(outcome, Outcome::Honeypot | Outcome::BotCheckFailed | Outcome::RateLimited) {
                    self.abuse_messages.insert(denial.public_message());
                }
                if let Some(secs) = denial.retry_after_secs() {
                    self.max_retry_after_secs = self.max_retry_after_secs.max(secs);
                }
            }
        }
    }

    /// Get total submission count.
    pub fn total_requests(&self) -> usize {
        self.outcomes.values().sum()
    }

    /// Get count for a specific outcome.
    pub fn count(&self, outcome: Outcome) -> usize {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    /// Get block rate (ratio of blocked to total).
    pub fn block_rate(&self) -> f64 {
        let total = self.total_requests();
        if total == 0 {
            return 0.0;
        }
        let allowed = self.count(Outcome::Allowed);
        (total - allowed) as f64 / total as f64
    }

    /// Most submissions any single client got through.
    pub fn max_allowed_per_ip(&self) -> usize {
        self.allowed_per_ip.values().copied().max().unwrap_or(0)
    }

    /// Generate a summary report.
    pub fn report(&self) -> MetricsReport {
        MetricsReport {
            total_requests: self.total_requests(),
            allowed: self.count(Outcome::Allowed),
            rate_limited: self.count(Outcome::RateLimited),
            honeypot: self.count(Outcome::Honeypot),
            missing_fields: self.count(Outcome::MissingFields),
            block_rate: self.block_rate(),
            unique_ips: self.ips.len(),
            max_allowed_per_ip: self.max_allowed_per_ip(),
            distinct_abuse_messages: self.abuse_messages.len(),
            max_retry_after_secs: self.max_retry_after_secs,
        }
    }
}

/// Summary report of attack metrics.
#[derive(Debug, Clone)]
pub struct MetricsReport {
    pub total_requests: usize,
    pub allowed: usize,
    pub rate_limited: usize,
    pub honeypot: usize,
    pub missing_fields: usize,
    pub block_rate: f64,
    pub unique_ips: usize,
    pub max_allowed_per_ip: usize,
    pub distinct_abuse_messages: usize,
    pub max_retry_after_secs: u64,
}

impl std::fmt::Display for MetricsReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Attack Metrics Report ===")?;
        writeln!(f, "Total Requests:    {}", self.total_requests)?;
        writeln!(f)?;
        writeln!(f, "--- Outcomes ---")?;
        writeln!(f, "Allowed:           {} ({:.1}%)",
            self.allowed,
            self.allowed as f64 / self.total_requests.max(1) as f64 * 100.0)?;
        writeln!(f, "Rate Limited:      {}", self.rate_limited)?;
        writeln!(f, "Honeypot:          {}", self.honeypot)?;
        writeln!(f, "Missing Fields:    {}", self.missing_fields)?;
        writeln!(f, "Block Rate:        {:.1}%", self.block_rate * 100.0)?;
        writeln!(f)?;
        writeln!(f, "--- Distribution ---")?;
        writeln!(f, "Unique IPs:        {}", self.unique_ips)?;
        writeln!(f, "Max Allowed/IP:    {}", self.max_allowed_per_ip)?;
        writeln!(f, "Max Retry-After:   {} s", self.max_retry_after_secs)?;
        Ok(())
    }
}
