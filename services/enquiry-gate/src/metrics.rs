// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus metrics for admission decisions.

use crate::gate::AdmissionDecision;
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

/// Metrics owned by one running service.
pub struct GateMetrics {
    registry: Registry,
    decisions: IntCounterVec,
    dispatch_failures: IntCounter,
    tracked_keys: IntGauge,
}

impl GateMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let decisions = IntCounterVec::new(
            Opts::new("enquiry_decisions_total", "Admission decisions by outcome"),
            &["outcome"],
        )?;
        let dispatch_failures = IntCounter::new(
            "enquiry_dispatch_failures_total",
            "Admitted enquiries whose email could not be sent",
        )?;
        let tracked_keys = IntGauge::new(
            "enquiry_rate_limit_tracked_keys",
            "Client keys currently held by the rate-limit ledger",
        )?;

        registry.register(Box::new(decisions.clone()))?;
        registry.register(Box::new(dispatch_failures.clone()))?;
        registry.register(Box::new(tracked_keys.clone()))?;

        Ok(Self {
            registry,
            decisions,
            dispatch_failures,
            tracked_keys,
        })
    }

    pub fn record_decision(&self, decision: &AdmissionDecision) {
        let outcome = match decision {
            AdmissionDecision::Allowed(_) => "allowed",
            AdmissionDecision::Denied(denial) => denial.label(),
        };
        self.decisions.with_label_values(&[outcome]).inc();
    }

    pub fn record_dispatch_failure(&self) {
        self.dispatch_failures.inc();
    }

    pub fn set_tracked_keys(&self, count: usize) {
        self.tracked_keys.set(count as i64);
    }

    /// Render all metrics in the Prometheus text format.
    pub fn render(&self) -> prometheus::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
