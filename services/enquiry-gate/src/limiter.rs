// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Fixed-window rate limiter with lazy pruning.
//!
//! Each client key maps to the timestamps of its accepted submissions, in
//! arrival order. On every check the sequence is pruned to the entries newer
//! than `now - window`, compared against the cap, and either extended with
//! `now` or left as is. Nothing is swept in the background: a key that goes
//! quiet keeps its last sequence until it is checked again.
//!
//! The whole prune/count/append step runs under the `DashMap` entry guard for
//! that key, so two concurrent checks for the same client cannot both take
//! the last slot.

use crate::config::RateLimitConfig;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

/// Result of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Request is allowed and has been recorded
    Allowed {
        /// Slots left in the current window after this one
        remaining: u64,
    },
    /// Request is rate limited and was not recorded
    Limited {
        /// Whole seconds until the oldest live entry expires, at least 1
        retry_after_secs: u64,
    },
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed { .. })
    }
}

/// Per-client ledger of accepted submission timestamps.
pub struct RateLimitLedger {
    config: RateLimitConfig,
    /// Key -> accepted timestamps in milliseconds since the epoch
    entries: DashMap<String, Vec<i64>>,
}

impl RateLimitLedger {
    /// Create an empty ledger with the given configuration.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            entries: DashMap::new(),
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Check and record a submission for `key` at `now`.
    pub fn check(&self, key: &str, now: DateTime<Utc>) -> RateLimitResult {
        let now_ms = now.timestamp_millis();
        let window_ms =
            i64::try_from(self.config.window_duration().as_millis()).unwrap_or(i64::MAX);
        let window_start = now_ms.saturating_sub(window_ms);

        let mut timestamps = self.entries.entry(key.to_owned()).or_default();
        timestamps.retain(|&t| t > window_start);

        let live = timestamps.len() as u64;
        if live >= self.config.max_requests {
            // Pruned set stays stored; the denied attempt is not appended
            let oldest = timestamps.first().copied().unwrap_or(now_ms);
            let wait_ms = oldest.saturating_add(window_ms).saturating_sub(now_ms);
            return RateLimitResult::Limited {
                retry_after_secs: ceil_secs(wait_ms).max(1),
            };
        }

        timestamps.push(now_ms);
        RateLimitResult::Allowed {
            remaining: self.config.max_requests - live - 1,
        }
    }

    /// Number of live entries for `key` as of the last check. Stale entries
    /// are only removed by [`RateLimitLedger::check`].
    pub fn recorded(&self, key: &str) -> usize {
        self.entries.get(key).map(|t| t.len()).unwrap_or(0)
    }

    /// Number of distinct keys held in memory.
    pub fn tracked_keys(&self) -> usize {
        self.entries.len()
    }
}

fn ceil_secs(ms: i64) -> u64 {
    if ms <= 0 {
        0
    } else {
        ((ms + 999) / 1000) as u64
    }
}
