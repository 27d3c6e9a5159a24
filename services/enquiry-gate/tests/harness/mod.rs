// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Test harness for enquiry gate abuse simulation.
//!
//! Simulated time is passed straight to the gate, so long attacks run
//! instantly and deterministically.

pub mod attacks;
pub mod generators;
pub mod metrics;
