// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Test data generators for abuse simulation.

use enquiry_gate::submission::EnquirySubmission;
use std::net::{IpAddr, Ipv4Addr};

/// Generate a pool of IP addresses for testing.
pub fn generate_ips(count: usize) -> Vec<IpAddr> {
    (0..count)
        .map(|i| {
            // Use 10.x.x.x private range
            let a = ((i >> 16) & 0xFF) as u8;
            let b = ((i >> 8) & 0xFF) as u8;
            let c = (i & 0xFF) as u8;
            IpAddr::V4(Ipv4Addr::new(10, a, b, c))
        })
        .collect()
}

/// A well-formed enquiry, numbered so repeated submissions differ.
pub fn legitimate_submission(i: usize) -> EnquirySubmission {
    EnquirySubmission {
        full_name: Some(format!("Visitor {i}")),
        phone: Some(format!("0400 000 {:03}", i % 1000)),
        email: Some(format!("visitor{i}@example.com")),
        inquiry_type: Some(["inspection", "pricing", "general"][i % 3].to_string()),
        message: Some("Is the property still available?".to_string()),
        ..Default::default()
    }
}

/// A form-filling bot: every field populated, honeypot included.
pub fn honeypot_submission(i: usize) -> EnquirySubmission {
    EnquirySubmission {
        website: Some(format!("http://spam-{i}.example")),
        ..legitimate_submission(i)
    }
}

/// A scripted post that skips a required field.
pub fn incomplete_submission(i: usize) -> EnquirySubmission {
    let mut submission = legitimate_submission(i);
    match i % 4 {
        0 => submission.full_name = None,
        1 => submission.phone = Some("   ".to_string()),
        2 => submission.email = Some(String::new()),
        _ => submission.inquiry_type = None,
    }
    submission
}

/// Honeypot values that must all be detected, including ones padded
/// with whitespace.
pub fn generate_honeypot_values() -> Vec<&'static str> {
    vec![
        "http://spam.example",
        "x",
        " https://casino.example ",
        "\tbuy now\n",
        "0",
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_ips() {
        let ips = generate_ips(256);
        assert_eq!(ips.len(), 256);
        // All should be unique
        let unique: std::collections::HashSet<_> = ips.iter().collect();
        assert_eq!(unique.len(), 256);
    }

    #[test]
    fn test_generated_submissions() {
        assert!(legitimate_submission(7).validate().is_some());
        assert!(honeypot_submission(7).honeypot_triggered());
        for i in 0..4 {
            assert!(incomplete_submission(i).validate().is_none());
        }
    }
}
