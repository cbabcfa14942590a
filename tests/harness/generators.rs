// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Test data generators for abuse simulation.

use serde_json::{json, Value};
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

/// A well-formed submission, varied by index.
pub fn valid_form(i: usize) -> Value {
    json!({
        "name": format!("Prospect {i}"),
        "email": format!("prospect{i}@example.com"),
        "org": format!("Company {}", i % 7),
        "message": format!("Inquiry number {i}: we need help with our platform roadmap."),
    })
}

/// A submission with the honeypot filled, otherwise well-formed.
pub fn honeypot_form(i: usize) -> Value {
    let mut form = valid_form(i);
    form["company"] = json!(format!("Bot Corp {i}"));
    form
}

/// Submissions that break at least one validator rule.
pub fn invalid_forms() -> Vec<Value> {
    vec![
        // Name too short
        json!({ "name": "x", "email": "a@b.co", "message": "Long enough message" }),
        // Bad email
        json!({ "name": "Spam", "email": "spam-at-example", "message": "Long enough message" }),
        // Message too short
        json!({ "name": "Spam", "email": "spam@example.com", "message": "buy now" }),
        // Oversized message
        json!({ "name": "Spam", "email": "spam@example.com", "message": "x".repeat(5001) }),
        // Wrong types
        json!({ "name": 1, "email": true, "message": ["a"] }),
        // Empty object
        json!({}),
        // Malformed bot posting a filled honeypot still gets a validation error
        json!({ "name": "", "email": "", "message": "", "company": "Bot Corp" }),
    ]
}
