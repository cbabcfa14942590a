// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Abuse simulation patterns for the contact endpoint.

/// Abuse pattern configuration.
#[derive(Debug, Clone)]
pub struct AttackConfig {
    /// Total number of submissions to send
    pub total_requests: usize,
    /// Submissions per second (simulated clock)
    pub requests_per_second: f64,
    /// Number of unique IPs to simulate
    pub unique_ips: usize,
    /// Share of submissions with the honeypot filled (0.0-1.0)
    pub honeypot_ratio: f64,
    /// Share of submissions failing validation (0.0-1.0)
    pub invalid_ratio: f64,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            total_requests: 100,
            requests_per_second: 10.0,
            unique_ips: 1,
            honeypot_ratio: 0.0,
            invalid_ratio: 0.0,
        }
    }
}

/// Predefined abuse patterns.
impl AttackConfig {
    /// Single IP flood: one client hammering the form.
    pub fn single_ip_flood() -> Self {
        Self {
            total_requests: 200,
            requests_per_second: 10.0,
            unique_ips: 1,
            ..Default::default()
        }
    }

    /// Distributed spam: many clients, a few submissions each.
    pub fn distributed_spam() -> Self {
        Self {
            total_requests: 400,
            requests_per_second: 20.0,
            unique_ips: 100,
            ..Default::default()
        }
    }

    /// Form-filling bots that fall into the honeypot.
    pub fn honeypot_bots() -> Self {
        Self {
            total_requests: 100,
            requests_per_second: 5.0,
            unique_ips: 50,
            honeypot_ratio: 1.0,
            ..Default::default()
        }
    }

    /// Garbage submissions from many clients.
    pub fn junk_submissions() -> Self {
        Self {
            total_requests: 140,
            requests_per_second: 5.0,
            unique_ips: 70,
            invalid_ratio: 1.0,
            ..Default::default()
        }
    }

    /// One client submitting slowly, once every ten minutes.
    pub fn slow_drip() -> Self {
        Self {
            total_requests: 30,
            requests_per_second: 1.0 / 600.0,
            unique_ips: 1,
            ..Default::default()
        }
    }

    /// Mixed traffic: some humans, some bots, some junk.
    pub fn mixed_traffic() -> Self {
        Self {
            total_requests: 300,
            requests_per_second: 2.0,
            unique_ips: 60,
            honeypot_ratio: 0.3,
            invalid_ratio: 0.2,
        }
    }
}
