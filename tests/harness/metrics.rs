// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Metrics collection for abuse simulation results.

use std::collections::HashMap;

/// Collects outcomes during an abuse simulation.
#[derive(Debug, Default)]
pub struct AttackMetrics {
    /// Count of submissions by outcome
    outcomes: HashMap<Outcome, usize>,
    /// Count of submissions by IP
    requests_per_ip: HashMap<String, usize>,
    /// Count of delivered submissions by IP
    delivered_per_ip: HashMap<String, usize>,
}

/// Possible outcomes for a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Delivered,
    RateLimited,
    Invalid,
    Honeypot,
}

impl AttackMetrics {
    /// Create a new metrics collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a submission outcome.
    pub fn record(&mut self, outcome: Outcome, ip: &str) {
        *self.outcomes.entry(outcome).or_insert(0) += 1;
        *self.requests_per_ip.entry(ip.to_string()).or_insert(0) += 1;
        if outcome == Outcome::Delivered {
            *self.delivered_per_ip.entry(ip.to_string()).or_insert(0) += 1;
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

    /// Ratio of submissions that never reached the mailer.
    pub fn block_rate(&self) -> f64 {
        let total = self.total_requests();
        if total == 0 {
            return 0.0;
        }
        (total - self.count(Outcome::Delivered)) as f64 / total as f64
    }

    /// Most submissions delivered for any one IP.
    pub fn max_delivered_per_ip(&self) -> usize {
        self.delivered_per_ip.values().copied().max().unwrap_or(0)
    }

    /// Get number of unique IPs that submitted.
    pub fn unique_ips(&self) -> usize {
        self.requests_per_ip.len()
    }

    /// Generate a summary report.
    pub fn report(&self) -> MetricsReport {
        MetricsReport {
            total_requests: self.total_requests(),
            delivered: self.count(Outcome::Delivered),
            rate_limited: self.count(Outcome::RateLimited),
            invalid: self.count(Outcome::Invalid),
            honeypot: self.count(Outcome::Honeypot),
            block_rate: self.block_rate(),
            max_delivered_per_ip: self.max_delivered_per_ip(),
            unique_ips: self.unique_ips(),
        }
    }
}

/// Summary report of an abuse simulation.
#[derive(Debug, Clone)]
pub struct MetricsReport {
    pub total_requests: usize,
    pub delivered: usize,
    pub rate_limited: usize,
    pub invalid: usize,
    pub honeypot: usize,
    pub block_rate: f64,
    pub max_delivered_per_ip: usize,
    pub unique_ips: usize,
}

impl std::fmt::Display for MetricsReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Contact Abuse Report ===")?;
        writeln!(f, "Total Submissions: {}", self.total_requests)?;
        writeln!(f, "Delivered:         {}", self.delivered)?;
        writeln!(f, "Rate Limited:      {}", self.rate_limited)?;
        writeln!(f, "Invalid:           {}", self.invalid)?;
        writeln!(f, "Honeypot:          {}", self.honeypot)?;
        writeln!(f, "Block Rate:        {:.1}%", self.block_rate * 100.0)?;
        writeln!(f, "Max per IP:        {}", self.max_delivered_per_ip)?;
        writeln!(f, "Unique IPs:        {}", self.unique_ips)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_collection() {
        let mut metrics = AttackMetrics::new();
        metrics.record(Outcome::Delivered, "10.0.0.1");
        metrics.record(Outcome::Delivered, "10.0.0.1");
        metrics.record(Outcome::RateLimited, "10.0.0.1");
        metrics.record(Outcome::Honeypot, "10.0.0.2");

        assert_eq!(metrics.total_requests(), 4);
        assert_eq!(metrics.count(Outcome::Delivered), 2);
        assert_eq!(metrics.max_delivered_per_ip(), 2);
        assert_eq!(metrics.unique_ips(), 2);
        assert!((metrics.block_rate() - 0.5).abs() < 0.01);
    }
}
