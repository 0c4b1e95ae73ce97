//! Named counters and timing for a single pipeline step.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Instant;

/// Append-only counter map. One collector per step, passed by `&mut`.
#[derive(Debug)]
pub struct RunStats {
    counters: BTreeMap<String, u64>,
    started: Instant,
    started_at: DateTime<Utc>,
}

/// Snapshot of a [`RunStats`] collector, ready to log or write as JSON.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub counters: BTreeMap<String, u64>,
    pub elapsed_seconds: f64,
    pub started_at: String,
    pub generated_at: String,
}

impl RunStats {
    pub fn new() -> Self {
        RunStats {
            counters: BTreeMap::new(),
            started: Instant::now(),
            started_at: Utc::now(),
        }
    }

    pub fn increment(&mut self, key: &str, amount: u64) {
        *self.counters.entry(key.to_string()).or_insert(0) += amount;
    }

    pub fn increment_one(&mut self, key: &str) {
        self.increment(key, 1);
    }

    pub fn set(&mut self, key: &str, value: u64) {
        self.counters.insert(key.to_string(), value);
    }

    /// Counter value, 0 when never touched
    pub fn get(&self, key: &str) -> u64 {
        self.counters.get(key).copied().unwrap_or(0)
    }

    pub fn counters(&self) -> &BTreeMap<String, u64> {
        &self.counters
    }

    pub fn summary(&self) -> StatsSummary {
        StatsSummary {
            counters: self.counters.clone(),
            elapsed_seconds: self.started.elapsed().as_secs_f64(),
            started_at: self.started_at.to_rfc3339(),
            generated_at: Utc::now().to_rfc3339(),
        }
    }
}

impl Default for RunStats {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsSummary {
    /// One `key=value` pair per counter, in key order
    pub fn render(&self) -> String {
        let mut parts: Vec<String> = self
            .counters
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        parts.push(format!("elapsed={:.2}s", self.elapsed_seconds));
        parts.join(" ")
    }
}
