//! Performance monitor — per-operation timing samples and summary statistics.
//!
//! The engine records `query_rewrite` after every run and `lexicon_load` on
//! every reload. Percentiles use linear interpolation between closest ranks.
//!
//! Each operation keeps only its most recent samples (a ring of
//! `max_samples`), so memory and the cost of a report stay bounded however
//! long the process runs.

use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

pub const QUERY_REWRITE: &str = "query_rewrite";
pub const LEXICON_LOAD: &str = "lexicon_load";

/// Samples kept per operation unless configured otherwise.
pub const DEFAULT_MAX_SAMPLES: usize = 10_000;

/// Summary of one operation's samples, all times in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationStats {
    pub operation: String,
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub p95: f64,
    pub p99: f64,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug)]
pub struct PerfMonitor {
    samples: Mutex<BTreeMap<String, VecDeque<f64>>>,
    max_samples: usize,
}

impl Default for PerfMonitor {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_SAMPLES)
    }
}

impl PerfMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `max_samples` (at least one) per operation; older
    /// samples are evicted first.
    pub fn with_capacity(max_samples: usize) -> Self {
        Self {
            samples: Mutex::new(BTreeMap::new()),
            max_samples: max_samples.max(1),
        }
    }

    pub fn max_samples(&self) -> usize {
        self.max_samples
    }

    pub fn record(&self, operation: &str, elapsed: Duration) {
        self.record_ms(operation, elapsed.as_secs_f64() * 1000.0);
    }

    pub fn record_ms(&self, operation: &str, ms: f64) {
        let mut samples = self.samples.lock().unwrap_or_else(|e| e.into_inner());
        let ring = samples.entry(operation.to_string()).or_default();
        if ring.len() == self.max_samples {
            ring.pop_front();
        }
        ring.push_back(ms);
    }

    /// `None` when the operation has no samples.
    pub fn stats(&self, operation: &str) -> Option<OperationStats> {
        let data = {
            let samples = self.samples.lock().unwrap_or_else(|e| e.into_inner());
            samples.get(operation)?.iter().copied().collect::<Vec<_>>()
        };
        summarize(operation, data)
    }

    /// Stats for every operation that has samples, ordered by name.
    pub fn report(&self) -> Vec<OperationStats> {
        let copies: Vec<(String, Vec<f64>)> = {
            let samples = self.samples.lock().unwrap_or_else(|e| e.into_inner());
            samples
                .iter()
                .map(|(op, data)| (op.clone(), data.iter().copied().collect()))
                .collect()
        };
        copies
            .into_iter()
            .filter_map(|(op, data)| summarize(&op, data))
            .collect()
    }

    /// Drop the samples of one operation, or of all when `operation` is `None`.
    pub fn reset(&self, operation: Option<&str>) {
        let mut samples = self.samples.lock().unwrap_or_else(|e| e.into_inner());
        match operation {
            Some(op) => {
                samples.remove(op);
            }
            None => samples.clear(),
        }
    }
}

/// Sorting happens here, outside the lock.
fn summarize(operation: &str, mut sorted: Vec<f64>) -> Option<OperationStats> {
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));
    Some(OperationStats {
        operation: operation.to_string(),
        count: sorted.len(),
        mean: sorted.iter().sum::<f64>() / sorted.len() as f64,
        median: percentile(&sorted, 50.0),
        p95: percentile(&sorted, 95.0),
        p99: percentile(&sorted, 99.0),
        min: sorted[0],
        max: sorted[sorted.len() - 1],
    })
}

/// `sorted` must be non-empty and ascending.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
}
