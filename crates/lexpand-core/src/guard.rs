//! Latency guard — times a pipeline run against a soft budget.
//!
//! Exceeding the budget produces a [`LatencyBudgetExceeded`] value and a
//! warn-level log record. The wrapped computation always runs to completion
//! and its output is returned unchanged.

use serde::Serialize;
use std::time::{Duration, Instant};

pub const DEFAULT_BUDGET: Duration = Duration::from_millis(40);

/// Soft signal: a run took longer than the configured budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LatencyBudgetExceeded {
    #[serde(with = "millis")]
    pub elapsed: Duration,
    #[serde(with = "millis")]
    pub budget: Duration,
}

/// A value together with how long it took to produce.
#[derive(Debug, Clone)]
pub struct Timed<T> {
    pub value: T,
    pub elapsed: Duration,
    pub exceeded: Option<LatencyBudgetExceeded>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatencyGuard {
    budget: Duration,
}

impl Default for LatencyGuard {
    fn default() -> Self {
        Self::new(DEFAULT_BUDGET)
    }
}

impl LatencyGuard {
    pub fn new(budget: Duration) -> Self {
        Self { budget }
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Run `f`, measure it, and flag it if it overran the budget.
    pub fn observe<T>(&self, operation: &str, f: impl FnOnce() -> T) -> Timed<T> {
        let started = Instant::now();
        let value = f();
        let elapsed = started.elapsed();

        let exceeded = (elapsed > self.budget).then(|| {
            tracing::warn!(
                operation,
                elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                budget_ms = self.budget.as_secs_f64() * 1000.0,
                "latency budget exceeded"
            );
            LatencyBudgetExceeded {
                elapsed,
                budget: self.budget,
            }
        });

        Timed {
            value,
            elapsed,
            exceeded,
        }
    }
}

pub(crate) mod millis {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64() * 1000.0)
    }
}
