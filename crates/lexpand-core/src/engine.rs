//! Engine — the query pipeline bound to a swappable lexicon.
//!
//! ```text
//! raw text ──► normalize ──► find_spans ──► disambiguate ──► expand
//!    └──────────────── LatencyGuard (timing, soft budget) ────────┘
//! ```
//!
//! Every run takes one lexicon snapshot up front, so a concurrent
//! [`Engine::reload`] never mixes two versions inside a single query.

use crate::config::Settings;
use crate::disambiguator::disambiguate;
use crate::error::ArtifactLoadError;
use crate::expander::{expand, ExpansionOptions};
use crate::guard::{LatencyBudgetExceeded, LatencyGuard};
use crate::lexicon::{Lexicon, LexiconHandle};
use crate::matcher::find_spans;
use crate::monitor::{PerfMonitor, LEXICON_LOAD, QUERY_REWRITE};
use crate::normalizer::NormalizedQuery;
use crate::telemetry::{new_query_id, TelemetryEvent, TelemetrySink, TracingSink};
use crate::types::ExpansionResult;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Run the full pipeline against one lexicon. Pure: no clock, no logging sinks.
pub fn rewrite(lexicon: &Lexicon, input: &str, options: &ExpansionOptions) -> ExpansionResult {
    let query = NormalizedQuery::new(input);
    let spans = find_spans(lexicon, &query);
    let outcome = disambiguate(lexicon, &query, spans);
    let dropped = outcome.dropped.into_iter().map(|d| d.surface).collect();
    expand(lexicon, query.as_str(), &outcome.resolved, dropped, options)
}

/// One engine call: the result plus how it was produced.
#[derive(Debug, Clone, Serialize)]
pub struct RewriteOutcome {
    pub result: ExpansionResult,
    #[serde(rename = "elapsed_ms", with = "crate::guard::millis")]
    pub elapsed: Duration,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_exceeded: Option<LatencyBudgetExceeded>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lexicon_version: Option<String>,
    /// Set when the call carried a caller identifier and telemetry is on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_id: Option<String>,
}

/// Shared query-expansion engine. Cheap to clone; clones share the lexicon
/// slot, the monitor and the telemetry sink.
#[derive(Clone)]
pub struct Engine {
    lexicon: LexiconHandle,
    options: ExpansionOptions,
    guard: LatencyGuard,
    monitor: Option<Arc<PerfMonitor>>,
    telemetry: Option<Arc<dyn TelemetrySink>>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("options", &self.options)
            .field("guard", &self.guard)
            .field("monitor", &self.monitor.is_some())
            .field("telemetry", &self.telemetry.is_some())
            .finish()
    }
}

impl Engine {
    /// Engine with default budget, no caps, no monitor and no telemetry.
    pub fn new(lexicon: Lexicon) -> Self {
        Self {
            lexicon: LexiconHandle::new(lexicon),
            options: ExpansionOptions::default(),
            guard: LatencyGuard::default(),
            monitor: None,
            telemetry: None,
        }
    }

    /// Load the configured artifact and wire collaborators from `settings`.
    /// Fails fast if the artifact cannot be loaded.
    pub fn from_settings(settings: &Settings) -> Result<Self, ArtifactLoadError> {
        let started = Instant::now();
        let lexicon = Lexicon::from_path(&settings.lexicon.path)?;
        let mut engine = Self::new(lexicon)
            .with_options(settings.engine.expansion_options())
            .with_budget(settings.engine.latency_budget());
        if settings.telemetry.track_performance {
            let monitor = Arc::new(PerfMonitor::with_capacity(settings.telemetry.max_samples));
            monitor.record(LEXICON_LOAD, started.elapsed());
            engine = engine.with_monitor(monitor);
        }
        if settings.telemetry.enabled {
            engine = engine.with_telemetry(Arc::new(TracingSink));
        }
        Ok(engine)
    }

    pub fn with_options(mut self, options: ExpansionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.guard = LatencyGuard::new(budget);
        self
    }

    pub fn with_monitor(mut self, monitor: Arc<PerfMonitor>) -> Self {
        self.monitor = Some(monitor);
        self
    }

    pub fn with_telemetry(mut self, sink: Arc<dyn TelemetrySink>) -> Self {
        self.telemetry = Some(sink);
        self
    }

    pub fn lexicon(&self) -> Arc<Lexicon> {
        self.lexicon.snapshot()
    }

    pub fn monitor(&self) -> Option<&PerfMonitor> {
        self.monitor.as_deref()
    }

    pub fn options(&self) -> &ExpansionOptions {
        &self.options
    }

    /// Swap in a new lexicon. Queries already running finish on the old one.
    pub fn reload(&self, lexicon: Lexicon) -> Arc<Lexicon> {
        let previous = self.lexicon.swap(lexicon);
        let current = self.lexicon.snapshot();
        tracing::info!(
            entities = current.len(),
            version = current.version().unwrap_or("-"),
            previous_version = previous.version().unwrap_or("-"),
            "lexicon reloaded"
        );
        previous
    }

    /// Load `path` and swap it in. On error the current lexicon stays in place.
    pub fn reload_from_path(&self, path: impl AsRef<Path>) -> Result<Arc<Lexicon>, ArtifactLoadError> {
        let started = Instant::now();
        let lexicon = Lexicon::from_path(path)?;
        if let Some(monitor) = &self.monitor {
            monitor.record(LEXICON_LOAD, started.elapsed());
        }
        Ok(self.reload(lexicon))
    }

    /// Rewrite `input` anonymously. No telemetry event is emitted.
    pub fn rewrite(&self, input: &str) -> RewriteOutcome {
        self.run(input, None)
    }

    /// Rewrite `input` on behalf of `caller_id`; the caller is hashed before
    /// it reaches the telemetry sink.
    pub fn rewrite_as(&self, caller_id: &str, input: &str) -> RewriteOutcome {
        self.run(input, Some(caller_id))
    }

    fn run(&self, input: &str, caller_id: Option<&str>) -> RewriteOutcome {
        let lexicon = self.lexicon.snapshot();
        let timed = self
            .guard
            .observe(QUERY_REWRITE, || rewrite(&lexicon, input, &self.options));

        if let Some(monitor) = &self.monitor {
            monitor.record(QUERY_REWRITE, timed.elapsed);
        }

        let query_id = match (caller_id, &self.telemetry) {
            (Some(caller), Some(sink)) => {
                let query_id = new_query_id();
                let event = TelemetryEvent::new(
                    query_id.clone(),
                    caller,
                    input,
                    &timed.value,
                    timed.elapsed,
                    timed.exceeded.is_some(),
                )
                .with_lexicon_version(lexicon.version());
                sink.record(&event);
                Some(query_id)
            }
            _ => None,
        };

        RewriteOutcome {
            result: timed.value,
            elapsed: timed.elapsed,
            budget_exceeded: timed.exceeded,
            lexicon_version: lexicon.version().map(str::to_string),
            query_id,
        }
    }
}
