//! Telemetry — per-query events for an external collector.
//!
//! The engine never sees raw caller identities past this module: callers are
//! reduced to a truncated SHA-256 digest before the event is built. Storing
//! events is the sink's business; [`TracingSink`] simply logs them.

use crate::types::ExpansionResult;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::time::Duration;

/// Hex characters kept from the caller digest.
const CALLER_HASH_LEN: usize = 16;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryEvent {
    pub query_id: String,
    pub user_id_hash: String,
    pub timestamp: DateTime<Utc>,
    pub original_query: String,
    pub matched_entities: Vec<String>,
    pub expansion_count: usize,
    pub query_rewrite_time_ms: f64,
    pub over_budget: bool,
    pub ambiguous_dropped: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lexicon_version: Option<String>,
}

impl TelemetryEvent {
    pub fn new(
        query_id: String,
        caller_id: &str,
        original_query: &str,
        result: &ExpansionResult,
        elapsed: Duration,
        over_budget: bool,
    ) -> Self {
        Self {
            query_id,
            user_id_hash: hash_caller(caller_id),
            timestamp: Utc::now(),
            original_query: original_query.to_string(),
            matched_entities: result.matched_entities.clone(),
            expansion_count: result.expansion_count,
            query_rewrite_time_ms: elapsed.as_secs_f64() * 1000.0,
            over_budget,
            ambiguous_dropped: result.ambiguous_dropped.len(),
            lexicon_version: None,
        }
    }

    pub fn with_lexicon_version(mut self, version: Option<&str>) -> Self {
        self.lexicon_version = version.map(str::to_string);
        self
    }
}

/// Receives one event per query that carried a caller identifier.
pub trait TelemetrySink: Send + Sync {
    fn record(&self, event: &TelemetryEvent);
}

/// Emits events as structured records under the `lexpand::telemetry` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl TelemetrySink for TracingSink {
    fn record(&self, event: &TelemetryEvent) {
        tracing::info!(
            target: "lexpand::telemetry",
            query_id = %event.query_id,
            user_id_hash = %event.user_id_hash,
            matched = ?event.matched_entities,
            expansion_count = event.expansion_count,
            rewrite_ms = event.query_rewrite_time_ms,
            over_budget = event.over_budget,
            ambiguous_dropped = event.ambiguous_dropped,
            "query rewritten"
        );
    }
}

/// First 16 hex characters of the SHA-256 digest of `caller_id`.
pub fn hash_caller(caller_id: &str) -> String {
    hex::encode(Sha256::digest(caller_id.as_bytes()))[..CALLER_HASH_LEN].to_string()
}

/// `query_<UTC yyyymmdd_hhmmss>_<8 hex>`.
pub fn new_query_id() -> String {
    let stamp = Utc::now().format("%Y%m%d_%H%M%S");
    let unique = uuid::Uuid::new_v4().simple().to_string();
    format!("query_{stamp}_{}", &unique[..8])
}
