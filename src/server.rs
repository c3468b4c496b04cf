//! HTTP surface for the engine.
//!
//! | Method | Path          | Body                      | Response                 |
//! |--------|---------------|---------------------------|--------------------------|
//! | GET    | `/health`     |                           | lexicon version + size   |
//! | POST   | `/v1/rewrite` | `{query, caller_id?}`     | [`RewriteOutcome`]       |
//! | POST   | `/v1/reload`  |                           | new version + size       |
//! | GET    | `/v1/stats`   |                           | monitor report           |
//!
//! Rewrites are pure CPU work measured in microseconds, so handlers call the
//! engine inline. Reload reads the artifact on the blocking pool.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use lexpand_core::{monitor::OperationStats, ArtifactLoadError, Engine, RewriteOutcome};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

pub struct AppState {
    pub engine: Engine,
    /// Artifact re-read by `/v1/reload`.
    pub lexicon_path: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct RewriteRequest {
    pub query: String,
    #[serde(default)]
    pub caller_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LexiconInfo {
    pub version: Option<String>,
    pub domain: Option<String>,
    pub entity_count: usize,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub operations: Vec<OperationStats>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("reload failed: {0}")]
    Reload(#[from] ArtifactLoadError),
    #[error("reload task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("performance tracking is disabled")]
    MonitorDisabled,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Reload(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Join(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::MonitorDisabled => StatusCode::NOT_FOUND,
        };
        tracing::warn!(%status, error = %self, "request failed");
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/rewrite", post(rewrite))
        .route("/v1/reload", post(reload))
        .route("/v1/stats", get(stats))
        .with_state(state)
}

/// Bind `addr` and serve until the process is interrupted.
pub async fn serve(state: Arc<AppState>, addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "lexpand server listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown signal received");
        })
        .await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn lexicon_info(engine: &Engine) -> LexiconInfo {
    let lexicon = engine.lexicon();
    LexiconInfo {
        version: lexicon.version().map(str::to_string),
        domain: lexicon.domain().map(str::to_string),
        entity_count: lexicon.len(),
    }
}

async fn health(State(state): State<Arc<AppState>>) -> Json<LexiconInfo> {
    Json(lexicon_info(&state.engine))
}

async fn rewrite(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RewriteRequest>,
) -> Json<RewriteOutcome> {
    let outcome = match req.caller_id.as_deref() {
        Some(caller) => state.engine.rewrite_as(caller, &req.query),
        None => state.engine.rewrite(&req.query),
    };
    Json(outcome)
}

async fn reload(State(state): State<Arc<AppState>>) -> Result<Json<LexiconInfo>, ApiError> {
    let engine = state.engine.clone();
    let path = state.lexicon_path.clone();
    tokio::task::spawn_blocking(move || engine.reload_from_path(path)).await??;
    Ok(Json(lexicon_info(&state.engine)))
}

async fn stats(State(state): State<Arc<AppState>>) -> Result<Json<StatsResponse>, ApiError> {
    let monitor = state.engine.monitor().ok_or(ApiError::MonitorDisabled)?;
    Ok(Json(StatsResponse {
        operations: monitor.report(),
    }))
}
