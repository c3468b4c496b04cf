//! Error types for lexicon loading.
//!
//! Only artifact loading can fail. Per-query outcomes (dropped ambiguous spans,
//! zero-match fallback, slow queries) are values, see [`crate::types`] and
//! [`crate::guard`].

use std::path::PathBuf;

/// The compiled lexicon is absent or malformed. The engine refuses to serve
/// queries without a lexicon, so this is fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactLoadError {
    #[error("lexicon artifact not found at {}", path.display())]
    Missing { path: PathBuf },

    #[error("failed to read lexicon artifact {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid lexicon artifact JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate canonical entity `{0}`")]
    DuplicateCanonical(String),

    #[error("entity `{entity}` is missing required field `{field}`")]
    MissingField { entity: String, field: &'static str },

    #[error("entity `{entity}` is invalid: {reason}")]
    InvalidEntity { entity: String, reason: String },

    #[error("context rule #{index} is invalid: {reason}")]
    InvalidRule { index: usize, reason: String },

    #[error("artifact declares {declared} entities but contains {actual}")]
    CountMismatch { declared: usize, actual: usize },

    #[error("failed to build alias index: {0}")]
    Index(#[from] fst::Error),
}
