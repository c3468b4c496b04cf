//! lexpand-core — lexicon-based query expansion.
//!
//! This crate exposes the pipeline layers as public modules, plus the shared
//! types used across all layers.
//!
//! # Architecture
//!
//! ```text
//! Artifact ──► Lexicon ──┐
//!                        ▼
//! query ──► Normalizer ──► Matcher ──► Disambiguator ──► Expander ──► ExpansionResult
//!             └──────────────────── LatencyGuard ────────────────────┘
//! ```
//!
//! The lexicon is loaded once and shared read-only; reloads swap the whole
//! value. Every pipeline stage is synchronous and allocation-light, so the
//! [`Engine`] can be called from any number of threads at once.

pub mod artifact;
pub mod config;
pub mod disambiguator;
pub mod engine;
pub mod error;
pub mod expander;
pub mod guard;
pub mod lexicon;
pub mod matcher;
pub mod monitor;
pub mod normalizer;
pub mod telemetry;
pub mod types;

pub use artifact::{ContextRule, EntitySpec, RuntimeArtifact};
pub use engine::{rewrite, Engine, RewriteOutcome};
pub use error::ArtifactLoadError;
pub use expander::ExpansionOptions;
pub use lexicon::{Lexicon, LexiconHandle};
pub use types::{CanonicalEntity, ExpandedTerm, ExpansionResult, TermSource};
