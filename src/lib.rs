//! lexpand — lexicon-based query expansion.
//!
//! The engine lives in [`lexpand_core`] and the ontology compiler in
//! [`lexpand_compiler`]; this crate adds the HTTP surface and the `lexpand`
//! binary.
//!
//! # Architecture
//!
//! ```text
//! ontology.yaml ──► compiler ──► ontology_runtime.json ──► Lexicon
//!                                                           │
//!          query ──► Matcher ──► Disambiguator ──► Expander ◄┘
//!                      └────────── LatencyGuard ─────┘
//! ```

pub mod server;
