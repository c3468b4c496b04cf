//! Core types for lexpand-core.
//!
//! This module defines the data structures shared across the pipeline layers:
//! the immutable [`CanonicalEntity`], the per-query [`MatchSpan`] and
//! [`ResolvedEntity`], and the caller-facing [`ExpansionResult`].

use serde::Serialize;
use std::collections::BTreeMap;
use std::ops::Range;

/// Weight of a canonical term in the expanded query.
pub const CANONICAL_WEIGHT: f64 = 1.0;
/// Weight of a synonym in the expanded query.
pub const SYNONYM_WEIGHT: f64 = 0.8;
/// Weight of a related term in the expanded query.
pub const RELATED_WEIGHT: f64 = 0.6;

/// Index of an entity inside a loaded [`Lexicon`](crate::lexicon::Lexicon).
///
/// Only meaningful against the lexicon that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(pub(crate) u32);

impl EntityId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A canonical entity as held by a loaded lexicon.
///
/// Built once at load time and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalEntity {
    /// Canonical identifier, exactly as written in the artifact.
    pub id: String,
    /// Category used by co-occurrence rules (`product`, `facility`, …).
    pub category: String,
    /// Synonym surface forms, as written in the artifact.
    pub synonyms: Vec<String>,
    /// Related terms. These expand the query but are never matched.
    pub related_terms: Vec<String>,
    /// Prior used to break ties between ambiguous readings.
    pub prior_weight: f64,
    /// Normalized words hinting at this reading when found near an ambiguous alias.
    pub context_terms: Vec<String>,
    pub metadata: BTreeMap<String, serde_json::Value>,
}

/// A contiguous run of tokens in the normalized query that matched an alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSpan {
    /// Token indices covered by the match (end exclusive).
    pub tokens: Range<usize>,
    /// Byte range inside the normalized query text.
    pub bytes: Range<usize>,
    /// Normalized surface form that was looked up.
    pub surface: String,
    /// Every entity the surface form can denote, sorted and deduplicated.
    pub candidates: Vec<EntityId>,
}

impl MatchSpan {
    pub fn is_ambiguous(&self) -> bool {
        self.candidates.len() > 1
    }

    pub fn len(&self) -> usize {
        self.tokens.end - self.tokens.start
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn overlaps(&self, other: &MatchSpan) -> bool {
        self.tokens.start < other.tokens.end && other.tokens.start < self.tokens.end
    }
}

/// Which disambiguation rule settled a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// The surface form only ever denotes one entity.
    Unambiguous,
    /// A context rule fired on a category resolved elsewhere in the query.
    CoOccurrence,
    /// The winner's context terms appear around the span.
    ContextTerms,
    /// The winner has the strictly highest prior weight.
    PriorWeight,
}

/// A [`MatchSpan`] narrowed to exactly one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedEntity {
    pub span: MatchSpan,
    pub entity: EntityId,
    pub resolution: Resolution,
}

/// A span no rule could settle. It is left out of the expansion rather than guessed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AmbiguousMatchDropped {
    pub surface: String,
    /// Canonical identifiers of the competing readings.
    pub candidates: Vec<String>,
}

/// Where an expanded term came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TermSource {
    Canonical,
    Synonym,
    Related,
}

impl TermSource {
    pub fn weight(self) -> f64 {
        match self {
            TermSource::Canonical => CANONICAL_WEIGHT,
            TermSource::Synonym => SYNONYM_WEIGHT,
            TermSource::Related => RELATED_WEIGHT,
        }
    }
}

impl std::fmt::Display for TermSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TermSource::Canonical => write!(f, "canonical"),
            TermSource::Synonym => write!(f, "synonym"),
            TermSource::Related => write!(f, "related"),
        }
    }
}

/// One weighted term of an expanded query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpandedTerm {
    pub term: String,
    pub weight: f64,
    pub source: TermSource,
}

/// The per-query output of the pipeline.
///
/// Contains nothing time- or caller-dependent, so the same input against the
/// same lexicon always yields an equal value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpansionResult {
    /// Weighted OR query, or the normalized input when nothing resolved.
    pub expanded_query: String,
    /// Canonical identifiers in order of first appearance, each listed once.
    pub matched_entities: Vec<String>,
    /// Number of terms in `expanded_terms`.
    pub expansion_count: usize,
    pub expanded_terms: Vec<ExpandedTerm>,
    /// Surface forms dropped by the disambiguator.
    pub ambiguous_dropped: Vec<String>,
}

impl ExpansionResult {
    /// Pass-through result used when no entity resolved.
    pub fn zero_match(normalized_query: impl Into<String>, dropped: Vec<String>) -> Self {
        Self {
            expanded_query: normalized_query.into(),
            matched_entities: Vec::new(),
            expansion_count: 0,
            expanded_terms: Vec::new(),
            ambiguous_dropped: dropped,
        }
    }

    /// `true` when the result is the zero-match fallback.
    pub fn is_fallback(&self) -> bool {
        self.matched_entities.is_empty()
    }
}
