//! Expander — turns resolved entities into a weighted OR query.
//!
//! Each entity contributes its canonical term (1.0), synonyms (0.8) and
//! related terms (0.6). Terms are deduplicated across entities on their
//! normalized form; a repeated term keeps its first position and the higher
//! of the competing weights.

use crate::lexicon::Lexicon;
use crate::normalizer::normalize;
use crate::types::{EntityId, ExpandedTerm, ExpansionResult, ResolvedEntity, TermSource};
use std::collections::HashMap;

/// Separator placed between terms of the expanded query.
pub const OR_CONNECTIVE: &str = " OR ";

/// Optional caps on expansion size. Both unlimited by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpansionOptions {
    /// Related terms taken from each entity.
    pub max_related_per_entity: Option<usize>,
    /// Terms kept overall, after deduplication. Zero is treated as one.
    pub max_terms: Option<usize>,
}

pub fn expand(
    lexicon: &Lexicon,
    normalized_query: &str,
    resolved: &[ResolvedEntity],
    dropped: Vec<String>,
    options: &ExpansionOptions,
) -> ExpansionResult {
    let mut matched: Vec<EntityId> = Vec::new();
    for r in resolved {
        if !matched.contains(&r.entity) {
            matched.push(r.entity);
        }
    }
    if matched.is_empty() {
        return ExpansionResult::zero_match(normalized_query, dropped);
    }

    let mut terms = TermSet::default();
    for id in &matched {
        let entity = lexicon.entity(*id);
        terms.add(&entity.id, TermSource::Canonical);
        for synonym in &entity.synonyms {
            terms.add(synonym, TermSource::Synonym);
        }
        let related = options
            .max_related_per_entity
            .unwrap_or(entity.related_terms.len());
        for term in entity.related_terms.iter().take(related) {
            terms.add(term, TermSource::Related);
        }
    }

    let mut expanded_terms = terms.into_terms();
    // A match always keeps at least its first canonical term.
    if let Some(max) = options.max_terms {
        expanded_terms.truncate(max.max(1));
    }

    ExpansionResult {
        expanded_query: render(&expanded_terms),
        matched_entities: matched
            .iter()
            .map(|id| lexicon.entity(*id).id.clone())
            .collect(),
        expansion_count: expanded_terms.len(),
        expanded_terms,
        ambiguous_dropped: dropped,
    }
}

/// `term^weight` joined by ` OR `; multi-word terms are quoted.
pub fn render(terms: &[ExpandedTerm]) -> String {
    terms
        .iter()
        .map(|t| {
            let text = t.term.replace('"', "");
            if text.contains(char::is_whitespace) {
                format!("\"{text}\"^{:.1}", t.weight)
            } else {
                format!("{text}^{:.1}", t.weight)
            }
        })
        .collect::<Vec<_>>()
        .join(OR_CONNECTIVE)
}

#[derive(Default)]
struct TermSet {
    terms: Vec<ExpandedTerm>,
    seen: HashMap<String, usize>,
}

impl TermSet {
    fn add(&mut self, term: &str, source: TermSource) {
        let key = normalize(term);
        if key.is_empty() {
            return;
        }
        let weight = source.weight();
        match self.seen.get(&key) {
            Some(&slot) => {
                let existing = &mut self.terms[slot];
                if weight > existing.weight {
                    existing.weight = weight;
                    existing.source = source;
                }
            }
            None => {
                self.seen.insert(key, self.terms.len());
                self.terms.push(ExpandedTerm {
                    term: term.trim().to_string(),
                    weight,
                    source,
                });
            }
        }
    }

    fn into_terms(self) -> Vec<ExpandedTerm> {
        self.terms
    }
}
