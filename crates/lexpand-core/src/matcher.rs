//! Entity matcher — finds alias mentions in a normalized query.
//!
//! Candidate n-grams are bounded by the longest alias in the index. Lengths are
//! tried longest first and, within one length, left to right; a candidate is
//! accepted only if none of its tokens is already covered. A multi-word alias
//! therefore always wins over the single-word aliases inside it.

use crate::lexicon::Lexicon;
use crate::normalizer::NormalizedQuery;
use crate::types::MatchSpan;

/// Non-overlapping alias matches in input order. Ambiguous spans keep every candidate.
pub fn find_spans(lexicon: &Lexicon, query: &NormalizedQuery) -> Vec<MatchSpan> {
    let aliases = lexicon.aliases();
    let token_count = query.token_count();
    if token_count == 0 || aliases.is_empty() {
        return Vec::new();
    }

    let longest = aliases.max_tokens().min(token_count);
    let mut covered = vec![false; token_count];
    let mut spans = Vec::new();

    for len in (1..=longest).rev() {
        for start in 0..=token_count - len {
            let tokens = start..start + len;
            if covered[tokens.clone()].iter().any(|&c| c) {
                continue;
            }
            let surface = query.slice(tokens.clone());
            let Some(candidates) = aliases.get(surface) else {
                continue;
            };
            covered[tokens.clone()].iter_mut().for_each(|c| *c = true);
            tracing::trace!(surface, candidates = candidates.len(), "alias matched");
            spans.push(MatchSpan {
                bytes: query.byte_range(tokens.clone()),
                tokens,
                surface: surface.to_string(),
                candidates: candidates.to_vec(),
            });
        }
    }

    spans.sort_by_key(|s| s.tokens.start);
    spans
}
