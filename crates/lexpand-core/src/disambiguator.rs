//! Disambiguator — settles spans whose surface form denotes several entities.
//!
//! Rules run in a fixed order and the first one producing a unique winner
//! decides:
//!
//! 1. co-occurrence: a lexicon [`ContextRule`] favours candidates of category
//!    `prefer` when an entity of a `when_present` category was resolved in
//!    another span of the same query;
//! 2. context terms: the candidate whose context terms occur most often in the
//!    tokens outside the span (score above zero);
//! 3. prior weight: the candidate with the strictly highest prior;
//! 4. otherwise the span is dropped.
//!
//! A co-occurrence-only pass runs to a fixpoint first so that contextual
//! resolutions can feed each other regardless of position; a final pass in
//! input order then applies the whole chain.

use crate::artifact::ContextRule;
use crate::lexicon::Lexicon;
use crate::normalizer::NormalizedQuery;
use crate::types::{AmbiguousMatchDropped, EntityId, MatchSpan, Resolution, ResolvedEntity};
use std::collections::HashSet;
use std::ops::Range;

/// Disambiguation output, both lists in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Disambiguation {
    pub resolved: Vec<ResolvedEntity>,
    pub dropped: Vec<AmbiguousMatchDropped>,
}

pub fn disambiguate(
    lexicon: &Lexicon,
    query: &NormalizedQuery,
    spans: Vec<MatchSpan>,
) -> Disambiguation {
    let mut decisions: Vec<Option<(EntityId, Resolution)>> = spans
        .iter()
        .map(|span| match span.candidates.as_slice() {
            [only] => Some((*only, Resolution::Unambiguous)),
            _ => None,
        })
        .collect();

    // Pass 1: co-occurrence only, until nothing changes.
    loop {
        let mut progressed = false;
        for i in 0..spans.len() {
            if decisions[i].is_some() {
                continue;
            }
            let context = categories_outside(lexicon, &decisions, i);
            if let Some(winner) = by_co_occurrence(lexicon, &spans[i], &context) {
                decisions[i] = Some((winner, Resolution::CoOccurrence));
                progressed = true;
            }
        }
        if !progressed {
            break;
        }
    }

    // Pass 2: full rule chain, input order.
    for i in 0..spans.len() {
        if decisions[i].is_some() {
            continue;
        }
        let context = categories_outside(lexicon, &decisions, i);
        decisions[i] = by_co_occurrence(lexicon, &spans[i], &context)
            .map(|w| (w, Resolution::CoOccurrence))
            .or_else(|| {
                by_context_terms(lexicon, query, &spans[i]).map(|w| (w, Resolution::ContextTerms))
            })
            .or_else(|| by_prior_weight(lexicon, &spans[i]).map(|w| (w, Resolution::PriorWeight)));
    }

    let mut out = Disambiguation::default();
    for (span, decision) in spans.into_iter().zip(decisions) {
        match decision {
            Some((entity, resolution)) => {
                tracing::debug!(
                    surface = %span.surface,
                    entity = %lexicon.entity(entity).id,
                    ?resolution,
                    "span resolved"
                );
                out.resolved.push(ResolvedEntity {
                    span,
                    entity,
                    resolution,
                });
            }
            None => {
                let candidates: Vec<String> = span
                    .candidates
                    .iter()
                    .map(|c| lexicon.entity(*c).id.clone())
                    .collect();
                tracing::debug!(surface = %span.surface, ?candidates, "ambiguous match dropped");
                out.dropped.push(AmbiguousMatchDropped {
                    surface: span.surface,
                    candidates,
                });
            }
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

fn categories_outside<'a>(
    lexicon: &'a Lexicon,
    decisions: &[Option<(EntityId, Resolution)>],
    skip: usize,
) -> HashSet<&'a str> {
    decisions
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != skip)
        .filter_map(|(_, d)| d.map(|(id, _)| lexicon.entity(id).category.as_str()))
        .collect()
}

fn rule_fires(rule: &ContextRule, surface: &str, context: &HashSet<&str>) -> bool {
    (rule.aliases.is_empty() || rule.aliases.iter().any(|a| a == surface))
        && rule.when_present.iter().any(|c| context.contains(c.as_str()))
}

fn by_co_occurrence(
    lexicon: &Lexicon,
    span: &MatchSpan,
    context: &HashSet<&str>,
) -> Option<EntityId> {
    if context.is_empty() {
        return None;
    }
    let favoured: Vec<&str> = lexicon
        .rules()
        .iter()
        .filter(|rule| rule_fires(rule, &span.surface, context))
        .map(|rule| rule.prefer.as_str())
        .collect();
    if favoured.is_empty() {
        return None;
    }
    unique(
        span.candidates
            .iter()
            .copied()
            .filter(|c| favoured.contains(&lexicon.entity(*c).category.as_str())),
    )
}

fn by_context_terms(lexicon: &Lexicon, query: &NormalizedQuery, span: &MatchSpan) -> Option<EntityId> {
    let scores: Vec<(EntityId, usize)> = span
        .candidates
        .iter()
        .map(|c| {
            let score = lexicon
                .entity(*c)
                .context_terms
                .iter()
                .map(|term| occurrences_outside(query, term, span.tokens.clone()))
                .sum();
            (*c, score)
        })
        .collect();
    let best = scores.iter().map(|(_, s)| *s).max().unwrap_or(0);
    if best == 0 {
        return None;
    }
    unique(scores.into_iter().filter(|(_, s)| *s == best).map(|(c, _)| c))
}

fn by_prior_weight(lexicon: &Lexicon, span: &MatchSpan) -> Option<EntityId> {
    let best = span
        .candidates
        .iter()
        .map(|c| lexicon.entity(*c).prior_weight)
        .fold(f64::NEG_INFINITY, f64::max);
    unique(
        span.candidates
            .iter()
            .copied()
            .filter(|c| lexicon.entity(*c).prior_weight == best),
    )
}

/// Occurrences of the (normalized, possibly multi-word) `term` that do not
/// touch the `excluded` token range.
fn occurrences_outside(query: &NormalizedQuery, term: &str, excluded: Range<usize>) -> usize {
    let width = term.split(' ').count();
    if width > query.token_count() {
        return 0;
    }
    (0..=query.token_count() - width)
        .filter(|&start| start + width <= excluded.start || start >= excluded.end)
        .filter(|&start| query.slice(start..start + width) == term)
        .count()
}

fn unique(mut candidates: impl Iterator<Item = EntityId>) -> Option<EntityId> {
    let first = candidates.next()?;
    match candidates.next() {
        None => Some(first),
        Some(_) => None,
    }
}
