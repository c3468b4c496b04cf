//! Domain-specific assertion macros for lexpand harnesses.
//!
//! These wrap `pretty_assertions` and add context-rich failure messages that
//! make it clear *which* expansion invariant was violated and for *which*
//! query.

use lexpand_core::ExpansionResult;

// ---------------------------------------------------------------------------
// Match assertions
// ---------------------------------------------------------------------------

/// Assert the exact ordered list of matched canonical identifiers.
///
/// ```rust
/// assert_matched!(result, ["ServiceFabric", "DFW10"]);
/// ```
#[macro_export]
macro_rules! assert_matched {
    ($result:expr, [$($id:expr),* $(,)?]) => {{
        let result: &lexpand_core::ExpansionResult = &$result;
        let expected: Vec<&str> = vec![$($id),*];
        pretty_assertions::assert_eq!(
            result.matched_entities.iter().map(String::as_str).collect::<Vec<_>>(),
            expected,
            "assert_matched! failed for expanded query {:?}",
            result.expanded_query
        );
    }};
}

/// Assert that an expanded term is present with the given weight.
///
/// ```rust
/// assert_term!(result, "SF", 0.8);
/// ```
#[macro_export]
macro_rules! assert_term {
    ($result:expr, $term:expr, $weight:expr) => {{
        let result: &lexpand_core::ExpansionResult = &$result;
        let term: &str = $term;
        let weight: f64 = $weight;
        match result.expanded_terms.iter().find(|t| t.term == term) {
            Some(t) if (t.weight - weight).abs() < 1e-9 => {}
            Some(t) => panic!(
                "assert_term! failed: {:?}\n  expected weight: {}\n  actual weight:   {}",
                term, weight, t.weight
            ),
            None => panic!(
                "assert_term! failed: {:?} not expanded.\n  terms: {:?}",
                term,
                result.expanded_terms.iter().map(|t| &t.term).collect::<Vec<_>>()
            ),
        }
    }};
}

// ---------------------------------------------------------------------------
// Result invariants
// ---------------------------------------------------------------------------

/// Assert the zero-match fallback: nothing matched, no terms, and the
/// expanded query is exactly the normalized input.
pub fn assert_fallback(result: &ExpansionResult, raw_input: &str) {
    let normalized = lexpand_core::normalizer::normalize(raw_input);
    assert!(
        result.matched_entities.is_empty(),
        "expected zero-match fallback for {raw_input:?}, matched {:?}",
        result.matched_entities
    );
    assert_eq!(result.expansion_count, 0, "fallback must not expand {raw_input:?}");
    assert_eq!(
        result.expanded_query, normalized,
        "fallback must pass the normalized query through"
    );
}

/// Invariants every result satisfies: count agrees with the term list,
/// matched identifiers are unique, and no term appears twice.
pub fn assert_well_formed(result: &ExpansionResult) {
    assert_eq!(result.expansion_count, result.expanded_terms.len());

    let mut ids = result.matched_entities.clone();
    ids.sort();
    ids.dedup();
    assert_eq!(
        ids.len(),
        result.matched_entities.len(),
        "matched_entities must be unique: {:?}",
        result.matched_entities
    );

    let mut keys: Vec<String> = result
        .expanded_terms
        .iter()
        .map(|t| lexpand_core::normalizer::normalize(&t.term))
        .collect();
    let total = keys.len();
    keys.sort();
    keys.dedup();
    assert_eq!(keys.len(), total, "expanded terms must be deduplicated");
}
