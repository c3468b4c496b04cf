#![allow(unused)]
//! Disambiguation integration harness.
//!
//! # What this covers
//!
//! Ambiguous aliases (`SF`, `capacity`) are where expansion goes wrong
//! silently: a wrong reading adds a dozen confidently-weighted terms to the
//! query. Each rule is exercised on its own and in combination with the
//! others.
//!
//! - **Co-occurrence**: a context rule fires on a category resolved elsewhere
//!   in the query, and takes precedence over context terms.
//! - **Chained co-occurrence**: a span resolved by a rule enables a rule for
//!   an earlier span.
//! - **Context terms**: the reading whose context terms appear around the span
//!   wins; a tie is not a decision.
//! - **Prior weight**: a strictly higher prior breaks the tie; equal priors do
//!   not.
//! - **Drop**: unresolvable spans are reported and contribute nothing, while
//!   the rest of the query still expands.
//! - **Alias-scoped rules**: a rule restricted to aliases leaves other
//!   aliases alone.
//!
//! # What this does NOT cover
//!
//! - Term weights and rendering (see rewrite_harness)
//!
//! # Running
//!
//! ```sh
//! cargo test --test disambiguation_harness
//! ```

mod common;
use common::*;
use lexpand_core::disambiguator::disambiguate;
use lexpand_core::matcher::find_spans;
use lexpand_core::normalizer::NormalizedQuery;
use lexpand_core::types::Resolution;
use lexpand_core::{rewrite, ContextRule, ExpansionOptions, Lexicon};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn run(lexicon: &Lexicon, input: &str) -> lexpand_core::ExpansionResult {
    rewrite(lexicon, input, &ExpansionOptions::default())
}

/// `(canonical id, resolution)` per resolved span, in input order.
fn resolutions(lexicon: &Lexicon, input: &str) -> Vec<(String, Resolution)> {
    let query = NormalizedQuery::new(input);
    let spans = find_spans(lexicon, &query);
    disambiguate(lexicon, &query, spans)
        .resolved
        .into_iter()
        .map(|r| (lexicon.entity(r.entity).id.clone(), r.resolution))
        .collect()
}

// ---------------------------------------------------------------------------
// Co-occurrence
// ---------------------------------------------------------------------------

#[rstest]
#[case("Is SF available at DFW10?")]
#[case("SF pricing for PHX10")]
#[case("dfw-10 sf")]
fn product_reading_preferred_near_facility(#[case] query: &str) {
    let lexicon = sample_lexicon();
    let result = run(&lexicon, query);
    assert!(result.matched_entities.contains(&"ServiceFabric".to_string()));
    assert!(!result.matched_entities.contains(&"SanFrancisco".to_string()));
    assert!(result.ambiguous_dropped.is_empty());
}

#[test]
fn co_occurrence_is_recorded_as_the_resolution() {
    let lexicon = sample_lexicon();
    assert_eq!(
        resolutions(&lexicon, "SF at DFW10"),
        vec![
            ("ServiceFabric".to_string(), Resolution::CoOccurrence),
            ("DFW10".to_string(), Resolution::Unambiguous),
        ]
    );
}

#[test]
fn co_occurrence_beats_context_terms() {
    // "city" favours the market reading, but the facility rule comes first.
    let lexicon = sample_lexicon();
    let result = run(&lexicon, "SF city at DFW10");
    assert_matched!(result, ["ServiceFabric", "DFW10"]);
}

#[test]
fn rules_chain_across_ambiguous_spans() {
    let lexicon = ArtifactBuilder::new()
        .entity(EntityBuilder::new("Alpha", "product").synonyms(&["x"]))
        .entity(EntityBuilder::new("AlphaMarket", "market").synonyms(&["x"]))
        .entity(EntityBuilder::new("Site", "facility").synonyms(&["y"]))
        .entity(EntityBuilder::new("SiteTeam", "team").synonyms(&["y"]))
        .entity(EntityBuilder::new("Zone", "region").synonyms(&["z"]))
        .rule("product", &["facility"])
        .rule("facility", &["region"])
        .lexicon();

    // `x` only resolves once `y` has, and `y` sits after it.
    assert_eq!(
        resolutions(&lexicon, "x y z"),
        vec![
            ("Alpha".to_string(), Resolution::CoOccurrence),
            ("Site".to_string(), Resolution::CoOccurrence),
            ("Zone".to_string(), Resolution::Unambiguous),
        ]
    );
}

#[test]
fn alias_scoped_rule_ignores_other_aliases() {
    let mut artifact = ArtifactBuilder::new()
        .entity(EntityBuilder::new("ServiceFabric", "product").synonyms(&["SF"]))
        .entity(EntityBuilder::new("SanFrancisco", "market").synonyms(&["SF"]))
        .entity(EntityBuilder::new("DFW10", "facility"))
        .build();
    artifact.context_rules.push(ContextRule {
        prefer: "product".to_string(),
        when_present: vec!["facility".to_string()],
        aliases: vec!["Equinix Fabric".to_string()],
    });
    let lexicon = Lexicon::from_artifact(artifact).unwrap();

    let result = run(&lexicon, "SF at DFW10");
    assert_matched!(result, ["DFW10"]);
    assert_eq!(result.ambiguous_dropped, vec!["sf"]);
}

// ---------------------------------------------------------------------------
// Context terms
// ---------------------------------------------------------------------------

#[rstest]
#[case("SF city metro guide", "SanFrancisco")]
#[case("SF cloud pricing", "ServiceFabric")]
#[case("rack capacity", "SpaceCapacity")]
#[case("what is the kw capacity", "PowerCapacity")]
fn context_terms_pick_the_reading(#[case] query: &str, #[case] expected: &str) {
    let lexicon = sample_lexicon();
    let resolved = resolutions(&lexicon, query);
    assert_eq!(resolved, vec![(expected.to_string(), Resolution::ContextTerms)]);
}

#[test]
fn power_capacity_at_facility() {
    let lexicon = sample_lexicon();
    let result = run(&lexicon, "Power capacity at PHX10");
    assert_matched!(result, ["PowerCapacity", "PHX10"]);
    assert_term!(result, "power draw", 0.6);
}

#[test]
fn tied_context_scores_drop_the_span() {
    // "metro" backs the market, "pricing" backs the product.
    let lexicon = sample_lexicon();
    let result = run(&lexicon, "SF metro pricing");
    assert_fallback(&result, "SF metro pricing");
    assert_eq!(result.ambiguous_dropped, vec!["sf"]);
}

// ---------------------------------------------------------------------------
// Prior weight
// ---------------------------------------------------------------------------

#[test]
fn strictly_higher_prior_wins() {
    let lexicon = ArtifactBuilder::new()
        .entity(
            EntityBuilder::new("ServiceFabric", "product")
                .synonyms(&["SF"])
                .prior(2.0),
        )
        .entity(EntityBuilder::new("SanFrancisco", "market").synonyms(&["SF"]))
        .lexicon();

    assert_eq!(
        resolutions(&lexicon, "SF"),
        vec![("ServiceFabric".to_string(), Resolution::PriorWeight)]
    );
}

#[test]
fn equal_priors_drop_the_span() {
    let lexicon = sample_lexicon();
    let result = run(&lexicon, "SF");
    assert_eq!(result.expanded_query, "sf");
    assert_eq!(result.expansion_count, 0);
    assert_eq!(result.ambiguous_dropped, vec!["sf"]);
}

// ---------------------------------------------------------------------------
// Drop
// ---------------------------------------------------------------------------

#[test]
fn dropped_span_does_not_block_the_rest() {
    let lexicon = sample_lexicon();
    let result = run(&lexicon, "SF support");
    assert_matched!(result, ["CustomerService"]);
    assert_eq!(result.ambiguous_dropped, vec!["sf"]);
    assert!(result.expanded_terms.iter().all(|t| t.term != "SF"));
    assert_well_formed(&result);
}

#[test]
fn dropped_span_reports_every_candidate() {
    let lexicon = sample_lexicon();
    let query = NormalizedQuery::new("capacity");
    let spans = find_spans(&lexicon, &query);
    let outcome = disambiguate(&lexicon, &query, spans);

    assert!(outcome.resolved.is_empty());
    assert_eq!(outcome.dropped.len(), 1);
    let mut candidates = outcome.dropped[0].candidates.clone();
    candidates.sort();
    assert_eq!(candidates, vec!["PowerCapacity", "SpaceCapacity"]);
}
