//! Static fixtures used across harnesses.
//!
//! [`sample_lexicon`] is a small data-center ontology with the ambiguities the
//! engine has to handle: `SF` (product vs. market), `capacity` (power vs.
//! space) and `Service` nested inside `Service Fabric`.

use super::builders::{ArtifactBuilder, EntityBuilder};
use lexpand_core::{Engine, Lexicon, RuntimeArtifact};

/// The sample ontology as a builder, so harnesses can extend it.
pub fn sample_builder() -> ArtifactBuilder {
    ArtifactBuilder::new()
        .version("0.1")
        .entity(
            EntityBuilder::new("ServiceFabric", "product")
                .synonyms(&["SF", "Service Fabric", "Equinix Fabric"])
                .related(&["interconnection", "virtual connection", "cloud onramp"])
                .context(&["virtual", "interconnect", "cloud", "pricing"]),
        )
        .entity(
            EntityBuilder::new("SanFrancisco", "market")
                .synonyms(&["SF", "San Francisco", "Bay Area"])
                .related(&["SV1", "SV5"])
                .context(&["metro", "city"]),
        )
        .entity(
            EntityBuilder::new("DFW10", "facility")
                .synonyms(&["DFW-10", "Dallas 10"])
                .related(&["Dallas", "Texas"])
                .meta("market", "Dallas"),
        )
        .entity(
            EntityBuilder::new("PHX10", "facility")
                .synonyms(&["PHX-10", "Phoenix 10"])
                .related(&["Phoenix"])
                .meta("market", "Phoenix"),
        )
        .entity(
            EntityBuilder::new("CustomerService", "team")
                .synonyms(&["Service", "Support"])
                .related(&["ticket"]),
        )
        .entity(
            EntityBuilder::new("Colocation", "product")
                .synonyms(&["colo", "co-location"])
                .related(&["cage", "cabinet", "rack"]),
        )
        .entity(
            EntityBuilder::new("PowerCapacity", "technical")
                .synonyms(&["capacity"])
                .related(&["kW", "power draw"])
                .context(&["power", "kw", "mw", "generator"]),
        )
        .entity(
            EntityBuilder::new("SpaceCapacity", "technical")
                .synonyms(&["capacity"])
                .related(&["square feet"])
                .context(&["rack", "cage", "cabinet", "space", "sqft"]),
        )
        .rule("product", &["facility"])
}

pub fn sample_artifact() -> RuntimeArtifact {
    sample_builder().build()
}

pub fn sample_lexicon() -> Lexicon {
    sample_builder().lexicon()
}

pub fn sample_engine() -> Engine {
    sample_builder().engine()
}

/// Queries that contain no alias of the sample ontology.
pub const UNMATCHED_QUERIES: &[&str] = &[
    "",
    "   ",
    "hello world",
    "What's the weather like?",
    "servicefabrics are plural",
    "dfw100 is not a site",
];

/// A minimal artifact document in the on-disk format.
pub const MINIMAL_ARTIFACT_JSON: &str = r#"{
  "version": "0.1",
  "domain": "data_center_infrastructure",
  "build_timestamp": "2025-11-21T10:00:00Z",
  "entity_count": 2,
  "entities": {
    "ServiceFabric": {
      "category": "product",
      "synonyms": ["SF", "Service Fabric"],
      "related_terms": ["interconnection"],
      "prior_weight": 1.0
    },
    "DFW10": {
      "category": "facility",
      "synonyms": ["DFW-10"],
      "related_terms": ["Dallas"],
      "metadata": { "market": "Dallas" }
    }
  },
  "context_rules": [
    { "prefer": "product", "when_present": ["facility"] }
  ]
}"#;

/// Write `json` to a fresh temp dir and return both (keep the dir alive).
pub fn artifact_file(json: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("ontology_runtime.json");
    std::fs::write(&path, json).expect("write artifact");
    (dir, path)
}
