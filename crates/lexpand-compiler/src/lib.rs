//! lexpand-compiler — builds the runtime artifact from the human-edited ontology.
//!
//! The source document is YAML with one list per entity family:
//!
//! ```yaml
//! version: "0.1"
//! domain: data_center_infrastructure
//! products:
//!   - canonical: ServiceFabric
//!     category: interconnection
//!     synonyms: [SF, Service Fabric]
//!     related_terms: [virtual connection, cloud onramp]
//! facilities:
//!   - canonical: DFW10
//!     market: Dallas
//!     synonyms: [DFW-10]
//! context_rules:
//!   - prefer: product
//!     when_present: [facility]
//! ```
//!
//! Each family gives its items a default category (`product`, `facility`,
//! `technical`, `partner`, `region`) which an item's `type` overrides. The
//! item's own `category` is kept as `subcategory` metadata, and every other
//! non-empty field (definition, market, region, address, key_markets, …)
//! becomes metadata. The compiled artifact is loaded once before it is
//! returned, so anything this crate emits is something the engine accepts.

use chrono::{DateTime, SecondsFormat, Utc};
use lexpand_core::{ArtifactLoadError, ContextRule, EntitySpec, Lexicon, RuntimeArtifact};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

const DEFAULT_VERSION: &str = "0.1";
const DEFAULT_DOMAIN: &str = "data_center_infrastructure";

/// `(section key, default category)` in the order sections are compiled.
const SECTIONS: &[(&str, &str)] = &[
    ("products", "product"),
    ("facilities", "facility"),
    ("technical_terms", "technical"),
    ("partners", "partner"),
    ("geographic_terms", "region"),
];

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("failed to read ontology {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write artifact {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid ontology YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to serialize artifact: {0}")]
    Json(#[from] serde_json::Error),

    #[error("canonical `{canonical}` in `{section}` is already defined")]
    DuplicateCanonical { canonical: String, section: String },

    #[error("compiled artifact does not load: {0}")]
    Invalid(#[from] ArtifactLoadError),
}

// ---------------------------------------------------------------------------
// Source document
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct SourceOntology {
    #[serde(default)]
    version: Option<serde_yaml::Value>,
    #[serde(default)]
    domain: Option<String>,
    #[serde(default)]
    context_rules: Vec<ContextRule>,
    #[serde(flatten)]
    sections: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Debug, Deserialize)]
struct SourceItem {
    #[serde(default)]
    canonical: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    synonyms: Vec<String>,
    #[serde(default)]
    related_terms: Vec<String>,
    #[serde(default)]
    prior_weight: Option<f64>,
    #[serde(default)]
    context_terms: Vec<String>,
    #[serde(flatten)]
    extra: BTreeMap<String, serde_yaml::Value>,
}

// ---------------------------------------------------------------------------
// Compilation
// ---------------------------------------------------------------------------

/// What [`compile_file`] wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileSummary {
    pub version: String,
    pub domain: String,
    pub entity_count: usize,
    pub output: PathBuf,
    pub bytes: usize,
}

/// Compile YAML source text into a validated runtime artifact.
pub fn compile_str(source: &str, built_at: DateTime<Utc>) -> Result<RuntimeArtifact, CompileError> {
    let mut ontology: SourceOntology = serde_yaml::from_str(source)?;

    let mut artifact = RuntimeArtifact {
        version: Some(
            ontology
                .version
                .as_ref()
                .and_then(scalar_to_string)
                .unwrap_or_else(|| DEFAULT_VERSION.to_string()),
        ),
        domain: Some(
            ontology
                .domain
                .take()
                .unwrap_or_else(|| DEFAULT_DOMAIN.to_string()),
        ),
        build_timestamp: Some(built_at.to_rfc3339_opts(SecondsFormat::Secs, true)),
        context_rules: std::mem::take(&mut ontology.context_rules),
        ..RuntimeArtifact::default()
    };

    let mut seen = HashSet::new();
    for (section, default_category) in SECTIONS {
        let Some(value) = ontology.sections.remove(*section) else {
            continue;
        };
        let items: Vec<SourceItem> = match value {
            serde_yaml::Value::Null => Vec::new(),
            other => serde_yaml::from_value(other)?,
        };
        for item in items {
            let Some(canonical) = item.canonical.clone().filter(|c| !c.trim().is_empty()) else {
                tracing::warn!(section, "skipping item without a canonical name");
                continue;
            };
            if !seen.insert(canonical.clone()) {
                return Err(CompileError::DuplicateCanonical {
                    canonical,
                    section: section.to_string(),
                });
            }
            artifact
                .entities
                .push(canonical, entity_spec(item, default_category));
        }
    }
    for unknown in ontology.sections.keys() {
        tracing::debug!(section = %unknown, "ignoring unknown ontology section");
    }

    artifact.entity_count = Some(artifact.entities.len());
    Lexicon::from_artifact(artifact.clone())?;
    Ok(artifact)
}

/// Compile `source` and write the pretty-printed artifact to `output`,
/// creating parent directories as needed.
pub fn compile_file(source: &Path, output: &Path) -> Result<CompileSummary, CompileError> {
    tracing::info!(source = %source.display(), "compiling ontology");
    let text = std::fs::read_to_string(source).map_err(|e| CompileError::Read {
        path: source.to_path_buf(),
        source: e,
    })?;
    let artifact = compile_str(&text, Utc::now())?;
    let json = artifact.to_json_pretty()?;

    let write_err = |e| CompileError::Write {
        path: output.to_path_buf(),
        source: e,
    };
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }
    std::fs::write(output, &json).map_err(write_err)?;

    let summary = CompileSummary {
        version: artifact.version.unwrap_or_default(),
        domain: artifact.domain.unwrap_or_default(),
        entity_count: artifact.entities.len(),
        output: output.to_path_buf(),
        bytes: json.len(),
    };
    tracing::info!(
        output = %summary.output.display(),
        entities = summary.entity_count,
        bytes = summary.bytes,
        "runtime artifact written"
    );
    Ok(summary)
}

fn entity_spec(item: SourceItem, default_category: &str) -> EntitySpec {
    let mut metadata: BTreeMap<String, serde_json::Value> = item
        .extra
        .into_iter()
        .filter(|(_, v)| !is_blank(v))
        .filter_map(|(k, v)| serde_json::to_value(v).ok().map(|v| (k, v)))
        .collect();
    if let Some(sub) = item.category.filter(|c| !c.trim().is_empty()) {
        metadata.insert("subcategory".to_string(), serde_json::Value::String(sub));
    }

    EntitySpec {
        category: Some(
            item.kind
                .filter(|k| !k.trim().is_empty())
                .unwrap_or_else(|| default_category.to_string()),
        ),
        kind: None,
        synonyms: item.synonyms,
        related_terms: item.related_terms,
        prior_weight: item.prior_weight,
        context_terms: item.context_terms,
        metadata,
    }
}

fn is_blank(value: &serde_yaml::Value) -> bool {
    match value {
        serde_yaml::Value::Null => true,
        serde_yaml::Value::String(s) => s.trim().is_empty(),
        serde_yaml::Value::Sequence(s) => s.is_empty(),
        serde_yaml::Value::Mapping(m) => m.is_empty(),
        _ => false,
    }
}

fn scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
