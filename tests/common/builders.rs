//! Test builders — ergonomic constructors for artifacts, lexicons and engines.
//!
//! These builders are designed for readability in test assertions, not for
//! production use. They panic on invalid input rather than returning `Result`.

use lexpand_core::{ContextRule, Engine, EntitySpec, Lexicon, RuntimeArtifact};

// ---------------------------------------------------------------------------
// EntityBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for one artifact entity.
///
/// # Example
///
/// ```rust
/// let (id, spec) = EntityBuilder::new("DFW10", "facility")
///     .synonyms(&["DFW-10"])
///     .related(&["Dallas"])
///     .meta("market", "Dallas")
///     .build();
/// ```
pub struct EntityBuilder {
    id: String,
    spec: EntitySpec,
}

impl EntityBuilder {
    pub fn new(id: impl Into<String>, category: &str) -> Self {
        Self {
            id: id.into(),
            spec: EntitySpec {
                category: Some(category.to_string()),
                ..EntitySpec::default()
            },
        }
    }

    pub fn synonyms(mut self, synonyms: &[&str]) -> Self {
        self.spec.synonyms = synonyms.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn related(mut self, related: &[&str]) -> Self {
        self.spec.related_terms = related.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn context(mut self, terms: &[&str]) -> Self {
        self.spec.context_terms = terms.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn prior(mut self, weight: f64) -> Self {
        self.spec.prior_weight = Some(weight);
        self
    }

    pub fn meta(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.spec.metadata.insert(key.to_string(), value.into());
        self
    }

    pub fn build(self) -> (String, EntitySpec) {
        (self.id, self.spec)
    }
}

// ---------------------------------------------------------------------------
// ArtifactBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for a [`RuntimeArtifact`].
#[derive(Default)]
pub struct ArtifactBuilder {
    artifact: RuntimeArtifact,
}

impl ArtifactBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(mut self, version: &str) -> Self {
        self.artifact.version = Some(version.to_string());
        self
    }

    pub fn entity(mut self, entity: EntityBuilder) -> Self {
        let (id, spec) = entity.build();
        self.artifact.entities.push(id, spec);
        self
    }

    /// `prefer` readings win when any `when_present` category is resolved nearby.
    pub fn rule(mut self, prefer: &str, when_present: &[&str]) -> Self {
        self.artifact.context_rules.push(ContextRule {
            prefer: prefer.to_string(),
            when_present: when_present.iter().map(|s| s.to_string()).collect(),
            aliases: Vec::new(),
        });
        self
    }

    pub fn build(self) -> RuntimeArtifact {
        self.artifact
    }

    pub fn lexicon(self) -> Lexicon {
        Lexicon::from_artifact(self.artifact).expect("test artifact must load")
    }

    pub fn engine(self) -> Engine {
        Engine::new(self.lexicon())
    }
}

// ---------------------------------------------------------------------------
// Convenience constructors
// ---------------------------------------------------------------------------

/// Lexicon of `version` where every entity `<prefix>N` is reachable through
/// the alias `aliasN`, for N in `0..count`.
pub fn versioned_lexicon(version: &str, prefix: &str, count: usize) -> Lexicon {
    (0..count)
        .fold(ArtifactBuilder::new().version(version), |b, i| {
            b.entity(
                EntityBuilder::new(format!("{prefix}{i}"), "test")
                    .synonyms(&[format!("alias{i}").as_str()])
                    .related(&[format!("{prefix}-related-{i}").as_str()]),
            )
        })
        .lexicon()
}
