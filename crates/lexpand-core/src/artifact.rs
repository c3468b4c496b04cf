//! Runtime artifact format — the JSON document the compiler writes and the
//! loader reads.
//!
//! ```text
//! {
//!   "version": "0.1",
//!   "domain": "data_center_infrastructure",
//!   "build_timestamp": "2025-11-21T10:00:00Z",
//!   "entity_count": 1,
//!   "entities": { "DFW10": { "category": "facility", "synonyms": ["DFW-10"] } },
//!   "context_rules": [ { "prefer": "product", "when_present": ["facility"] } ]
//! }
//! ```
//!
//! The `entities` mapping keeps every key in document order, duplicates
//! included, so the loader can reject a repeated canonical identifier instead
//! of silently keeping the last one.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Whole runtime artifact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeArtifact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_count: Option<usize>,
    pub entities: EntityMap,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context_rules: Vec<ContextRule>,
}

impl RuntimeArtifact {
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// One entity record, keyed by its canonical identifier in [`EntityMap`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntitySpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Older artifacts name the category `type` and use `category` for a
    /// subgroup. A non-blank `type` takes precedence over `category`.
    #[serde(default, rename = "type", skip_serializing)]
    pub kind: Option<String>,
    #[serde(default)]
    pub synonyms: Vec<String>,
    #[serde(default)]
    pub related_terms: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prior_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context_terms: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

/// Co-occurrence rule: favour the `prefer` reading of an ambiguous alias when
/// an entity of a `when_present` category was resolved elsewhere in the query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextRule {
    pub prefer: String,
    pub when_present: Vec<String>,
    /// Restrict the rule to these aliases. Empty means every ambiguous alias.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

/// Ordered `(canonical id, spec)` pairs, serialized as a JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityMap(pub Vec<(String, EntitySpec)>);

impl EntityMap {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, id: impl Into<String>, spec: EntitySpec) {
        self.0.push((id.into(), spec));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EntitySpec)> {
        self.0.iter().map(|(id, spec)| (id.as_str(), spec))
    }
}

impl Serialize for EntityMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (id, spec) in &self.0 {
            map.serialize_entry(id, spec)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for EntityMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntityMapVisitor;

        impl<'de> Visitor<'de> for EntityMapVisitor {
            type Value = EntityMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a mapping of canonical identifiers to entity records")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<EntityMap, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((id, spec)) = access.next_entry::<String, EntitySpec>()? {
                    entries.push((id, spec));
                }
                Ok(EntityMap(entries))
            }
        }

        deserializer.deserialize_map(EntityMapVisitor)
    }
}
