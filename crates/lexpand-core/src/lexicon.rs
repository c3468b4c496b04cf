//! Lexicon — the loaded, immutable entity table and its alias index.
//!
//! A [`Lexicon`] is built once from a [`RuntimeArtifact`] and never mutated.
//! [`LexiconHandle`] shares it between concurrent queries and swaps in a new
//! one on reload: readers clone the inner `Arc` and keep using that version
//! for the rest of their query.

use crate::artifact::{ContextRule, RuntimeArtifact};
use crate::error::ArtifactLoadError;
use crate::normalizer::normalize;
use crate::types::{CanonicalEntity, EntityId};
use fst::{Automaton, IntoStreamer, Streamer};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{Arc, RwLock};

const DEFAULT_PRIOR_WEIGHT: f64 = 1.0;

// ---------------------------------------------------------------------------
// AliasIndex
// ---------------------------------------------------------------------------

/// Normalized surface form → candidate entities.
///
/// Keys live in an FST; each key's value indexes `candidates`, which holds the
/// sorted candidate set for that surface form.
pub struct AliasIndex {
    map: fst::Map<Vec<u8>>,
    candidates: Vec<Vec<EntityId>>,
    max_tokens: usize,
}

impl AliasIndex {
    fn build(aliases: BTreeMap<String, Vec<EntityId>>) -> Result<Self, ArtifactLoadError> {
        let max_tokens = aliases
            .keys()
            .map(|k| k.split(' ').count())
            .max()
            .unwrap_or(0);
        let mut candidates = Vec::with_capacity(aliases.len());
        let mut keys = Vec::with_capacity(aliases.len());
        for (slot, (alias, mut ids)) in aliases.into_iter().enumerate() {
            ids.sort_unstable();
            ids.dedup();
            candidates.push(ids);
            keys.push((alias, slot as u64));
        }
        // BTreeMap iteration is already in the byte order the FST requires.
        let map = fst::Map::from_iter(keys)?;
        Ok(Self {
            map,
            candidates,
            max_tokens,
        })
    }

    /// Candidates for an already-normalized surface form.
    pub fn get(&self, surface: &str) -> Option<&[EntityId]> {
        self.map
            .get(surface)
            .map(|slot| self.candidates[slot as usize].as_slice())
    }

    /// Longest alias, in tokens. Bounds n-gram generation in the matcher.
    pub fn max_tokens(&self) -> usize {
        self.max_tokens
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Up to `limit` aliases starting with the normalized `prefix`, in byte order.
    pub fn with_prefix(&self, prefix: &str, limit: usize) -> Vec<String> {
        let automaton = fst::automaton::Str::new(prefix).starts_with();
        let mut stream = self.map.search(automaton).into_stream();
        let mut out = Vec::new();
        while let Some((key, _)) = stream.next() {
            if out.len() == limit {
                break;
            }
            out.push(String::from_utf8_lossy(key).into_owned());
        }
        out
    }
}

impl std::fmt::Debug for AliasIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AliasIndex")
            .field("aliases", &self.candidates.len())
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Lexicon
// ---------------------------------------------------------------------------

/// Loaded, validated lexicon.
#[derive(Debug)]
pub struct Lexicon {
    version: Option<String>,
    domain: Option<String>,
    entities: Vec<CanonicalEntity>,
    by_id: HashMap<String, EntityId>,
    aliases: AliasIndex,
    rules: Vec<ContextRule>,
}

impl Lexicon {
    /// Read and validate an artifact file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ArtifactLoadError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ArtifactLoadError::Missing {
                    path: path.to_path_buf(),
                }
            } else {
                ArtifactLoadError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        let lexicon = Self::from_json_str(&json)?;
        tracing::info!(
            path = %path.display(),
            entities = lexicon.len(),
            aliases = lexicon.aliases.len(),
            version = lexicon.version.as_deref().unwrap_or("-"),
            "lexicon loaded"
        );
        Ok(lexicon)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ArtifactLoadError> {
        Self::from_artifact(RuntimeArtifact::from_json_str(json)?)
    }

    /// Validate an artifact and build the entity table and alias index.
    pub fn from_artifact(artifact: RuntimeArtifact) -> Result<Self, ArtifactLoadError> {
        if let Some(declared) = artifact.entity_count {
            if declared != artifact.entities.len() {
                return Err(ArtifactLoadError::CountMismatch {
                    declared,
                    actual: artifact.entities.len(),
                });
            }
        }

        let mut entities = Vec::with_capacity(artifact.entities.len());
        let mut by_id = HashMap::with_capacity(artifact.entities.len());
        let mut aliases: BTreeMap<String, Vec<EntityId>> = BTreeMap::new();

        for (id, spec) in artifact.entities.0 {
            if by_id.contains_key(&id) {
                return Err(ArtifactLoadError::DuplicateCanonical(id));
            }
            let canonical_key = normalize(&id);
            if canonical_key.is_empty() {
                return Err(ArtifactLoadError::InvalidEntity {
                    entity: id,
                    reason: "canonical identifier has no matchable characters".to_string(),
                });
            }
            let mut metadata = spec.metadata;
            let Some(category) = resolve_category(spec.category, spec.kind, &mut metadata) else {
                return Err(ArtifactLoadError::MissingField {
                    entity: id,
                    field: "category",
                });
            };
            let prior_weight = spec.prior_weight.unwrap_or(DEFAULT_PRIOR_WEIGHT);
            if !prior_weight.is_finite() || prior_weight < 0.0 {
                return Err(ArtifactLoadError::InvalidEntity {
                    entity: id,
                    reason: format!("prior_weight must be a non-negative number, got {prior_weight}"),
                });
            }

            let entity_id = EntityId(entities.len() as u32);
            aliases.entry(canonical_key).or_default().push(entity_id);
            for synonym in &spec.synonyms {
                let key = normalize(synonym);
                if key.is_empty() {
                    tracing::warn!(entity = %id, synonym = %synonym, "skipping synonym with no matchable characters");
                    continue;
                }
                aliases.entry(key).or_default().push(entity_id);
            }

            let context_terms = spec
                .context_terms
                .iter()
                .map(|t| normalize(t))
                .filter(|t| !t.is_empty())
                .collect();

            by_id.insert(id.clone(), entity_id);
            entities.push(CanonicalEntity {
                id,
                category,
                synonyms: spec.synonyms,
                related_terms: spec.related_terms,
                prior_weight,
                context_terms,
                metadata,
            });
        }

        let rules = artifact
            .context_rules
            .into_iter()
            .enumerate()
            .map(|(index, rule)| validate_rule(index, rule))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            version: artifact.version,
            domain: artifact.domain,
            entities,
            by_id,
            aliases: AliasIndex::build(aliases)?,
            rules,
        })
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn entity(&self, id: EntityId) -> &CanonicalEntity {
        &self.entities[id.index()]
    }

    pub fn entities(&self) -> &[CanonicalEntity] {
        &self.entities
    }

    pub fn find(&self, canonical: &str) -> Option<&CanonicalEntity> {
        self.by_id.get(canonical).map(|id| self.entity(*id))
    }

    pub fn aliases(&self) -> &AliasIndex {
        &self.aliases
    }

    pub fn rules(&self) -> &[ContextRule] {
        &self.rules
    }

    /// Aliases completing `prefix` (normalized first).
    pub fn suggest(&self, prefix: &str, limit: usize) -> Vec<String> {
        let prefix = normalize(prefix);
        if prefix.is_empty() {
            return Vec::new();
        }
        self.aliases.with_prefix(&prefix, limit)
    }
}

/// Pick the entity category from the `category` and `type` keys, ignoring
/// blank values.
///
/// A non-blank `type` wins: artifacts that carry it use `category` for a
/// finer grouping, which is kept as `subcategory` metadata instead.
fn resolve_category(
    category: Option<String>,
    kind: Option<String>,
    metadata: &mut BTreeMap<String, serde_json::Value>,
) -> Option<String> {
    let category = category.filter(|c| !c.trim().is_empty());
    match kind.filter(|k| !k.trim().is_empty()) {
        Some(kind) => {
            if let Some(sub) = category {
                metadata
                    .entry("subcategory".to_string())
                    .or_insert(serde_json::Value::String(sub));
            }
            Some(kind)
        }
        None => category,
    }
}

fn validate_rule(index: usize, mut rule: ContextRule) -> Result<ContextRule, ArtifactLoadError> {
    if rule.prefer.trim().is_empty() {
        return Err(ArtifactLoadError::InvalidRule {
            index,
            reason: "`prefer` category is empty".to_string(),
        });
    }
    if rule.when_present.iter().all(|c| c.trim().is_empty()) {
        return Err(ArtifactLoadError::InvalidRule {
            index,
            reason: "`when_present` lists no categories".to_string(),
        });
    }
    rule.aliases = rule.aliases.iter().map(|a| normalize(a)).collect();
    Ok(rule)
}

// ---------------------------------------------------------------------------
// LexiconHandle
// ---------------------------------------------------------------------------

/// Shared, swappable reference to the current lexicon.
///
/// Cloning the handle shares the same slot. The lock is held only for the
/// duration of an `Arc` clone or store, never while a query runs.
#[derive(Debug, Clone)]
pub struct LexiconHandle {
    current: Arc<RwLock<Arc<Lexicon>>>,
}

impl LexiconHandle {
    pub fn new(lexicon: Lexicon) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(lexicon))),
        }
    }

    /// The lexicon as of now. Later swaps do not affect the returned value.
    pub fn snapshot(&self) -> Arc<Lexicon> {
        // A poisoned lock still holds a complete Arc; the store below cannot
        // leave it half-written.
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&*guard)
    }

    /// Replace the current lexicon, returning the previous one.
    pub fn swap(&self, lexicon: Lexicon) -> Arc<Lexicon> {
        let next = Arc::new(lexicon);
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        std::mem::replace(&mut *guard, next)
    }
}
