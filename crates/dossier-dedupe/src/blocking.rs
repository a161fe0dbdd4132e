//! Candidate generation for cross-referencing.
//!
//! Comparing every pair of entities is quadratic, so entities are first
//! bucketed by blocking keys drawn from their matchable values: name and
//! address tokens, and whole values for the other groups. Only entities
//! sharing a key are compared. Keys shared by too many entities carry no
//! signal and are skipped.

use std::collections::{BTreeMap, BTreeSet};

use dossier_model::{EntityView, Model};
use dossier_types::text::tokenize;

use crate::compare::{compare, CompareWeights};
use crate::judgement::Match;

/// Buckets larger than this are ignored when pairing.
pub const DEFAULT_MAX_BUCKET: usize = 100;

const MIN_TOKEN_LENGTH: usize = 3;

/// Inverted index from blocking key to entity positions.
#[derive(Debug, Clone)]
pub struct BlockingIndex {
    buckets: BTreeMap<String, BTreeSet<usize>>,
    max_bucket: usize,
}

impl Default for BlockingIndex {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BUCKET)
    }
}

impl BlockingIndex {
    pub fn new(max_bucket: usize) -> Self {
        Self {
            buckets: BTreeMap::new(),
            max_bucket: max_bucket.max(2),
        }
    }

    /// Index every entity by its position in `entities`.
    pub fn build<'m, E: EntityView<'m>>(entities: &[E]) -> Self {
        let mut index = Self::default();
        for (position, entity) in entities.iter().enumerate() {
            index.index(position, entity);
        }
        index
    }

    pub fn index<'m, E: EntityView<'m>>(&mut self, position: usize, entity: &E) {
        for key in blocking_keys(entity) {
            self.buckets.entry(key).or_default().insert(position);
        }
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Positions sharing `key`.
    pub fn bucket(&self, key: &str) -> Option<&BTreeSet<usize>> {
        self.buckets.get(key)
    }

    /// Candidate pairs `(left, right, weight)` with `left < right`, most
    /// promising first. Rare keys weigh more than common ones.
    pub fn pairs(&self) -> Vec<(usize, usize, f64)> {
        let mut weights: BTreeMap<(usize, usize), f64> = BTreeMap::new();
        for (key, bucket) in &self.buckets {
            if bucket.len() < 2 {
                continue;
            }
            if bucket.len() > self.max_bucket {
                tracing::debug!(key = %key, size = bucket.len(), "skipping oversized block");
                continue;
            }
            let weight = 1.0 / bucket.len() as f64;
            let members: Vec<usize> = bucket.iter().copied().collect();
            for (i, left) in members.iter().enumerate() {
                for right in &members[i + 1..] {
                    *weights.entry((*left, *right)).or_default() += weight;
                }
            }
        }
        let mut pairs: Vec<(usize, usize, f64)> = weights.into_iter().map(|((l, r), w)| (l, r, w)).collect();
        pairs.sort_by(|a, b| b.2.total_cmp(&a.2).then_with(|| (a.0, a.1).cmp(&(b.0, b.1))));
        pairs
    }
}

/// Keys an entity is bucketed under, prefixed by type group.
pub fn blocking_keys<'m, E: EntityView<'m>>(entity: &E) -> BTreeSet<String> {
    let mut keys = BTreeSet::new();
    for (group, values) in entity.get_type_inverted(true) {
        for value in values {
            match group {
                "names" | "addresses" => {
                    for token in tokenize(value, MIN_TOKEN_LENGTH) {
                        keys.insert(format!("{group}:{token}"));
                    }
                }
                _ => {
                    keys.insert(format!("{group}:{value}"));
                }
            }
        }
    }
    keys
}

/// Score blocked candidate pairs and return the `limit` best matches.
///
/// Entities without an id and pairs scoring zero are left out.
pub fn xref<'m, E: EntityView<'m>>(
    model: &Model,
    entities: &[E],
    weights: &CompareWeights,
    limit: usize,
) -> Vec<Match> {
    let index = BlockingIndex::build(entities);
    let candidates = index.pairs();
    tracing::debug!(entities = entities.len(), candidates = candidates.len(), "cross-referencing");
    let mut matches = Vec::new();
    for (l, r, _) in candidates {
        let (Some(left), Some(right)) = (entities.get(l), entities.get(r)) else {
            continue;
        };
        let (Some(left_id), Some(right_id)) = (left.id(), right.id()) else {
            continue;
        };
        if left_id == right_id {
            continue;
        }
        let score = compare(model, left, right, weights);
        if score > 0.0 {
            matches.push(Match::new(left_id, right_id, score));
        }
    }
    matches.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.key().cmp(&b.key())));
    matches.truncate(limit);
    matches
}
