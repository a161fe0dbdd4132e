//! Pairwise entity scoring.
//!
//! ```text
//!   left ──┐                       ┌─ names      best variant similarity, damped
//!          ├─► matchable groups ───┼─ countries  Jaccard over country hints
//!   right ─┘   present on both     └─ others     PropertyType::compare_sets
//!                                        │
//!                     sigmoid(Σ weight·score + bias)
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use anyhow::Context;
use dossier_model::{EntityView, Model};
use dossier_types::registry;
use dossier_types::text::{fingerprint, fold, levenshtein_similarity};
use serde::{Deserialize, Serialize};

/// Damping applied per additional name pairing.
pub const NAME_PENALTY: f64 = 0.01;

/// Per-group weights of the logistic combination.
///
/// Missing fields keep their defaults, so a calibration file may name only
/// the groups it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareWeights {
    pub names: f64,
    pub countries: f64,
    pub dates: f64,
    pub identifiers: f64,
    pub addresses: f64,
    pub phones: f64,
    pub emails: f64,
    pub ibans: f64,
    pub urls: f64,
    pub checksums: f64,
    pub ips: f64,
    pub entities: f64,
    pub bias: f64,
}

impl Default for CompareWeights {
    fn default() -> Self {
        Self {
            names: 6.0,
            countries: 1.0,
            dates: 2.5,
            identifiers: 4.0,
            addresses: 2.0,
            phones: 3.0,
            emails: 3.0,
            ibans: 4.0,
            urls: 1.5,
            checksums: 4.0,
            ips: 1.0,
            entities: 1.0,
            bias: -5.0,
        }
    }
}

impl CompareWeights {
    /// Weight of a type group; `None` for groups that do not take part.
    pub fn group(&self, group: &str) -> Option<f64> {
        let weight = match group {
            "names" => self.names,
            "countries" => self.countries,
            "dates" => self.dates,
            "identifiers" => self.identifiers,
            "addresses" => self.addresses,
            "phones" => self.phones,
            "emails" => self.emails,
            "ibans" => self.ibans,
            "urls" => self.urls,
            "checksums" => self.checksums,
            "ips" => self.ips,
            "entities" => self.entities,
            _ => return None,
        };
        Some(weight)
    }

    /// Load weights from a `.json` file, or YAML for any other extension.
    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read weights from {}", path.display()))?;
        let weights = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&text)
                .with_context(|| format!("failed to parse JSON weights in {}", path.display()))?
        } else {
            serde_yaml::from_str(&text)
                .with_context(|| format!("failed to parse YAML weights in {}", path.display()))?
        };
        tracing::debug!(path = %path.display(), "loaded comparison weights");
        Ok(weights)
    }
}

/// Per-group similarity scores, keyed by type group.
///
/// Empty when the schemata have no common schema. Only groups with values on
/// both sides appear.
pub fn compare_scores<'a, 'b, L, R>(model: &Model, left: &L, right: &R) -> BTreeMap<&'static str, f64>
where
    L: EntityView<'a>,
    R: EntityView<'b>,
{
    let mut scores = BTreeMap::new();
    if model.narrowest(left.schema(), right.schema()).is_err() {
        return scores;
    }
    let left_groups = left.get_type_inverted(true);
    let right_groups = right.get_type_inverted(true);
    for (group, left_values) in &left_groups {
        let Some(right_values) = right_groups.get(group) else {
            continue;
        };
        let score = match *group {
            "names" => compare_names(left_values, right_values),
            "countries" => continue,
            _ => match registry().get_group(group) {
                Some(type_) => type_.compare_sets(left_values, right_values),
                None => continue,
            },
        };
        scores.insert(*group, score);
    }
    let left_hints = left.country_hints();
    let right_hints = right.country_hints();
    if !left_hints.is_empty() && !right_hints.is_empty() {
        scores.insert("countries", jaccard(&left_hints, &right_hints));
    }
    scores
}

/// Match probability in [0, 1]. Unrelated schemata score 0.
pub fn compare<'a, 'b, L, R>(model: &Model, left: &L, right: &R, weights: &CompareWeights) -> f64
where
    L: EntityView<'a>,
    R: EntityView<'b>,
{
    if model.narrowest(left.schema(), right.schema()).is_err() {
        return 0.0;
    }
    let scores = compare_scores(model, left, right);
    let mut total = weights.bias;
    for (group, score) in &scores {
        if let Some(weight) = weights.group(group) {
            total += weight * score;
        }
    }
    sigmoid(total)
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Best similarity across folded and fingerprinted variants of both name
/// lists, damped by how many variant pairings were tried.
pub fn compare_names(left: &[&str], right: &[&str]) -> f64 {
    let left_variants = name_variants(left);
    let right_variants = name_variants(right);
    let mut best: f64 = 0.0;
    for l in &left_variants {
        for r in &right_variants {
            best = best.max(levenshtein_similarity(l, r));
        }
    }
    let pairings = (left_variants.len() * right_variants.len()).saturating_sub(1) as f64;
    best * (-NAME_PENALTY * pairings).exp()
}

fn name_variants(names: &[&str]) -> BTreeSet<String> {
    let mut variants = BTreeSet::new();
    for name in names {
        let folded = fold(name);
        if !folded.is_empty() {
            variants.insert(folded);
        }
        if let Some(print) = fingerprint(name) {
            variants.insert(print);
        }
    }
    variants
}

fn jaccard(left: &[String], right: &[String]) -> f64 {
    let left: BTreeSet<&str> = left.iter().map(String::as_str).collect();
    let right: BTreeSet<&str> = right.iter().map(String::as_str).collect();
    let union = left.union(&right).count();
    if union == 0 {
        return 0.0;
    }
    left.intersection(&right).count() as f64 / union as f64
}
