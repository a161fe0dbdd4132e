//! Dossier property value types
//!
//! Every property on a schema carries one of the types registered here. A
//! type knows how to:
//!
//! - **clean** a raw string into a canonical form (or reject it),
//! - **compare** two cleaned values (1.0 = identical, 0.0 = unrelated),
//! - rate how much evidentiary weight a value carries (**specificity**),
//! - derive a stable graph **node id** for values that are reified as nodes.
//!
//! ```text
//!   raw ──sanitize_text──► text ──clean_text──► canonical value
//!                                                  │
//!                      compare / specificity ◄─────┤
//!                      node_id / country_hint ◄────┘
//! ```
//!
//! Types are stateless and registered statically (no plugin discovery); look
//! them up by name through [`registry()`].

pub mod address;
pub mod checksum;
pub mod country;
pub mod date;
pub mod email;
pub mod entity;
pub mod gender;
pub mod iban;
pub mod identifier;
pub mod ip;
pub mod json;
pub mod language;
pub mod mimetype;
pub mod name;
pub mod number;
pub mod phone;
pub mod registry;
pub mod string;
pub mod text;
pub mod topic;
pub mod url;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

pub use registry::{registry, Registry};
pub use text::{dampen, fingerprint, fold, levenshtein_similarity, sanitize_text};

/// Per-entity byte ceiling for ordinary types.
pub const DEFAULT_MAX_SIZE: usize = 1024 * 1024;

/// Per-entity byte ceiling for bulk text (`text`, `html`, `json`).
pub const BULK_MAX_SIZE: usize = 30 * 1024 * 1024;

/// Default character limit for a single value.
pub const DEFAULT_MAX_LENGTH: usize = 250;

/// A statically registered type handler.
pub type TypeRef = &'static dyn PropertyType;

/// Options threaded through [`PropertyType::clean`].
///
/// `countries` carries the country hints of the entity the value is being
/// added to; phone numbers without an international prefix need them.
#[derive(Debug, Clone, Copy, Default)]
pub struct CleanContext<'a> {
    pub fuzzy: bool,
    pub format: Option<&'a str>,
    pub countries: &'a [String],
}

impl<'a> CleanContext<'a> {
    pub fn with_countries(countries: &'a [String]) -> Self {
        Self {
            countries,
            ..Self::default()
        }
    }

    pub fn fuzzy(mut self, fuzzy: bool) -> Self {
        self.fuzzy = fuzzy;
        self
    }

    pub fn format(mut self, format: Option<&'a str>) -> Self {
        self.format = format;
        self
    }
}

/// Serializable description of a type, as exposed in model descriptors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    pub label: String,
    pub plural: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    pub matchable: bool,
    pub pivot: bool,
    pub max_length: usize,
}

/// The uniform contract every value domain implements.
///
/// Only `name`, `label` and `plural` are required; everything else has a
/// sensible default (exact-match comparison, no specificity, `type:value`
/// node ids).
pub trait PropertyType: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;

    fn label(&self) -> &'static str;

    fn plural(&self) -> &'static str;

    /// Grouping used by scoring and by `get_type_inverted`.
    fn group(&self) -> Option<&'static str> {
        None
    }

    /// Whether values of this type contribute to similarity scoring.
    fn matchable(&self) -> bool {
        false
    }

    /// Whether values of this type are reified as graph nodes.
    fn pivot(&self) -> bool {
        false
    }

    fn max_length(&self) -> usize {
        DEFAULT_MAX_LENGTH
    }

    /// Cumulative byte ceiling for this type on a single entity.
    fn max_size(&self) -> usize {
        DEFAULT_MAX_SIZE
    }

    /// Type-specific normalization of already-sanitized text.
    fn clean_text(&self, text: &str, _ctx: &CleanContext<'_>) -> Option<String> {
        Some(text.to_string())
    }

    /// Normalize `raw` into canonical form, or `None` if it is not a valid
    /// value of this type. Idempotent for every `Some` result.
    fn clean(&self, raw: &str, ctx: &CleanContext<'_>) -> Option<String> {
        let text = sanitize_text(raw)?;
        self.clean_text(&text, ctx)
    }

    fn validate(&self, raw: &str) -> bool {
        self.clean(raw, &CleanContext::default()).is_some()
    }

    fn compare(&self, left: &str, right: &str) -> f64 {
        if left == right {
            1.0
        } else {
            0.0
        }
    }

    fn compare_safe(&self, left: Option<&str>, right: Option<&str>) -> f64 {
        match (left, right) {
            (Some(l), Some(r)) => self.compare(l, r),
            _ => 0.0,
        }
    }

    /// Best pairwise score between two value sets.
    fn compare_sets(&self, left: &[&str], right: &[&str]) -> f64 {
        let mut best: f64 = 0.0;
        for l in left {
            for r in right {
                best = best.max(self.compare(l, r));
            }
        }
        best
    }

    fn specificity(&self, _value: &str) -> f64 {
        0.0
    }

    fn node_id(&self, value: &str) -> Option<String> {
        Some(format!("{}:{}", self.name(), value))
    }

    fn node_id_safe(&self, value: Option<&str>) -> Option<String> {
        value.and_then(|v| self.node_id(v))
    }

    fn country_hint(&self, _value: &str) -> Option<String> {
        None
    }

    fn caption(&self, value: &str) -> String {
        value.to_string()
    }

    /// Pick one representative value: the most frequent, then the shortest,
    /// then the lexicographically first.
    fn pick(&self, values: &[&str]) -> Option<String> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for v in values {
            *counts.entry(*v).or_default() += 1;
        }
        counts
            .into_iter()
            .max_by(|(a, ca), (b, cb)| {
                ca.cmp(cb)
                    .then_with(|| b.chars().count().cmp(&a.chars().count()))
                    .then_with(|| b.cmp(a))
            })
            .map(|(v, _)| v.to_string())
    }

    fn to_descriptor(&self) -> TypeDescriptor {
        TypeDescriptor {
            label: self.label().to_string(),
            plural: self.plural().to_string(),
            group: self.group().map(str::to_string),
            matchable: self.matchable(),
            pivot: self.pivot(),
            max_length: self.max_length(),
        }
    }
}

impl PartialEq for dyn PropertyType {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl Eq for dyn PropertyType {}

impl fmt::Display for dyn PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pick_prefers_frequency_then_length() {
        let t = registry().get("string").unwrap();
        assert_eq!(t.pick(&["bb", "a", "bb"]).as_deref(), Some("bb"));
        assert_eq!(t.pick(&["bbb", "aa", "cc"]).as_deref(), Some("aa"));
        assert_eq!(t.pick(&[]), None);
    }

    #[test]
    fn types_compare_by_name() {
        let a = registry().get("name").unwrap();
        let b = registry().get("name").unwrap();
        let c = registry().get("email").unwrap();
        assert!(a == b);
        assert!(a != c);
    }
}
