//! Atomic, provenance-tagged facts about an entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Reserved property marking the identity statement of an entity.
pub const BASE: &str = "id";

/// One value of one property of one entity, as asserted by one dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    pub id: String,
    pub entity_id: String,
    pub canonical_id: String,
    pub prop: String,
    pub prop_type: String,
    pub schema: String,
    pub value: String,
    pub dataset: String,
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub original_value: Option<String>,
    #[serde(default)]
    pub external: bool,
    #[serde(default)]
    pub first_seen: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_seen: Option<DateTime<Utc>>,
}

impl Statement {
    /// A statement with `canonical_id == entity_id` and a derived id.
    pub fn new(
        entity_id: impl Into<String>,
        prop: impl Into<String>,
        schema: impl Into<String>,
        value: impl Into<String>,
        dataset: impl Into<String>,
    ) -> Self {
        let entity_id = entity_id.into();
        let mut stmt = Self {
            id: String::new(),
            canonical_id: entity_id.clone(),
            entity_id,
            prop: prop.into(),
            prop_type: String::new(),
            schema: schema.into(),
            value: value.into(),
            dataset: dataset.into(),
            lang: None,
            original_value: None,
            external: false,
            first_seen: None,
            last_seen: None,
        };
        stmt.id = stmt.generate_key();
        stmt
    }

    pub fn with_prop_type(mut self, prop_type: impl Into<String>) -> Self {
        self.prop_type = prop_type.into();
        self
    }

    pub fn with_canonical_id(mut self, canonical_id: impl Into<String>) -> Self {
        self.canonical_id = canonical_id.into();
        self
    }

    pub fn with_lang(mut self, lang: Option<&str>) -> Self {
        self.lang = lang.map(str::to_string);
        self
    }

    pub fn with_original_value(mut self, original_value: Option<&str>) -> Self {
        self.original_value = original_value.map(str::to_string);
        self
    }

    /// External statements are candidates not yet accepted into the entity;
    /// they hash to a different id.
    pub fn with_external(mut self, external: bool) -> Self {
        self.external = external;
        self.id = self.generate_key();
        self
    }

    pub fn seen(mut self, first: Option<DateTime<Utc>>, last: Option<DateTime<Utc>>) -> Self {
        self.first_seen = first;
        self.last_seen = last;
        self
    }

    /// SHA-256 hex over `dataset.entity_id.prop.value`, with `.ext` appended
    /// for external statements.
    pub fn make_key(dataset: &str, entity_id: &str, prop: &str, value: &str, external: bool) -> String {
        let mut key = format!("{dataset}.{entity_id}.{prop}.{value}");
        if external {
            key.push_str(".ext");
        }
        hex::encode(Sha256::digest(key.as_bytes()))
    }

    pub fn generate_key(&self) -> String {
        Self::make_key(&self.dataset, &self.entity_id, &self.prop, &self.value, self.external)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_deterministic() {
        let a = Statement::make_key("ds", "e1", "name", "ACME", false);
        assert_eq!(a, Statement::make_key("ds", "e1", "name", "ACME", false));
        assert_ne!(a, Statement::make_key("ds", "e1", "name", "ACME", true));
        assert_ne!(a, Statement::make_key("ds2", "e1", "name", "ACME", false));
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn external_flag_rehashes() {
        let stmt = Statement::new("e1", "name", "Person", "Jane", "ds");
        let external = stmt.clone().with_external(true);
        assert_ne!(stmt.id, external.id);
        assert_eq!(external.id, Statement::make_key("ds", "e1", "name", "Jane", true));
    }
}
