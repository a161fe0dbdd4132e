//! References to other entities, by id.

use std::sync::LazyLock;

use regex::Regex;

use crate::{CleanContext, PropertyType};

pub static ENTITY: EntityType = EntityType;

static ENTITY_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9A-Za-z]([0-9A-Za-z.\-_:]*[0-9A-Za-z])?$").expect("static regex")
});

/// Whether `value` is syntactically a valid entity id.
pub fn is_entity_id(value: &str) -> bool {
    ENTITY_ID.is_match(value)
}

#[derive(Debug, Clone, Copy)]
pub struct EntityType;

impl PropertyType for EntityType {
    fn name(&self) -> &'static str {
        "entity"
    }

    fn label(&self) -> &'static str {
        "Entity"
    }

    fn plural(&self) -> &'static str {
        "Entities"
    }

    fn group(&self) -> Option<&'static str> {
        Some("entities")
    }

    fn matchable(&self) -> bool {
        true
    }

    fn pivot(&self) -> bool {
        true
    }

    fn max_length(&self) -> usize {
        128
    }

    fn clean_text(&self, text: &str, _ctx: &CleanContext<'_>) -> Option<String> {
        let id = text.trim();
        is_entity_id(id).then(|| id.to_string())
    }

    fn specificity(&self, _value: &str) -> f64 {
        1.0
    }

    fn node_id(&self, value: &str) -> Option<String> {
        Some(value.to_string())
    }
}
