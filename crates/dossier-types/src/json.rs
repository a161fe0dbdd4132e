//! Opaque JSON payloads, stored in compact encoding.

use crate::{CleanContext, PropertyType, BULK_MAX_SIZE};

pub static JSON: JsonType = JsonType;

#[derive(Debug, Clone, Copy)]
pub struct JsonType;

impl PropertyType for JsonType {
    fn name(&self) -> &'static str {
        "json"
    }

    fn label(&self) -> &'static str {
        "Nested data"
    }

    fn plural(&self) -> &'static str {
        "Nested data"
    }

    fn max_length(&self) -> usize {
        usize::MAX
    }

    fn max_size(&self) -> usize {
        BULK_MAX_SIZE
    }

    fn clean_text(&self, text: &str, _ctx: &CleanContext<'_>) -> Option<String> {
        let value: serde_json::Value = serde_json::from_str(text).ok()?;
        if value.is_null() {
            return None;
        }
        serde_json::to_string(&value).ok()
    }

    fn node_id(&self, _value: &str) -> Option<String> {
        None
    }
}
