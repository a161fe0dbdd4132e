//! Serde shapes of the schema definition documents.
//!
//! A document maps schema names to [`SchemaSpec`] records:
//!
//! ```yaml
//! Person:
//!   extends: [LegalEntity]
//!   label: Person
//!   caption: [name, lastName]
//!   properties:
//!     nationality:
//!       type: country
//!     employers:
//!       type: entity
//!       range: Employment
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// All schema definitions, keyed by schema name.
pub type Definitions = BTreeMap<String, SchemaSpec>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaSpec {
    pub label: Option<String>,
    pub plural: Option<String>,
    pub description: Option<String>,
    pub extends: Vec<String>,
    #[serde(rename = "abstract")]
    pub is_abstract: bool,
    pub matchable: bool,
    pub generated: bool,
    pub featured: Vec<String>,
    pub required: Vec<String>,
    pub caption: Vec<String>,
    pub edge: Option<EdgeSpec>,
    pub temporal_extent: Option<TemporalExtentSpec>,
    pub properties: BTreeMap<String, PropertySpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySpec {
    #[serde(rename = "type", default = "default_type")]
    pub type_name: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Overrides the type's matchable flag.
    #[serde(default)]
    pub matchable: Option<bool>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub stub: bool,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub reverse: Option<ReverseSpec>,
    /// Date format hint for parsing raw values.
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub max_length: Option<usize>,
}

fn default_type() -> String {
    "string".to_string()
}

impl Default for PropertySpec {
    fn default() -> Self {
        Self {
            type_name: default_type(),
            label: None,
            description: None,
            matchable: None,
            hidden: false,
            stub: false,
            deprecated: false,
            range: None,
            reverse: None,
            format: None,
            max_length: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReverseSpec {
    pub name: Option<String>,
    pub label: Option<String>,
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeSpec {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub caption: Vec<String>,
    #[serde(default = "default_directed")]
    pub directed: bool,
    #[serde(default)]
    pub label: Option<String>,
}

fn default_directed() -> bool {
    true
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemporalExtentSpec {
    pub start: Vec<String>,
    pub end: Vec<String>,
}

/// Parse one YAML document of schema definitions.
pub fn parse_definitions(text: &str) -> Result<Definitions, serde_yaml::Error> {
    serde_yaml::from_str(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_sparse_definitions() {
        let defs = parse_definitions(
            r#"
Thing:
  abstract: true
  properties:
    name:
      type: name
    notes: {}
"#,
        )
        .unwrap();
        let thing = &defs["Thing"];
        assert!(thing.is_abstract);
        assert_eq!(thing.properties["notes"].type_name, "string");
        assert_eq!(thing.properties["name"].type_name, "name");
    }

    #[test]
    fn edges_default_to_directed() {
        let defs = parse_definitions(
            "Ownership:\n  edge:\n    source: owner\n    target: asset\n",
        )
        .unwrap();
        assert!(defs["Ownership"].edge.as_ref().unwrap().directed);
    }
}
