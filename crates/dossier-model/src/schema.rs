//! Entity kinds and their flattened property tables.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use roaring::RoaringBitmap;
use serde::{Deserialize, Serialize};

use crate::error::DataError;
use crate::property::{Property, PropertyDescriptor};

/// Index of a schema in the model's schema arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemaId(pub(crate) u32);

impl SchemaId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// How an interval schema renders as a graph edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub caption: Vec<String>,
    pub directed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// A named entity kind. Built by [`crate::Model`]; immutable afterwards.
///
/// `ancestors` contains the schema itself; `descendants` does not.
#[derive(Debug, Clone)]
pub struct Schema {
    pub(crate) id: SchemaId,
    pub(crate) name: String,
    pub(crate) label: String,
    pub(crate) plural: String,
    pub(crate) description: Option<String>,
    pub(crate) is_abstract: bool,
    pub(crate) matchable: bool,
    pub(crate) generated: bool,
    pub(crate) extends: Vec<SchemaId>,
    pub(crate) extends_names: Vec<String>,
    pub(crate) featured: Vec<String>,
    pub(crate) required: Vec<String>,
    pub(crate) caption: Vec<String>,
    pub(crate) edge: Option<Edge>,
    pub(crate) temporal_start: Vec<String>,
    pub(crate) temporal_end: Vec<String>,
    pub(crate) own: BTreeMap<String, Arc<Property>>,
    pub(crate) properties: BTreeMap<String, Arc<Property>>,
    pub(crate) ancestors: RoaringBitmap,
    pub(crate) descendants: RoaringBitmap,
    pub(crate) matchable_schemata: RoaringBitmap,
    pub(crate) names: Vec<String>,
}

impl Schema {
    pub fn id(&self) -> SchemaId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn plural(&self) -> &str {
        &self.plural
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    pub fn matchable(&self) -> bool {
        self.matchable
    }

    pub fn generated(&self) -> bool {
        self.generated
    }

    /// Direct parents.
    pub fn extends(&self) -> &[SchemaId] {
        &self.extends
    }

    /// `true` if `other` is this schema or one of its ancestors.
    pub fn is_a(&self, other: &Schema) -> bool {
        self.ancestors.contains(other.id.0)
    }

    /// Name-based variant of [`Schema::is_a`].
    pub fn is_a_name(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Entities of the two schemas may be compared for deduplication.
    pub fn can_match(&self, other: &Schema) -> bool {
        self.matchable_schemata.contains(other.id.0)
    }

    /// Names of the schema and every ancestor, sorted.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn ancestors(&self) -> &RoaringBitmap {
        &self.ancestors
    }

    pub fn descendants(&self) -> &RoaringBitmap {
        &self.descendants
    }

    /// Look up a property by its local name, including inherited ones.
    pub fn get(&self, name: &str) -> Option<&Property> {
        self.properties.get(name).map(Arc::as_ref)
    }

    pub(crate) fn get_arc(&self, name: &str) -> Option<&Arc<Property>> {
        self.properties.get(name)
    }

    pub fn has(&self, property: &Property) -> bool {
        self.properties
            .get(property.name())
            .is_some_and(|p| p.id() == property.id())
    }

    /// Own and inherited properties, keyed by name.
    pub fn properties(&self) -> impl Iterator<Item = &Property> + '_ {
        self.properties.values().map(Arc::as_ref)
    }

    /// Properties declared on this schema, including reverse stubs installed
    /// on it.
    pub fn own_properties(&self) -> impl Iterator<Item = &Property> + '_ {
        self.own.values().map(Arc::as_ref)
    }

    pub fn matchable_properties(&self) -> impl Iterator<Item = &Property> + '_ {
        self.properties().filter(|p| p.matchable())
    }

    pub fn featured(&self) -> &[String] {
        &self.featured
    }

    pub fn required(&self) -> &[String] {
        &self.required
    }

    pub fn caption(&self) -> &[String] {
        &self.caption
    }

    pub fn edge(&self) -> Option<&Edge> {
        self.edge.as_ref()
    }

    /// Property names bounding the entity in time: `(start, end)`.
    pub fn temporal_extent(&self) -> (&[String], &[String]) {
        (&self.temporal_start, &self.temporal_end)
    }

    /// Check required properties and value validity for a raw property map.
    pub fn validate(&self, values: &BTreeMap<String, Vec<String>>) -> Result<(), DataError> {
        for required in &self.required {
            let present = values
                .get(required)
                .is_some_and(|vs| vs.iter().any(|v| !v.trim().is_empty()));
            if !present {
                return Err(DataError::MissingRequired {
                    schema: self.name.clone(),
                    property: required.clone(),
                });
            }
        }
        for (name, raw_values) in values {
            let prop = self.get(name).ok_or_else(|| DataError::UnknownProperty {
                schema: self.name.clone(),
                property: name.clone(),
            })?;
            if let Some(bad) = raw_values.iter().find(|v| !prop.validate(v)) {
                return Err(DataError::InvalidValue {
                    property: prop.qname().to_string(),
                    value: bad.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn to_descriptor(&self) -> SchemaDescriptor {
        SchemaDescriptor {
            label: self.label.clone(),
            plural: self.plural.clone(),
            description: self.description.clone(),
            schemata: self.names.clone(),
            extends: self.extends_names.clone(),
            is_abstract: self.is_abstract,
            matchable: self.matchable,
            generated: self.generated,
            featured: self.featured.clone(),
            required: self.required.clone(),
            caption: self.caption.clone(),
            edge: self.edge.clone(),
            temporal_extent: (!self.temporal_start.is_empty() || !self.temporal_end.is_empty())
                .then(|| (self.temporal_start.clone(), self.temporal_end.clone())),
            properties: self
                .own
                .iter()
                .map(|(name, prop)| (name.clone(), prop.to_descriptor()))
                .collect(),
        }
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Schema {}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Serializable view of a schema, listing only its own properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    pub label: String,
    pub plural: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub schemata: Vec<String>,
    pub extends: Vec<String>,
    #[serde(rename = "abstract")]
    pub is_abstract: bool,
    pub matchable: bool,
    pub generated: bool,
    pub featured: Vec<String>,
    pub required: Vec<String>,
    pub caption: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge: Option<Edge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temporal_extent: Option<(Vec<String>, Vec<String>)>,
    pub properties: BTreeMap<String, PropertyDescriptor>,
}
