//! Typed property slots on schemas.

use std::fmt;

use dossier_types::TypeRef;
use serde::{Deserialize, Serialize};

use crate::schema::SchemaId;

/// Index of a property in the model's property arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PropertyId(pub(crate) u32);

impl PropertyId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A named, typed slot on a schema. Immutable once the model is built.
#[derive(Debug, Clone)]
pub struct Property {
    pub(crate) id: PropertyId,
    pub(crate) schema: SchemaId,
    pub(crate) schema_name: String,
    pub(crate) name: String,
    pub(crate) qname: String,
    pub(crate) label: String,
    pub(crate) description: Option<String>,
    pub(crate) type_: TypeRef,
    pub(crate) matchable: bool,
    pub(crate) hidden: bool,
    pub(crate) stub: bool,
    pub(crate) deprecated: bool,
    pub(crate) range: Option<SchemaId>,
    pub(crate) range_name: Option<String>,
    pub(crate) reverse: Option<PropertyId>,
    pub(crate) format: Option<String>,
    pub(crate) max_length: usize,
}

impl Property {
    pub fn id(&self) -> PropertyId {
        self.id
    }

    /// Schema that declares this property (for stubs: the range schema of
    /// the forward property).
    pub fn schema(&self) -> SchemaId {
        self.schema
    }

    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `Schema:name`, unique across the model.
    pub fn qname(&self) -> &str {
        &self.qname
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn type_(&self) -> TypeRef {
        self.type_
    }

    pub fn matchable(&self) -> bool {
        self.matchable
    }

    pub fn hidden(&self) -> bool {
        self.hidden
    }

    /// Stubs are reverse views of an entity link; they are written through
    /// their forward property only.
    pub fn stub(&self) -> bool {
        self.stub
    }

    pub fn deprecated(&self) -> bool {
        self.deprecated
    }

    pub fn range(&self) -> Option<SchemaId> {
        self.range
    }

    pub fn range_name(&self) -> Option<&str> {
        self.range_name.as_deref()
    }

    pub fn reverse(&self) -> Option<PropertyId> {
        self.reverse
    }

    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    pub fn is_entity(&self) -> bool {
        self.type_.name() == "entity"
    }

    /// Validate one raw value against the property's type and format.
    pub fn validate(&self, raw: &str) -> bool {
        let ctx = dossier_types::CleanContext::default().format(self.format());
        self.type_.clean(raw, &ctx).is_some()
    }

    pub fn to_descriptor(&self) -> PropertyDescriptor {
        PropertyDescriptor {
            label: self.label.clone(),
            qname: self.qname.clone(),
            type_name: self.type_.name().to_string(),
            description: self.description.clone(),
            matchable: self.matchable,
            hidden: self.hidden,
            stub: self.stub,
            range: self.range_name.clone(),
            format: self.format.clone(),
            max_length: self.max_length,
        }
    }
}

impl PartialEq for Property {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Property {}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qname)
    }
}

/// Serializable view of a property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    pub label: String,
    pub qname: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub matchable: bool,
    pub hidden: bool,
    pub stub: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    pub max_length: usize,
}

/// A reference to a property, either by (qualified) name or by arena id.
///
/// Resolved once against a schema at the API boundary; see
/// [`crate::Model::resolve`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyRef {
    Name(String),
    Resolved(PropertyId),
}

impl From<&str> for PropertyRef {
    fn from(value: &str) -> Self {
        PropertyRef::Name(value.to_string())
    }
}

impl From<String> for PropertyRef {
    fn from(value: String) -> Self {
        PropertyRef::Name(value)
    }
}

impl From<&String> for PropertyRef {
    fn from(value: &String) -> Self {
        PropertyRef::Name(value.clone())
    }
}

impl From<PropertyId> for PropertyRef {
    fn from(value: PropertyId) -> Self {
        PropertyRef::Resolved(value)
    }
}

impl From<&Property> for PropertyRef {
    fn from(value: &Property) -> Self {
        PropertyRef::Resolved(value.id)
    }
}

impl fmt::Display for PropertyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyRef::Name(name) => f.write_str(name),
            PropertyRef::Resolved(id) => write!(f, "#{}", id.0),
        }
    }
}
