//! The schema catalog.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use dossier_types::{registry, TypeDescriptor, TypeRef};
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::build::ModelBuilder;
use crate::definition::{parse_definitions, Definitions};
use crate::error::{DataError, ModelError};
use crate::property::{Property, PropertyId, PropertyRef};
use crate::proxy::{EntityData, EntityProxy};
use crate::schema::{Schema, SchemaDescriptor, SchemaId};

/// Schema definitions shipped with the crate.
pub const DEFAULT_SCHEMA_YAML: &str = include_str!("../resources/schema.yaml");

/// The full schema catalog: an arena of schemas and an arena of properties.
///
/// Built once through [`Model::from_definitions`] (or one of the loaders)
/// and read-only afterwards. Entities borrow it for their whole lifetime.
#[derive(Debug)]
pub struct Model {
    schemata: Vec<Schema>,
    properties: Vec<Arc<Property>>,
    by_name: HashMap<String, SchemaId>,
    qnames: HashMap<String, PropertyId>,
}

impl Model {
    pub(crate) fn from_parts(
        schemata: Vec<Schema>,
        properties: Vec<Arc<Property>>,
        by_name: HashMap<String, SchemaId>,
    ) -> Self {
        let qnames = properties
            .iter()
            .map(|p| (p.qname().to_string(), p.id()))
            .collect();
        Self {
            schemata,
            properties,
            by_name,
            qnames,
        }
    }

    pub fn from_definitions(defs: &Definitions) -> Result<Self, ModelError> {
        ModelBuilder::register(defs)?.link()
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ModelError> {
        let defs = parse_definitions(text)?;
        Self::from_definitions(&defs)
    }

    /// The bundled default schema set.
    pub fn builtin() -> Result<Self, ModelError> {
        Self::from_yaml_str(DEFAULT_SCHEMA_YAML)
    }

    /// Load every `*.yaml` / `*.yml` file below `dir`. Files are read in path
    /// order; a schema defined twice keeps the later definition.
    pub fn from_dir(dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        let dir = dir.as_ref();
        let mut files = Vec::new();
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.with_context(|| format!("walking {}", dir.display()))?;
            let is_yaml = entry
                .path()
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e == "yaml" || e == "yml");
            if entry.file_type().is_file() && is_yaml {
                files.push(entry.into_path());
            }
        }

        let mut defs: Definitions = BTreeMap::new();
        for path in &files {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            let parsed = parse_definitions(&text)
                .with_context(|| format!("parsing {}", path.display()))?;
            for (name, def) in parsed {
                if defs.insert(name.clone(), def).is_some() {
                    tracing::warn!(schema = %name, file = %path.display(), "schema redefined");
                }
            }
        }
        tracing::debug!(files = files.len(), schemata = defs.len(), "loaded schema directory");
        Self::from_definitions(&defs).with_context(|| format!("building model from {}", dir.display()))
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.by_name.get(name).map(|id| &self.schemata[id.index()])
    }

    pub fn schema(&self, id: SchemaId) -> Option<&Schema> {
        self.schemata.get(id.index())
    }

    pub fn require(&self, name: &str) -> Result<&Schema, DataError> {
        self.get(name)
            .ok_or_else(|| DataError::UnknownSchema(name.to_string()))
    }

    pub fn property(&self, id: PropertyId) -> Option<&Property> {
        self.properties.get(id.index()).map(Arc::as_ref)
    }

    /// Look up a property by `Schema:name`.
    pub fn get_qname(&self, qname: &str) -> Option<&Property> {
        self.qnames.get(qname).and_then(|id| self.property(*id))
    }

    pub fn schemata(&self) -> impl Iterator<Item = &Schema> + '_ {
        self.schemata.iter()
    }

    pub fn properties(&self) -> impl Iterator<Item = &Property> + '_ {
        self.properties.iter().map(Arc::as_ref)
    }

    pub fn descendants<'a>(&'a self, schema: &'a Schema) -> impl Iterator<Item = &'a Schema> + 'a {
        schema
            .descendants()
            .iter()
            .filter_map(|id| self.schemata.get(id as usize))
    }

    /// Schemata holding at least one writable property of the given type.
    pub fn get_type_schemata(&self, type_: TypeRef) -> Vec<&Schema> {
        self.schemata
            .iter()
            .filter(|s| s.properties().any(|p| !p.stub() && p.type_() == type_))
            .collect()
    }

    /// Resolve a property reference against a schema.
    ///
    /// Plain names resolve through the schema's flattened table; qualified
    /// names and ids must belong to a property the schema holds.
    pub fn resolve(&self, schema: &Schema, prop: &PropertyRef) -> Result<&Property, DataError> {
        let unknown = || DataError::UnknownProperty {
            schema: schema.name().to_string(),
            property: prop.to_string(),
        };
        let found = match prop {
            PropertyRef::Name(name) => match name.split_once(':') {
                Some(_) => self.get_qname(name),
                None => schema.get_arc(name).and_then(|p| self.property(p.id())),
            },
            PropertyRef::Resolved(id) => self.property(*id),
        };
        match found {
            Some(p) if schema.has(p) => Ok(p),
            _ => Err(unknown()),
        }
    }

    // ========================================================================
    // Schema narrowing
    // ========================================================================

    /// The most specific schema both named schemata are instances of.
    pub fn common_schema(&self, left: &str, right: &str) -> Result<&Schema, DataError> {
        let l = self.require(left)?;
        let r = self.require(right)?;
        self.narrowest(l, r)
    }

    /// Like [`Model::common_schema`] for already resolved schemata.
    ///
    /// If one is-a the other the more specific one wins. Otherwise the
    /// concrete schemata in both ancestor sets are considered, and the one
    /// that no other candidate descends from is returned (deepest first, then
    /// by name). Abstract schemata cannot hold entities and are never chosen.
    pub fn narrowest<'a>(&'a self, left: &'a Schema, right: &'a Schema) -> Result<&'a Schema, DataError> {
        if left.is_a(right) {
            return Ok(left);
        }
        if right.is_a(left) {
            return Ok(right);
        }
        let shared = left.ancestors() & right.ancestors();
        let members: Vec<&Schema> = shared
            .iter()
            .filter_map(|id| self.schemata.get(id as usize))
            .filter(|s| !s.is_abstract())
            .collect();
        members
            .iter()
            .copied()
            .filter(|s| !members.iter().any(|m| m.id() != s.id() && m.is_a(s)))
            .max_by(|a, b| {
                a.ancestors()
                    .len()
                    .cmp(&b.ancestors().len())
                    .then_with(|| b.name().cmp(a.name()))
            })
            .ok_or_else(|| DataError::NoCommonSchema {
                left: left.name().to_string(),
                right: right.name().to_string(),
            })
    }

    // ========================================================================
    // Entities
    // ========================================================================

    pub fn make_entity(&self, schema: &str) -> Result<EntityProxy<'_>, DataError> {
        Ok(EntityProxy::new(self, self.require(schema)?))
    }

    /// Build a proxy from its serialized form. Unknown properties are
    /// skipped with a warning; invalid values are dropped by cleaning.
    pub fn get_proxy(&self, data: EntityData, cleaned: bool) -> Result<EntityProxy<'_>, DataError> {
        EntityProxy::from_data(self, data, cleaned)
    }

    pub fn to_descriptor(&self) -> ModelDescriptor {
        ModelDescriptor {
            schemata: self
                .schemata
                .iter()
                .map(|s| (s.name().to_string(), s.to_descriptor()))
                .collect(),
            types: registry()
                .types()
                .map(|t| (t.name().to_string(), t.to_descriptor()))
                .collect(),
        }
    }
}

/// Serializable view of the whole model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub schemata: BTreeMap<String, SchemaDescriptor>,
    pub types: BTreeMap<String, TypeDescriptor>,
}
