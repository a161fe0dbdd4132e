//! Two-phase model construction.
//!
//! ```text
//!   phase 1  register      schemas + own properties, types resolved
//!   phase 2  link          parents ─► topo order ─► ancestor/descendant bitsets
//!                          ranges ─► reverse links (stubs on range schemas)
//!                          flatten property tables (own wins) ─► freeze
//! ```
//!
//! Reverse stubs are only ever inserted here; the finished [`Model`] is
//! read-only.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Arc;

use dossier_types::registry;
use roaring::RoaringBitmap;

use crate::definition::{Definitions, ReverseSpec};
use crate::error::ModelError;
use crate::model::Model;
use crate::property::{Property, PropertyId};
use crate::schema::{Edge, Schema, SchemaId};

/// Property names that collide with the entity envelope.
pub const RESERVED_PROPERTIES: &[&str] = &["id", "schema", "properties", "caption"];

pub(crate) struct ModelBuilder {
    schemata: Vec<Schema>,
    props: Vec<Property>,
    reverses: Vec<Option<ReverseSpec>>,
    own: Vec<BTreeMap<String, PropertyId>>,
    by_name: HashMap<String, SchemaId>,
    parent_names: Vec<Vec<String>>,
}

impl ModelBuilder {
    // ========================================================================
    // Phase 1: registration
    // ========================================================================

    pub(crate) fn register(defs: &Definitions) -> Result<Self, ModelError> {
        let mut builder = Self {
            schemata: Vec::with_capacity(defs.len()),
            props: Vec::new(),
            reverses: Vec::new(),
            own: Vec::with_capacity(defs.len()),
            by_name: HashMap::with_capacity(defs.len()),
            parent_names: Vec::with_capacity(defs.len()),
        };

        for (idx, (name, def)) in defs.iter().enumerate() {
            let id = SchemaId(idx as u32);
            let label = def.label.clone().unwrap_or_else(|| name.clone());
            builder.by_name.insert(name.clone(), id);
            builder.parent_names.push(def.extends.clone());
            builder.schemata.push(Schema {
                id,
                name: name.clone(),
                plural: def.plural.clone().unwrap_or_else(|| label.clone()),
                label,
                description: def.description.clone(),
                is_abstract: def.is_abstract,
                matchable: def.matchable,
                generated: def.generated,
                extends: Vec::new(),
                extends_names: def.extends.clone(),
                featured: def.featured.clone(),
                required: def.required.clone(),
                caption: def.caption.clone(),
                edge: def.edge.as_ref().map(|e| Edge {
                    source: e.source.clone(),
                    target: e.target.clone(),
                    caption: e.caption.clone(),
                    directed: e.directed,
                    label: e.label.clone(),
                }),
                temporal_start: def
                    .temporal_extent
                    .as_ref()
                    .map(|t| t.start.clone())
                    .unwrap_or_default(),
                temporal_end: def
                    .temporal_extent
                    .as_ref()
                    .map(|t| t.end.clone())
                    .unwrap_or_default(),
                own: BTreeMap::new(),
                properties: BTreeMap::new(),
                ancestors: RoaringBitmap::new(),
                descendants: RoaringBitmap::new(),
                matchable_schemata: RoaringBitmap::new(),
                names: Vec::new(),
            });

            let mut own = BTreeMap::new();
            for (prop_name, prop_spec) in &def.properties {
                if RESERVED_PROPERTIES.contains(&prop_name.as_str()) {
                    return Err(ModelError::ReservedProperty {
                        schema: name.clone(),
                        property: prop_name.clone(),
                    });
                }
                let qname = format!("{name}:{prop_name}");
                let type_ = registry().get(&prop_spec.type_name).ok_or_else(|| {
                    ModelError::UnknownType {
                        property: qname.clone(),
                        type_name: prop_spec.type_name.clone(),
                    }
                })?;
                let pid = PropertyId(builder.props.len() as u32);
                builder.props.push(Property {
                    id: pid,
                    schema: id,
                    schema_name: name.clone(),
                    name: prop_name.clone(),
                    qname,
                    label: prop_spec.label.clone().unwrap_or_else(|| prop_name.clone()),
                    description: prop_spec.description.clone(),
                    type_,
                    matchable: prop_spec.matchable.unwrap_or_else(|| type_.matchable()),
                    hidden: prop_spec.hidden,
                    stub: prop_spec.stub,
                    deprecated: prop_spec.deprecated,
                    range: None,
                    range_name: prop_spec.range.clone(),
                    reverse: None,
                    format: prop_spec.format.clone(),
                    max_length: prop_spec.max_length.unwrap_or_else(|| type_.max_length()),
                });
                builder.reverses.push(prop_spec.reverse.clone());
                own.insert(prop_name.clone(), pid);
            }
            builder.own.push(own);
        }

        tracing::debug!(
            schemata = builder.schemata.len(),
            properties = builder.props.len(),
            "registered schema definitions"
        );
        Ok(builder)
    }

    // ========================================================================
    // Phase 2: linking
    // ========================================================================

    pub(crate) fn link(mut self) -> Result<Model, ModelError> {
        self.resolve_parents()?;
        let order = self.topological_order()?;
        self.compute_closures(&order);
        self.resolve_ranges()?;
        self.resolve_reverses()?;
        self.inherit_metadata(&order);
        let flat = self.flatten(&order);
        self.check_references();
        Ok(self.freeze(flat))
    }

    fn resolve_parents(&mut self) -> Result<(), ModelError> {
        for (idx, parents) in self.parent_names.iter().enumerate() {
            let mut resolved = Vec::with_capacity(parents.len());
            for parent in parents {
                let pid = self
                    .by_name
                    .get(parent)
                    .ok_or_else(|| ModelError::MissingParent {
                        schema: self.schemata[idx].name.clone(),
                        parent: parent.clone(),
                    })?;
                resolved.push(*pid);
            }
            self.schemata[idx].extends = resolved;
        }
        Ok(())
    }

    /// Kahn's algorithm over parent edges; parents come before children.
    fn topological_order(&self) -> Result<Vec<SchemaId>, ModelError> {
        let n = self.schemata.len();
        let mut pending: Vec<usize> = self.schemata.iter().map(|s| s.extends.len()).collect();
        let mut children: Vec<Vec<SchemaId>> = vec![Vec::new(); n];
        for schema in &self.schemata {
            for parent in &schema.extends {
                children[parent.index()].push(schema.id);
            }
        }

        let mut queue: VecDeque<SchemaId> = self
            .schemata
            .iter()
            .filter(|s| s.extends.is_empty())
            .map(|s| s.id)
            .collect();
        let mut order = Vec::with_capacity(n);
        while let Some(id) = queue.pop_front() {
            order.push(id);
            for child in &children[id.index()] {
                pending[child.index()] -= 1;
                if pending[child.index()] == 0 {
                    queue.push_back(*child);
                }
            }
        }

        if order.len() < n {
            let stuck = pending
                .iter()
                .position(|p| *p > 0)
                .map(|idx| self.schemata[idx].name.clone())
                .unwrap_or_default();
            return Err(ModelError::Cycle { schema: stuck });
        }
        Ok(order)
    }

    fn compute_closures(&mut self, order: &[SchemaId]) {
        for id in order {
            let mut ancestors = RoaringBitmap::new();
            ancestors.insert(id.0);
            for parent in self.schemata[id.index()].extends.clone() {
                ancestors |= &self.schemata[parent.index()].ancestors;
            }
            self.schemata[id.index()].ancestors = ancestors;
        }

        for idx in 0..self.schemata.len() {
            let ancestors: Vec<u32> = self.schemata[idx].ancestors.iter().collect();
            for ancestor in ancestors {
                if ancestor as usize != idx {
                    self.schemata[ancestor as usize].descendants.insert(idx as u32);
                }
            }
        }

        for idx in 0..self.schemata.len() {
            let mut names: Vec<String> = self.schemata[idx]
                .ancestors
                .iter()
                .map(|a| self.schemata[a as usize].name.clone())
                .collect();
            names.sort();
            self.schemata[idx].names = names;

            if self.schemata[idx].matchable {
                let related = &self.schemata[idx].ancestors | &self.schemata[idx].descendants;
                let matchable: RoaringBitmap = related
                    .iter()
                    .filter(|r| self.schemata[*r as usize].matchable)
                    .collect();
                self.schemata[idx].matchable_schemata = matchable;
            }
        }
    }

    fn resolve_ranges(&mut self) -> Result<(), ModelError> {
        for prop in &mut self.props {
            if let Some(range) = &prop.range_name {
                let id = self
                    .by_name
                    .get(range)
                    .ok_or_else(|| ModelError::MissingRange {
                        property: prop.qname.clone(),
                        range: range.clone(),
                    })?;
                prop.range = Some(*id);
            }
        }
        Ok(())
    }

    fn resolve_reverses(&mut self) -> Result<(), ModelError> {
        let declared = self.props.len();
        for idx in 0..declared {
            let Some(spec) = self.reverses[idx].clone() else {
                continue;
            };
            let forward = &self.props[idx];
            let qname = forward.qname.clone();
            let name = spec
                .name
                .clone()
                .filter(|n| !n.trim().is_empty())
                .ok_or_else(|| ModelError::UnnamedReverse {
                    property: qname.clone(),
                })?;
            let range = forward
                .range
                .ok_or_else(|| ModelError::MissingReverseRange {
                    property: qname.clone(),
                })?;
            if RESERVED_PROPERTIES.contains(&name.as_str()) {
                return Err(ModelError::ReservedProperty {
                    schema: self.schemata[range.index()].name.clone(),
                    property: name,
                });
            }

            let reverse_id = match self.find_inherited(range, &name) {
                Some(existing) => {
                    let target = &mut self.props[existing.index()];
                    if !target.is_entity() {
                        return Err(ModelError::ReverseConflict {
                            property: qname,
                            reverse: target.qname.clone(),
                        });
                    }
                    if target.reverse.is_none() {
                        target.reverse = Some(PropertyId(idx as u32));
                    }
                    existing
                }
                None => self.install_stub(idx, range, &name, &spec),
            };
            self.props[idx].reverse = Some(reverse_id);
        }
        Ok(())
    }

    /// Own property of `schema` or of any of its ancestors; the schema's own
    /// table is consulted first.
    fn find_inherited(&self, schema: SchemaId, name: &str) -> Option<PropertyId> {
        if let Some(pid) = self.own[schema.index()].get(name) {
            return Some(*pid);
        }
        self.schemata[schema.index()]
            .ancestors
            .iter()
            .find_map(|a| self.own[a as usize].get(name).copied())
    }

    fn install_stub(
        &mut self,
        forward: usize,
        range: SchemaId,
        name: &str,
        spec: &ReverseSpec,
    ) -> PropertyId {
        let owner = self.props[forward].schema;
        let range_schema = self.schemata[range.index()].name.clone();
        let entity = registry()
            .get("entity")
            .unwrap_or(self.props[forward].type_);
        let pid = PropertyId(self.props.len() as u32);
        self.props.push(Property {
            id: pid,
            schema: range,
            schema_name: range_schema.clone(),
            name: name.to_string(),
            qname: format!("{range_schema}:{name}"),
            label: spec.label.clone().unwrap_or_else(|| name.to_string()),
            description: None,
            type_: entity,
            matchable: false,
            hidden: spec.hidden,
            stub: true,
            deprecated: false,
            range: Some(owner),
            range_name: Some(self.schemata[owner.index()].name.clone()),
            reverse: Some(PropertyId(forward as u32)),
            format: None,
            max_length: entity.max_length(),
        });
        self.reverses.push(None);
        self.own[range.index()].insert(name.to_string(), pid);
        tracing::debug!(stub = %format!("{range_schema}:{name}"), "installed reverse stub");
        pid
    }

    /// Caption and temporal extent fall back to the first parent that has
    /// one; featured and required accumulate across parents.
    fn inherit_metadata(&mut self, order: &[SchemaId]) {
        for id in order {
            let parents = self.schemata[id.index()].extends.clone();
            for parent in parents {
                let (caption, start, end, featured, required) = {
                    let p = &self.schemata[parent.index()];
                    (
                        p.caption.clone(),
                        p.temporal_start.clone(),
                        p.temporal_end.clone(),
                        p.featured.clone(),
                        p.required.clone(),
                    )
                };
                let schema = &mut self.schemata[id.index()];
                if schema.caption.is_empty() {
                    schema.caption = caption;
                }
                if schema.temporal_start.is_empty() && schema.temporal_end.is_empty() {
                    schema.temporal_start = start;
                    schema.temporal_end = end;
                }
                for name in featured {
                    if !schema.featured.contains(&name) {
                        schema.featured.push(name);
                    }
                }
                for name in required {
                    if !schema.required.contains(&name) {
                        schema.required.push(name);
                    }
                }
            }
        }
    }

    fn flatten(&self, order: &[SchemaId]) -> Vec<BTreeMap<String, PropertyId>> {
        let mut flat: Vec<BTreeMap<String, PropertyId>> = vec![BTreeMap::new(); self.schemata.len()];
        for id in order {
            let mut table = BTreeMap::new();
            for parent in &self.schemata[id.index()].extends {
                for (name, pid) in &flat[parent.index()] {
                    table.entry(name.clone()).or_insert(*pid);
                }
            }
            for (name, pid) in &self.own[id.index()] {
                table.insert(name.clone(), *pid);
            }
            flat[id.index()] = table;
        }
        flat
    }

    fn check_references(&self) {
        for (idx, schema) in self.schemata.iter().enumerate() {
            let known = |name: &String| {
                self.own[idx].contains_key(name)
                    || schema
                        .ancestors
                        .iter()
                        .any(|a| self.own[a as usize].contains_key(name))
            };
            let edge_names = schema
                .edge
                .iter()
                .flat_map(|e| [&e.source, &e.target].into_iter().chain(e.caption.iter()));
            for name in schema
                .featured
                .iter()
                .chain(&schema.required)
                .chain(&schema.caption)
                .chain(&schema.temporal_start)
                .chain(&schema.temporal_end)
                .chain(edge_names)
            {
                if !known(name) {
                    tracing::warn!(schema = %schema.name, property = %name, "schema refers to undefined property");
                }
            }
        }
    }

    fn freeze(mut self, flat: Vec<BTreeMap<String, PropertyId>>) -> Model {
        let props: Vec<Arc<Property>> = self.props.into_iter().map(Arc::new).collect();
        for (idx, schema) in self.schemata.iter_mut().enumerate() {
            schema.own = self.own[idx]
                .iter()
                .map(|(name, pid)| (name.clone(), Arc::clone(&props[pid.index()])))
                .collect();
            schema.properties = flat[idx]
                .iter()
                .map(|(name, pid)| (name.clone(), Arc::clone(&props[pid.index()])))
                .collect();
        }
        tracing::debug!(
            schemata = self.schemata.len(),
            properties = props.len(),
            "model frozen"
        );
        Model::from_parts(self.schemata, props, self.by_name)
    }
}
