//! Entities assembled from statements.
//!
//! A [`StatementEntity`] stores nothing but statements, keyed by property
//! and statement id. Every property view (values, captions, country hints)
//! is derived from them on read.
//!
//! ```text
//!   Statement ──add_statement──► narrow schema ──► prop == "id"? ──yes──► last_change
//!                                                      │
//!                                                      no
//!                                                      ▼
//!                                  statements[prop][stmt.id] (dedupe, widen seen)
//! ```

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use dossier_model::{
    AddOptions, DataError, EntityData, EntityProxy, EntityView, Model, Property, PropertyRef, Schema,
};
use dossier_types::text::truncate_chars;
use dossier_types::CleanContext;
use sha2::{Digest, Sha256};

use crate::statement::{Statement, BASE};

/// Dataset recorded on statements when the caller names none.
pub const DEFAULT_DATASET: &str = "default";

/// How [`StatementEntity::add_value`] treats an incoming value.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueOptions<'a> {
    pub cleaned: bool,
    pub fuzzy: bool,
    pub format: Option<&'a str>,
    pub lang: Option<&'a str>,
    /// Source text before cleaning. Recorded automatically when cleaning
    /// changed the value.
    pub original_value: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct StatementEntity<'m> {
    model: &'m Model,
    schema: &'m Schema,
    id: Option<String>,
    dataset: String,
    statements: BTreeMap<String, BTreeMap<String, Statement>>,
    base_referents: BTreeSet<String>,
    last_change: Option<DateTime<Utc>>,
}

impl<'m> StatementEntity<'m> {
    pub fn new(model: &'m Model, schema: &'m Schema, dataset: impl Into<String>) -> Self {
        Self {
            model,
            schema,
            id: None,
            dataset: dataset.into(),
            statements: BTreeMap::new(),
            base_referents: BTreeSet::new(),
            last_change: None,
        }
    }

    /// Assemble an entity from statements. The first statement fixes the
    /// starting schema and id; later ones narrow it.
    pub fn from_statements<I>(model: &'m Model, dataset: impl Into<String>, statements: I) -> Result<Self, DataError>
    where
        I: IntoIterator<Item = Statement>,
    {
        let mut iter = statements.into_iter().peekable();
        let first = iter.peek().ok_or(DataError::MissingId)?;
        let schema = model.require(&first.schema)?;
        let mut entity = Self::new(model, schema, dataset);
        for stmt in iter {
            entity.add_statement(stmt)?;
        }
        Ok(entity)
    }

    pub fn model(&self) -> &'m Model {
        self.model
    }

    pub fn schema(&self) -> &'m Schema {
        self.schema
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set_id(&mut self, id: Option<String>) {
        self.id = id.filter(|id| !id.is_empty());
    }

    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    fn resolve(&self, prop: impl Into<PropertyRef>) -> Result<&'m Property, DataError> {
        self.model.resolve(self.schema, &prop.into())
    }

    fn require_id(&self) -> Result<String, DataError> {
        self.id.clone().ok_or(DataError::MissingId)
    }

    // ========================================================================
    // Statements in
    // ========================================================================

    /// Add a statement, narrowing the schema if the statement's schema
    /// differs. Fails only when the two schemata have nothing in common.
    pub fn add_statement(&mut self, stmt: Statement) -> Result<(), DataError> {
        let schema = self.model.require(&stmt.schema)?;
        if schema.id() != self.schema.id() {
            self.schema = self
                .model
                .narrowest(self.schema, schema)
                .map_err(|_| DataError::NoCommonSchema {
                    left: describe(self.schema, self.id()),
                    right: describe(schema, Some(&stmt.entity_id)),
                })?;
        }
        if self.id.is_none() && !stmt.canonical_id.is_empty() {
            self.id = Some(stmt.canonical_id.clone());
        }
        if stmt.prop == BASE {
            if self.id.as_deref() != Some(stmt.entity_id.as_str()) {
                self.base_referents.insert(stmt.entity_id);
            }
            if stmt.first_seen.is_some() {
                self.last_change = self.last_change.max(stmt.first_seen);
            }
            return Ok(());
        }
        if schema.get(&stmt.prop).is_none() {
            tracing::warn!(
                statement = %stmt.id,
                schema = %stmt.schema,
                prop = %stmt.prop,
                "skipped statement for unknown property"
            );
            return Ok(());
        }
        self.insert(stmt);
        Ok(())
    }

    fn insert(&mut self, stmt: Statement) {
        let slot = self.statements.entry(stmt.prop.clone()).or_default();
        match slot.entry(stmt.id.clone()) {
            Entry::Vacant(entry) => {
                entry.insert(stmt);
            }
            Entry::Occupied(mut entry) => {
                let held = entry.get_mut();
                held.first_seen = earliest(held.first_seen, stmt.first_seen);
                held.last_seen = held.last_seen.max(stmt.last_seen);
            }
        }
    }

    /// Clean and add values under the default dataset.
    pub fn add<I, S>(&mut self, prop: impl Into<PropertyRef>, values: I) -> Result<(), DataError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let prop = self.resolve(prop)?;
        for value in values {
            self.add_resolved(prop, value.as_ref(), ValueOptions::default())?;
        }
        Ok(())
    }

    /// Clean and add a single value with language and provenance details.
    pub fn add_value(
        &mut self,
        prop: impl Into<PropertyRef>,
        raw: &str,
        opts: ValueOptions<'_>,
    ) -> Result<(), DataError> {
        let prop = self.resolve(prop)?;
        self.add_resolved(prop, raw, opts)
    }

    fn add_resolved(&mut self, prop: &'m Property, raw: &str, opts: ValueOptions<'_>) -> Result<(), DataError> {
        if prop.stub() {
            return Err(DataError::StubProperty(prop.qname().to_string()));
        }
        let id = self.require_id()?;
        let value = if opts.cleaned {
            if raw.trim().is_empty() {
                return Ok(());
            }
            raw.to_string()
        } else {
            let hints = self.country_hints();
            let ctx = CleanContext::with_countries(&hints)
                .fuzzy(opts.fuzzy)
                .format(opts.format.or(prop.format()));
            match prop.type_().clean(raw, &ctx) {
                Some(value) => value,
                None => return Ok(()),
            }
        };
        let value = truncate_chars(&value, prop.max_length());
        if prop.is_entity() && value == id {
            return Err(DataError::SelfReference {
                property: prop.qname().to_string(),
                id: value,
            });
        }
        let original = opts.original_value.or((value != raw).then_some(raw));
        self.unsafe_add(prop, &value, opts.lang, original)
    }

    /// Record an already-clean value under the default dataset. No type
    /// cleaning or stub checks are applied.
    pub fn unsafe_add(
        &mut self,
        prop: &'m Property,
        value: &str,
        lang: Option<&str>,
        original_value: Option<&str>,
    ) -> Result<(), DataError> {
        let id = self.require_id()?;
        let stmt = Statement::new(id, prop.name(), self.schema.name(), value, self.dataset.clone())
            .with_prop_type(prop.type_().name())
            .with_lang(lang)
            .with_original_value(original_value);
        self.insert(stmt);
        Ok(())
    }

    /// Record a value as asserted by another dataset, without cleaning.
    pub fn claim(
        &mut self,
        prop: impl Into<PropertyRef>,
        value: &str,
        dataset: &str,
        external: bool,
    ) -> Result<(), DataError> {
        let prop = self.resolve(prop)?;
        let id = self.require_id()?;
        let stmt = Statement::new(id, prop.name(), self.schema.name(), value, dataset)
            .with_prop_type(prop.type_().name())
            .with_external(external);
        self.insert(stmt);
        Ok(())
    }

    // ========================================================================
    // Property access
    // ========================================================================

    pub fn get(&self, prop: impl Into<PropertyRef>) -> Result<Vec<&str>, DataError> {
        let prop = self.resolve(prop)?;
        Ok(self.values(prop.name()))
    }

    pub fn get_statements(&self, prop: impl Into<PropertyRef>) -> Result<Vec<&Statement>, DataError> {
        let prop = self.resolve(prop)?;
        Ok(self
            .statements
            .get(prop.name())
            .map(|stmts| stmts.values().collect())
            .unwrap_or_default())
    }

    /// Replace the values of a property with freshly cleaned ones.
    pub fn set<I, S>(&mut self, prop: impl Into<PropertyRef>, values: I) -> Result<(), DataError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let prop = self.resolve(prop)?;
        self.pop(prop)?;
        self.add(prop, values)
    }

    /// Drop every statement of a property and return the distinct values.
    pub fn pop(&mut self, prop: impl Into<PropertyRef>) -> Result<Vec<String>, DataError> {
        let prop = self.resolve(prop)?;
        let stmts = self.statements.remove(prop.name()).unwrap_or_default();
        let values: BTreeSet<String> = stmts.into_values().map(|s| s.value).collect();
        Ok(values.into_iter().collect())
    }

    /// Drop the statements asserting one value.
    pub fn remove(&mut self, prop: impl Into<PropertyRef>, value: &str) -> Result<(), DataError> {
        let prop = self.resolve(prop)?;
        if let Some(stmts) = self.statements.get_mut(prop.name()) {
            stmts.retain(|_, stmt| stmt.value != value);
            if stmts.is_empty() {
                self.statements.remove(prop.name());
            }
        }
        Ok(())
    }

    pub fn iterprops(&self) -> Vec<&'m Property> {
        self.populated_properties()
    }

    /// Number of stored statements, not counting the synthesized checksum.
    pub fn len(&self) -> usize {
        self.statements.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ========================================================================
    // Statements out
    // ========================================================================

    fn stored(&self) -> impl Iterator<Item = &Statement> + '_ {
        self.statements.values().flat_map(BTreeMap::values)
    }

    /// Every stored statement, followed by a checksum base statement when the
    /// entity has an id. The checksum is recomputed on each call.
    pub fn statements(&self) -> Vec<Statement> {
        let mut out: Vec<Statement> = self.stored().cloned().collect();
        if let Some(id) = &self.id {
            let base = Statement::new(id.clone(), BASE, self.schema.name(), self.checksum(), self.dataset.clone())
                .with_prop_type(BASE)
                .seen(self.last_change, self.last_change);
            out.push(base);
        }
        out
    }

    /// Digest over the schema name and the sorted ids of stored statements.
    pub fn checksum(&self) -> String {
        let mut ids: Vec<&str> = self.stored().map(|s| s.id.as_str()).collect();
        ids.sort_unstable();
        let mut hasher = Sha256::new();
        hasher.update(self.schema.name().as_bytes());
        for id in ids {
            hasher.update(id.as_bytes());
        }
        hex::encode(hasher.finalize())
    }

    /// Datasets that contributed statements; the default dataset if none did.
    pub fn datasets(&self) -> BTreeSet<&str> {
        let mut datasets: BTreeSet<&str> = self.stored().map(|s| s.dataset.as_str()).collect();
        if datasets.is_empty() {
            datasets.insert(self.dataset.as_str());
        }
        datasets
    }

    /// Source entity ids other than the canonical id.
    pub fn referents(&self) -> BTreeSet<&str> {
        let own = self.id.as_deref();
        self.stored()
            .map(|s| s.entity_id.as_str())
            .chain(self.base_referents.iter().map(String::as_str))
            .filter(|id| Some(*id) != own)
            .collect()
    }

    pub fn first_seen(&self) -> Option<DateTime<Utc>> {
        self.stored().filter_map(|s| s.first_seen).min()
    }

    pub fn last_seen(&self) -> Option<DateTime<Utc>> {
        self.stored().filter_map(|s| s.last_seen).max()
    }

    /// Latest `first_seen` over contributed base statements.
    pub fn last_change(&self) -> Option<DateTime<Utc>> {
        self.last_change
    }

    // ========================================================================
    // Conversion and merging
    // ========================================================================

    /// Flatten into a proxy. Provenance summaries travel as extra keys.
    pub fn to_proxy(&self) -> EntityProxy<'m> {
        let mut proxy = EntityProxy::new(self.model, self.schema);
        proxy.set_id(self.id.clone());
        for prop in self.populated_properties() {
            for value in self.values(prop.name()) {
                proxy.unsafe_add(prop, value, AddOptions::cleaned());
            }
        }
        proxy.set_extra("datasets", serde_json::json!(self.datasets()));
        proxy.set_extra("referents", serde_json::json!(self.referents()));
        for (key, ts) in [
            ("first_seen", self.first_seen()),
            ("last_seen", self.last_seen()),
            ("last_change", self.last_change),
        ] {
            if let Some(ts) = ts {
                proxy.set_extra(key, serde_json::Value::String(ts.to_rfc3339()));
            }
        }
        proxy
    }

    /// Turn every value of a proxy into a statement of `dataset`.
    pub fn from_proxy(proxy: &EntityProxy<'m>, dataset: impl Into<String>) -> Result<Self, DataError> {
        let id = proxy.id().ok_or(DataError::MissingId)?;
        let mut entity = Self::new(proxy.model(), proxy.schema(), dataset);
        entity.id = Some(id.to_string());
        for (prop, value) in proxy.itervalues() {
            entity.unsafe_add(prop, value, None, None)?;
        }
        Ok(entity)
    }

    /// Absorb the statements of `other`, re-pointing them at this entity's
    /// canonical id.
    pub fn merge(&mut self, other: &StatementEntity<'m>) -> Result<(), DataError> {
        self.schema = self
            .model
            .narrowest(self.schema, other.schema)
            .map_err(|_| DataError::NoCommonSchema {
                left: describe(self.schema, self.id()),
                right: describe(other.schema, other.id()),
            })?;
        if self.id.is_none() && other.id.is_some() {
            self.id = other.id.clone();
            let held: Vec<String> = self.statements.keys().cloned().collect();
            for prop in held {
                if let Some(slot) = self.statements.get_mut(&prop) {
                    let schema = self.schema;
                    let id = self.id.as_deref();
                    slot.retain(|_, stmt| !is_self_reference(schema, id, stmt));
                    if slot.is_empty() {
                        self.statements.remove(&prop);
                    }
                }
            }
        }
        for stmt in other.stored() {
            if is_self_reference(self.schema, self.id.as_deref(), stmt) {
                continue;
            }
            let mut stmt = stmt.clone();
            if let Some(id) = &self.id {
                stmt.canonical_id = id.clone();
            }
            self.insert(stmt);
        }
        self.base_referents
            .extend(other.base_referents.iter().cloned());
        self.last_change = self.last_change.max(other.last_change);
        Ok(())
    }

    pub fn to_dict(&self) -> EntityData {
        self.to_proxy().to_data()
    }

    pub fn from_dict(
        model: &'m Model,
        data: EntityData,
        dataset: impl Into<String>,
        cleaned: bool,
    ) -> Result<Self, DataError> {
        let proxy = model.get_proxy(data, cleaned)?;
        Self::from_proxy(&proxy, dataset)
    }
}

fn is_self_reference(schema: &Schema, id: Option<&str>, stmt: &Statement) -> bool {
    id == Some(stmt.value.as_str()) && schema.get(&stmt.prop).is_some_and(|prop| prop.is_entity())
}

fn earliest(left: Option<DateTime<Utc>>, right: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    match (left, right) {
        (Some(l), Some(r)) => Some(l.min(r)),
        (l, r) => l.or(r),
    }
}

fn describe(schema: &Schema, id: Option<&str>) -> String {
    match id {
        Some(id) => format!("{}:{id}", schema.name()),
        None => schema.name().to_string(),
    }
}

impl<'m> EntityView<'m> for StatementEntity<'m> {
    fn model(&self) -> &'m Model {
        self.model
    }

    fn schema(&self) -> &'m Schema {
        self.schema
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn values(&self, prop: &str) -> Vec<&str> {
        if self.schema.get(prop).is_none() {
            return Vec::new();
        }
        let mut values: Vec<&str> = self
            .statements
            .get(prop)
            .map(|stmts| stmts.values().map(|s| s.value.as_str()).collect())
            .unwrap_or_default();
        values.sort_unstable();
        values.dedup();
        values
    }

    fn populated(&self) -> Vec<&str> {
        self.statements
            .iter()
            .filter(|(name, stmts)| !stmts.is_empty() && self.schema.get(name).is_some())
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn earliest_ignores_missing() {
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single();
        let u = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).single();
        assert_eq!(earliest(t, None), t);
        assert_eq!(earliest(None, u), u);
        assert_eq!(earliest(t, u), u);
        assert_eq!(earliest(None, None), None);
    }
}
