//! Flat entity snapshots: a schema plus a set of values per property.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use dossier_types::text::truncate_chars;
use dossier_types::CleanContext;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::DataError;
use crate::ids::make_id;
use crate::model::Model;
use crate::property::{Property, PropertyRef};
use crate::schema::Schema;
use crate::view::EntityView;

/// Serialized proxy: `{"id", "schema", "properties"}` plus any extra keys,
/// which are carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityData {
    #[serde(default)]
    pub id: Option<String>,
    pub schema: String,
    #[serde(default)]
    pub properties: BTreeMap<String, Vec<String>>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// How [`EntityProxy::add_with`] treats incoming values.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddOptions<'a> {
    /// Values are already canonical; skip type cleaning.
    pub cleaned: bool,
    /// Allow fuzzy matching (country names, loose dates).
    pub fuzzy: bool,
    /// Explicit date format for parsing.
    pub format: Option<&'a str>,
}

impl AddOptions<'_> {
    pub fn cleaned() -> Self {
        Self {
            cleaned: true,
            ..Self::default()
        }
    }
}

/// An entity as a schema plus property value sets.
///
/// Values are cleaned on the way in, deduplicated, and bounded by the
/// per-type byte ceiling of each property type.
#[derive(Debug, Clone)]
pub struct EntityProxy<'m> {
    model: &'m Model,
    schema: &'m Schema,
    id: Option<String>,
    properties: BTreeMap<String, BTreeSet<String>>,
    sizes: HashMap<&'static str, usize>,
    extra: serde_json::Map<String, serde_json::Value>,
}

impl<'m> EntityProxy<'m> {
    pub fn new(model: &'m Model, schema: &'m Schema) -> Self {
        Self {
            model,
            schema,
            id: None,
            properties: BTreeMap::new(),
            sizes: HashMap::new(),
            extra: serde_json::Map::new(),
        }
    }

    pub fn from_data(model: &'m Model, data: EntityData, cleaned: bool) -> Result<Self, DataError> {
        let schema = model.require(&data.schema)?;
        let mut proxy = Self::new(model, schema);
        proxy.id = data.id.filter(|id| !id.is_empty());
        proxy.extra = data.extra;
        let opts = AddOptions {
            cleaned,
            ..AddOptions::default()
        };
        for (name, values) in &data.properties {
            if let Err(err) = proxy.add_with(name.as_str(), values, opts) {
                tracing::warn!(entity = ?proxy.id, property = %name, error = %err, "skipping property");
            }
        }
        Ok(proxy)
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

    /// Derive and assign a deterministic id from `parts`.
    pub fn make_id<I, S>(&mut self, parts: I) -> Option<&str>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.id = make_id(None, parts);
        self.id.as_deref()
    }

    pub fn extra(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.extra
    }

    pub fn set_extra(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.extra.insert(key.into(), value);
    }

    fn resolve(&self, prop: impl Into<PropertyRef>) -> Result<&'m Property, DataError> {
        self.model.resolve(self.schema, &prop.into())
    }

    // ========================================================================
    // Writing
    // ========================================================================

    pub fn add<I, S>(&mut self, prop: impl Into<PropertyRef>, values: I) -> Result<(), DataError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.add_with(prop, values, AddOptions::default())
    }

    /// Clean and add values.
    ///
    /// Values that do not clean are silently dropped. Errors are reserved for
    /// unknown properties, stub properties and self-references.
    pub fn add_with<I, S>(
        &mut self,
        prop: impl Into<PropertyRef>,
        values: I,
        opts: AddOptions<'_>,
    ) -> Result<(), DataError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let prop = self.resolve(prop)?;
        if prop.stub() {
            return Err(DataError::StubProperty(prop.qname().to_string()));
        }
        let hints = if opts.cleaned {
            Vec::new()
        } else {
            self.country_hints()
        };
        for raw in values {
            let Some(value) = clean_value(prop, raw.as_ref(), opts, &hints) else {
                continue;
            };
            if prop.is_entity() && self.id.as_deref() == Some(value.as_str()) {
                return Err(DataError::SelfReference {
                    property: prop.qname().to_string(),
                    id: value,
                });
            }
            self.push(prop, value);
        }
        Ok(())
    }

    /// Add without the stub and self-reference checks. Returns whether a new
    /// value was stored.
    pub fn unsafe_add(&mut self, prop: &'m Property, raw: &str, opts: AddOptions<'_>) -> bool {
        let hints = if opts.cleaned {
            Vec::new()
        } else {
            self.country_hints()
        };
        match clean_value(prop, raw, opts, &hints) {
            Some(value) => self.push(prop, value),
            None => false,
        }
    }

    fn push(&mut self, prop: &Property, value: String) -> bool {
        if self
            .properties
            .get(prop.name())
            .is_some_and(|set| set.contains(&value))
        {
            return false;
        }
        let type_ = prop.type_();
        let used = self.sizes.get(type_.name()).copied().unwrap_or(0);
        if used + value.len() > type_.max_size() {
            tracing::warn!(
                entity = ?self.id,
                property = %prop.qname(),
                used,
                limit = type_.max_size(),
                "value exceeds per-entity size ceiling, dropped"
            );
            return false;
        }
        *self.sizes.entry(type_.name()).or_default() += value.len();
        self.properties
            .entry(prop.name().to_string())
            .or_default()
            .insert(value)
    }

    /// Replace all values of a property.
    pub fn set<I, S>(&mut self, prop: impl Into<PropertyRef>, values: I) -> Result<(), DataError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let prop = self.resolve(prop)?;
        self.pop(prop)?;
        self.add(prop, values)
    }

    /// Remove and return every value of a property.
    pub fn pop(&mut self, prop: impl Into<PropertyRef>) -> Result<Vec<String>, DataError> {
        let prop = self.resolve(prop)?;
        let values = self.properties.remove(prop.name()).unwrap_or_default();
        self.release(prop, values.iter().map(String::len).sum());
        Ok(values.into_iter().collect())
    }

    /// Remove one value; absent values are ignored.
    pub fn remove(&mut self, prop: impl Into<PropertyRef>, value: &str) -> Result<(), DataError> {
        let prop = self.resolve(prop)?;
        let mut emptied = false;
        if let Some(set) = self.properties.get_mut(prop.name()) {
            if set.remove(value) {
                emptied = set.is_empty();
                self.release(prop, value.len());
            }
        }
        if emptied {
            self.properties.remove(prop.name());
        }
        Ok(())
    }

    fn release(&mut self, prop: &Property, bytes: usize) {
        if let Some(used) = self.sizes.get_mut(prop.type_().name()) {
            *used = used.saturating_sub(bytes);
        }
    }

    /// Rewrite every value of entity-typed properties through `f`. Values
    /// mapped to the entity's own id are dropped.
    pub fn rewrite_entity_values<F>(&mut self, mut f: F)
    where
        F: FnMut(&Property, &str) -> String,
    {
        let schema = self.schema;
        let names: Vec<String> = self.properties.keys().cloned().collect();
        for name in names {
            let Some(prop) = schema.get(&name) else {
                continue;
            };
            if !prop.is_entity() {
                continue;
            }
            let old = self.properties.remove(&name).unwrap_or_default();
            self.release(prop, old.iter().map(String::len).sum());
            for value in old {
                let rewritten = f(prop, &value);
                if self.id.as_deref() != Some(rewritten.as_str()) {
                    self.push(prop, rewritten);
                }
            }
        }
    }

    // ========================================================================
    // Reading
    // ========================================================================

    pub fn get(&self, prop: impl Into<PropertyRef>) -> Result<Vec<&str>, DataError> {
        let prop = self.resolve(prop)?;
        Ok(self.values(prop.name()))
    }

    /// Properties holding values, in name order.
    pub fn iterprops(&self) -> Vec<&'m Property> {
        self.populated_properties()
    }

    /// Every `(property, value)` pair.
    pub fn itervalues(&self) -> impl Iterator<Item = (&'m Property, &str)> + '_ {
        let schema = self.schema;
        self.properties
            .iter()
            .filter_map(move |(name, values)| schema.get(name).map(|p| (p, values)))
            .flat_map(|(prop, values)| values.iter().map(move |v| (prop, v.as_str())))
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.properties.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes stored, summed over all types.
    pub fn size(&self) -> usize {
        self.sizes.values().sum()
    }

    // ========================================================================
    // Merging
    // ========================================================================

    /// Union `other` into this entity.
    ///
    /// The schema narrows to the common schema of both sides; values the
    /// resulting schema cannot hold are dropped. The id of `self` wins.
    pub fn merge(&mut self, other: &EntityProxy<'m>) -> Result<(), DataError> {
        let schema = self
            .model
            .narrowest(self.schema, other.schema)
            .map_err(|_| DataError::NoCommonSchema {
                left: describe(self.schema, self.id()),
                right: describe(other.schema, other.id()),
            })?;
        if schema.id() != self.schema.id() {
            self.schema = schema;
            self.retain_schema_properties();
        }
        if self.id.is_none() && other.id.is_some() {
            self.id = other.id.clone();
            self.drop_self_references();
        }
        for (name, values) in &other.properties {
            let Some(prop) = schema.get(name) else {
                tracing::debug!(property = %name, schema = %schema.name(), "value outside merged schema dropped");
                continue;
            };
            for value in values {
                if prop.is_entity() && self.id.as_deref() == Some(value.as_str()) {
                    continue;
                }
                self.push(prop, value.clone());
            }
        }
        for (key, value) in &other.extra {
            self.extra.entry(key.clone()).or_insert_with(|| value.clone());
        }
        Ok(())
    }

    fn drop_self_references(&mut self) {
        let Some(id) = self.id.clone() else {
            return;
        };
        let schema = self.schema;
        let holding: Vec<&'m Property> = self
            .properties
            .iter()
            .filter(|(_, values)| values.contains(&id))
            .filter_map(|(name, _)| schema.get(name))
            .filter(|prop| prop.is_entity())
            .collect();
        for prop in holding {
            if let Some(values) = self.properties.get_mut(prop.name()) {
                values.remove(&id);
                if values.is_empty() {
                    self.properties.remove(prop.name());
                }
            }
            self.release(prop, id.len());
        }
    }

    fn retain_schema_properties(&mut self) {
        let schema = self.schema;
        let dropped: Vec<String> = self
            .properties
            .keys()
            .filter(|name| schema.get(name).is_none())
            .cloned()
            .collect();
        for name in dropped {
            tracing::debug!(property = %name, schema = %schema.name(), "property outside narrowed schema dropped");
            self.properties.remove(&name);
        }
        self.sizes.clear();
        for (name, values) in &self.properties {
            if let Some(prop) = schema.get(name) {
                *self.sizes.entry(prop.type_().name()).or_default() +=
                    values.iter().map(String::len).sum::<usize>();
            }
        }
    }

    // ========================================================================
    // Serialization
    // ========================================================================

    pub fn to_data(&self) -> EntityData {
        EntityData {
            id: self.id.clone(),
            schema: self.schema.name().to_string(),
            properties: self
                .properties
                .iter()
                .filter(|(_, values)| !values.is_empty())
                .map(|(name, values)| (name.clone(), values.iter().cloned().collect()))
                .collect(),
            extra: self.extra.clone(),
        }
    }
}

fn clean_value(prop: &Property, raw: &str, opts: AddOptions<'_>, hints: &[String]) -> Option<String> {
    let value = if opts.cleaned {
        if raw.trim().is_empty() {
            return None;
        }
        raw.to_string()
    } else {
        let ctx = CleanContext::with_countries(hints)
            .fuzzy(opts.fuzzy)
            .format(opts.format.or(prop.format()));
        prop.type_().clean(raw, &ctx)?
    };
    Some(truncate_chars(&value, prop.max_length()))
}

fn describe(schema: &Schema, id: Option<&str>) -> String {
    match id {
        Some(id) => format!("{}:{id}", schema.name()),
        None => schema.name().to_string(),
    }
}

impl<'m> EntityView<'m> for EntityProxy<'m> {
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
        self.properties
            .get(prop)
            .map(|values| values.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    fn populated(&self) -> Vec<&str> {
        self.properties
            .iter()
            .filter(|(_, values)| !values.is_empty())
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

impl Serialize for EntityProxy<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_data().serialize(serializer)
    }
}

impl PartialEq for EntityProxy<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.schema == other.schema && self.properties == other.properties
    }
}
