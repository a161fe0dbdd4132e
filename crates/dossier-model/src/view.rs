//! Read surface shared by flat proxies and statement-backed entities.

use std::collections::{BTreeMap, BTreeSet};

use dossier_types::country::COUNTRY;
use dossier_types::name::NAME;
use dossier_types::TypeRef;

use crate::model::Model;
use crate::property::Property;
use crate::schema::Schema;

/// Anything that can present an entity as a schema plus property values.
///
/// Implementors supply the four accessors; scoring, captions and type
/// inversion come for free.
pub trait EntityView<'m> {
    fn model(&self) -> &'m Model;

    fn schema(&self) -> &'m Schema;

    fn id(&self) -> Option<&str>;

    /// Values held for the property with the given local name.
    fn values(&self, prop: &str) -> Vec<&str>;

    /// Local names of properties holding at least one value.
    fn populated(&self) -> Vec<&str>;

    fn populated_properties(&self) -> Vec<&'m Property> {
        let schema = self.schema();
        self.populated()
            .into_iter()
            .filter_map(|name| schema.get(name))
            .collect()
    }

    fn first(&self, prop: &str) -> Option<&str> {
        self.values(prop).into_iter().min()
    }

    fn has(&self, prop: &str) -> bool {
        !self.values(prop).is_empty()
    }

    /// All values of properties of the given type, deduplicated and sorted.
    fn get_type_values(&self, type_: TypeRef, matchable_only: bool) -> Vec<&str> {
        let mut out = Vec::new();
        for prop in self.populated_properties() {
            if prop.type_() == type_ && (!matchable_only || prop.matchable()) {
                out.extend(self.values(prop.name()));
            }
        }
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Values grouped by type group (`names`, `countries`, ...).
    fn get_type_inverted(&self, matchable_only: bool) -> BTreeMap<&'static str, Vec<&str>> {
        let mut inverted: BTreeMap<&'static str, Vec<&str>> = BTreeMap::new();
        for prop in self.populated_properties() {
            if matchable_only && !prop.matchable() {
                continue;
            }
            let Some(group) = prop.type_().group() else {
                continue;
            };
            inverted.entry(group).or_default().extend(self.values(prop.name()));
        }
        for values in inverted.values_mut() {
            values.sort_unstable();
            values.dedup();
        }
        inverted
    }

    fn names(&self) -> Vec<&str> {
        self.get_type_values(&NAME, false)
    }

    fn countries(&self) -> Vec<&str> {
        self.get_type_values(&COUNTRY, false)
    }

    /// Explicit countries, or failing those, whatever country the other
    /// values imply (phone prefixes, IBAN prefixes, ...).
    fn country_hints(&self) -> Vec<String> {
        let countries = self.countries();
        if !countries.is_empty() {
            return countries.into_iter().map(str::to_string).collect();
        }
        let mut hints = BTreeSet::new();
        for prop in self.populated_properties() {
            for value in self.values(prop.name()) {
                if let Some(hint) = prop.type_().country_hint(value) {
                    hints.insert(hint);
                }
            }
        }
        hints.into_iter().collect()
    }

    /// A human-readable label: the first caption property with a value,
    /// else the schema label.
    fn caption(&self) -> String {
        let schema = self.schema();
        for name in schema.caption() {
            let Some(prop) = schema.get(name) else {
                continue;
            };
            let values = self.values(name);
            if let Some(picked) = prop.type_().pick(&values) {
                return picked;
            }
        }
        schema.label().to_string()
    }

    /// `(source, target)` pairs for edge schemata.
    fn edgepairs(&self) -> Vec<(&str, &str)> {
        let Some(edge) = self.schema().edge() else {
            return Vec::new();
        };
        let targets = self.values(&edge.target);
        let mut pairs = Vec::new();
        for source in self.values(&edge.source) {
            for target in &targets {
                pairs.push((source, *target));
            }
        }
        pairs
    }

    /// Earliest value of the schema's temporal start properties.
    fn temporal_start(&self) -> Option<&str> {
        let (start, _) = self.schema().temporal_extent();
        start.iter().flat_map(|p| self.values(p)).min()
    }

    /// Latest value of the schema's temporal end properties.
    fn temporal_end(&self) -> Option<&str> {
        let (_, end) = self.schema().temporal_extent();
        end.iter().flat_map(|p| self.values(p)).max()
    }
}
