//! Static catalog of every property type.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::{
    address::ADDRESS, checksum::CHECKSUM, country::COUNTRY, date::DATE, email::EMAIL,
    entity::ENTITY, gender::GENDER, iban::IBAN, identifier::IDENTIFIER, ip::IP, json::JSON,
    language::LANGUAGE, mimetype::MIMETYPE, name::NAME, number::NUMBER, phone::PHONE,
    string::HTML, string::STRING, string::TEXT, topic::TOPIC, url::URL, TypeRef,
};

static ALL_TYPES: [TypeRef; 21] = [
    &ADDRESS, &CHECKSUM, &COUNTRY, &DATE, &EMAIL, &ENTITY, &GENDER, &HTML, &IBAN, &IDENTIFIER,
    &IP, &JSON, &LANGUAGE, &MIMETYPE, &NAME, &NUMBER, &PHONE, &STRING, &TEXT, &TOPIC, &URL,
];

static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

/// The process-wide registry. Types are stateless, so sharing it is safe.
pub fn registry() -> &'static Registry {
    &REGISTRY
}

/// Lookup tables over the static type list.
#[derive(Debug)]
pub struct Registry {
    by_name: BTreeMap<&'static str, TypeRef>,
    by_group: BTreeMap<&'static str, TypeRef>,
}

impl Registry {
    fn new() -> Self {
        let mut by_name = BTreeMap::new();
        let mut by_group = BTreeMap::new();
        for ty in ALL_TYPES.iter().copied() {
            by_name.insert(ty.name(), ty);
            if let Some(group) = ty.group() {
                by_group.insert(group, ty);
            }
        }
        Self { by_name, by_group }
    }

    pub fn get(&self, name: &str) -> Option<TypeRef> {
        self.by_name.get(name).copied()
    }

    /// The type that owns a group name (`"names"` → `name`).
    pub fn get_group(&self, group: &str) -> Option<TypeRef> {
        self.by_group.get(group).copied()
    }

    /// All types, ordered by name.
    pub fn types(&self) -> impl Iterator<Item = TypeRef> + '_ {
        self.by_name.values().copied()
    }

    pub fn matchable(&self) -> impl Iterator<Item = TypeRef> + '_ {
        self.types().filter(|t| t.matchable())
    }

    pub fn pivots(&self) -> impl Iterator<Item = TypeRef> + '_ {
        self.types().filter(|t| t.pivot())
    }

    pub fn groups(&self) -> impl Iterator<Item = (&'static str, TypeRef)> + '_ {
        self.by_group.iter().map(|(g, t)| (*g, *t))
    }
}
