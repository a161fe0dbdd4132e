//! Entity clean-up routines applied before export or indexing.

use dossier_types::checksum::CHECKSUM;
use dossier_types::date::DATE;
use dossier_types::name::NAME;
use dossier_types::TypeRef;

use crate::error::DataError;
use crate::proxy::{AddOptions, EntityProxy};
use crate::view::EntityView;

/// Property that collects names of related entities.
pub const NAMES_MENTIONED: &str = "namesMentioned";

/// Drop date values that are a prefix of a more precise value of the same
/// property (`2020` next to `2020-03-01`).
pub fn simplify_dates(proxy: &mut EntityProxy<'_>) -> Result<(), DataError> {
    let date: TypeRef = &DATE;
    for prop in proxy.iterprops() {
        if prop.type_() != date {
            continue;
        }
        let values: Vec<String> = proxy.values(prop.name()).into_iter().map(str::to_string).collect();
        for value in &values {
            let superseded = values
                .iter()
                .any(|other| other.len() > value.len() && other.starts_with(value.as_str()));
            if superseded {
                proxy.remove(prop, value)?;
            }
        }
    }
    Ok(())
}

/// Drop every checksum-typed value.
pub fn remove_checksums(proxy: &mut EntityProxy<'_>) -> Result<(), DataError> {
    let checksum: TypeRef = &CHECKSUM;
    for prop in proxy.iterprops() {
        if prop.type_() == checksum {
            proxy.pop(prop)?;
        }
    }
    Ok(())
}

/// Copy the names of `related` onto `proxy` so that a search for a party's
/// name also finds records that mention it (payments, ownerships, ...).
/// Does nothing if the schema has no place for mentioned names.
pub fn inline_names(proxy: &mut EntityProxy<'_>, related: &EntityProxy<'_>) -> Result<(), DataError> {
    if proxy.schema().get(NAMES_MENTIONED).is_none() {
        return Ok(());
    }
    let names = related.get_type_values(&NAME, false);
    if names.is_empty() {
        return Ok(());
    }
    proxy.add_with(NAMES_MENTIONED, names, AddOptions::cleaned())
}
