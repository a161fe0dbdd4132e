//! Postal addresses, kept as single-line free text.

use std::sync::LazyLock;

use regex::Regex;

use crate::text::{collapse_spaces, dampen, fold, levenshtein_similarity, slugify};
use crate::{CleanContext, PropertyType};

pub static ADDRESS: AddressType = AddressType;

static LINE_BREAKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\r\n|\n|\r|<br\s*/?>|\t)").expect("static regex"));
static COMMATA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r",(\s*,)+").expect("static regex"));

#[derive(Debug, Clone, Copy)]
pub struct AddressType;

impl PropertyType for AddressType {
    fn name(&self) -> &'static str {
        "address"
    }

    fn label(&self) -> &'static str {
        "Address"
    }

    fn plural(&self) -> &'static str {
        "Addresses"
    }

    fn group(&self) -> Option<&'static str> {
        Some("addresses")
    }

    fn matchable(&self) -> bool {
        true
    }

    fn pivot(&self) -> bool {
        true
    }

    fn clean_text(&self, text: &str, _ctx: &CleanContext<'_>) -> Option<String> {
        let single_line = LINE_BREAKS.replace_all(text, ", ");
        let spaced = collapse_spaces(&single_line);
        let address = COMMATA.replace_all(&spaced, ",").into_owned();
        let address = address.trim_matches(|c: char| c == ',' || c.is_whitespace());
        (!address.is_empty()).then(|| address.to_string())
    }

    fn compare(&self, left: &str, right: &str) -> f64 {
        levenshtein_similarity(&fold(left), &fold(right))
    }

    fn specificity(&self, value: &str) -> f64 {
        dampen(10, 60, value)
    }

    fn node_id(&self, value: &str) -> Option<String> {
        let slug = slugify(value);
        (!slug.is_empty()).then(|| format!("addr:{slug}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_joins_lines() {
        let ctx = CleanContext::default();
        let cleaned = ADDRESS.clean("Sesame Street 1\nNew York,\n, NY", &ctx);
        assert_eq!(cleaned.as_deref(), Some("Sesame Street 1, New York, NY"));
    }

    #[test]
    fn node_id_is_slugged() {
        assert_eq!(
            ADDRESS.node_id("Sesame Street 1, NY").as_deref(),
            Some("addr:sesame-street-1-ny")
        );
    }
}
