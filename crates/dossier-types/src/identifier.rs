//! Registration numbers, tax ids and other opaque identifiers.
//!
//! Identifiers are compared on their alphanumeric core: registries pad,
//! truncate and punctuate the same number differently, so a value contained
//! in the other scores by length ratio instead of zero.

use crate::text::{collapse_spaces, dampen};
use crate::{CleanContext, PropertyType};

pub static IDENTIFIER: IdentifierType = IdentifierType;

/// Uppercased alphanumeric core of an identifier.
pub fn normalize_identifier(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_uppercase)
        .collect()
}

#[derive(Debug, Clone, Copy)]
pub struct IdentifierType;

impl PropertyType for IdentifierType {
    fn name(&self) -> &'static str {
        "identifier"
    }

    fn label(&self) -> &'static str {
        "Identifier"
    }

    fn plural(&self) -> &'static str {
        "Identifiers"
    }

    fn group(&self) -> Option<&'static str> {
        Some("identifiers")
    }

    fn matchable(&self) -> bool {
        true
    }

    fn pivot(&self) -> bool {
        true
    }

    fn max_length(&self) -> usize {
        64
    }

    fn clean_text(&self, text: &str, _ctx: &CleanContext<'_>) -> Option<String> {
        let value = collapse_spaces(text);
        (!value.is_empty()).then_some(value)
    }

    fn compare(&self, left: &str, right: &str) -> f64 {
        let left = normalize_identifier(left);
        let right = normalize_identifier(right);
        if left.is_empty() || right.is_empty() {
            return 0.0;
        }
        if left == right {
            return 1.0;
        }
        let (shorter, longer) = if left.len() <= right.len() {
            (&left, &right)
        } else {
            (&right, &left)
        };
        if longer.contains(shorter.as_str()) {
            shorter.chars().count() as f64 / longer.chars().count() as f64
        } else {
            0.0
        }
    }

    fn specificity(&self, value: &str) -> f64 {
        dampen(4, 10, value)
    }

    fn node_id(&self, value: &str) -> Option<String> {
        Some(format!("id:{value}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn compare_ignores_punctuation() {
        assert_relative_eq!(IDENTIFIER.compare("HRB 12345", "hrb-12345"), 1.0);
    }

    #[test]
    fn compare_scores_truncation_by_ratio() {
        assert_relative_eq!(IDENTIFIER.compare("0012345678", "12345678"), 0.8);
        assert_relative_eq!(IDENTIFIER.compare("12345678", "87654321"), 0.0);
    }
}
