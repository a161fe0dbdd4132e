//! Names of people, companies and other entities.

use crate::text::{collapse_spaces, dampen, fold, levenshtein_similarity, slugify};
use crate::{CleanContext, PropertyType};

pub static NAME: NameType = NameType;

#[derive(Debug, Clone, Copy)]
pub struct NameType;

impl PropertyType for NameType {
    fn name(&self) -> &'static str {
        "name"
    }

    fn label(&self) -> &'static str {
        "Name"
    }

    fn plural(&self) -> &'static str {
        "Names"
    }

    fn group(&self) -> Option<&'static str> {
        Some("names")
    }

    fn matchable(&self) -> bool {
        true
    }

    fn pivot(&self) -> bool {
        true
    }

    fn max_length(&self) -> usize {
        384
    }

    fn clean_text(&self, text: &str, _ctx: &CleanContext<'_>) -> Option<String> {
        let name = collapse_spaces(text.trim_matches(|c: char| c == '"' || c == '\''));
        (!name.is_empty()).then_some(name)
    }

    fn compare(&self, left: &str, right: &str) -> f64 {
        levenshtein_similarity(&fold(left), &fold(right))
    }

    fn specificity(&self, value: &str) -> f64 {
        dampen(2, 50, value)
    }

    fn node_id(&self, value: &str) -> Option<String> {
        let slug = slugify(value);
        (!slug.is_empty()).then(|| format!("name:{slug}"))
    }

    /// The most central spelling: the value with the highest summed
    /// similarity to all others.
    fn pick(&self, values: &[&str]) -> Option<String> {
        let folded: Vec<String> = values.iter().map(|v| fold(v)).collect();
        let mut best: Option<(f64, &str)> = None;
        for (i, value) in values.iter().enumerate() {
            let centrality: f64 = folded
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, other)| levenshtein_similarity(&folded[i], other))
                .sum();
            best = match best {
                Some((score, current))
                    if score > centrality || (score == centrality && current <= *value) =>
                {
                    Some((score, current))
                }
                _ => Some((centrality, value)),
            };
        }
        best.map(|(_, v)| v.to_string())
    }
}
