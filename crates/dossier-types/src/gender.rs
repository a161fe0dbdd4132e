//! Gender of a person, as a small closed vocabulary.

use crate::{CleanContext, PropertyType};

pub static GENDER: GenderType = GenderType;

pub const MALE: &str = "male";
pub const FEMALE: &str = "female";
pub const OTHER: &str = "other";

const LOOKUP: &[(&str, &str)] = &[
    ("m", MALE),
    ("man", MALE),
    ("male", MALE),
    ("masculin", MALE),
    ("masculine", MALE),
    ("männlich", MALE),
    ("f", FEMALE),
    ("w", FEMALE),
    ("woman", FEMALE),
    ("female", FEMALE),
    ("feminine", FEMALE),
    ("féminin", FEMALE),
    ("weiblich", FEMALE),
    ("o", OTHER),
    ("d", OTHER),
    ("x", OTHER),
    ("other", OTHER),
    ("divers", OTHER),
    ("diverse", OTHER),
    ("non-binary", OTHER),
    ("nonbinary", OTHER),
];

#[derive(Debug, Clone, Copy)]
pub struct GenderType;

impl PropertyType for GenderType {
    fn name(&self) -> &'static str {
        "gender"
    }

    fn label(&self) -> &'static str {
        "Gender"
    }

    fn plural(&self) -> &'static str {
        "Genders"
    }

    fn group(&self) -> Option<&'static str> {
        Some("genders")
    }

    fn max_length(&self) -> usize {
        16
    }

    fn clean_text(&self, text: &str, _ctx: &CleanContext<'_>) -> Option<String> {
        let key = text.trim().to_lowercase();
        LOOKUP
            .iter()
            .find(|(alias, _)| *alias == key)
            .map(|(_, code)| (*code).to_string())
    }

    fn caption(&self, value: &str) -> String {
        match value {
            MALE => "Male".to_string(),
            FEMALE => "Female".to_string(),
            OTHER => "Other".to_string(),
            _ => value.to_string(),
        }
    }
}
