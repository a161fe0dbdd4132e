//! Phone numbers, normalized to E.164 via `phonenumber`.
//!
//! Numbers without an international prefix only clean when the entity they
//! are added to carries a country hint to resolve them against.

use phonenumber::country::Id as CountryId;
use phonenumber::Mode;

use crate::text::dampen;
use crate::{CleanContext, PropertyType};

pub static PHONE: PhoneType = PhoneType;

fn region(code: &str) -> Option<CountryId> {
    code.get(..2)?.to_uppercase().parse::<CountryId>().ok()
}

fn parse_valid(region: Option<CountryId>, text: &str) -> Option<String> {
    let number = phonenumber::parse(region, text).ok()?;
    if !phonenumber::is_valid(&number) {
        return None;
    }
    Some(number.format().mode(Mode::E164).to_string())
}

#[derive(Debug, Clone, Copy)]
pub struct PhoneType;

impl PropertyType for PhoneType {
    fn name(&self) -> &'static str {
        "phone"
    }

    fn label(&self) -> &'static str {
        "Phone number"
    }

    fn plural(&self) -> &'static str {
        "Phone numbers"
    }

    fn group(&self) -> Option<&'static str> {
        Some("phones")
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

    fn clean_text(&self, text: &str, ctx: &CleanContext<'_>) -> Option<String> {
        let text = text.trim();
        if text.starts_with('+') || text.starts_with("00") {
            let international = text.strip_prefix("00").map(|rest| format!("+{rest}"));
            return parse_valid(None, international.as_deref().unwrap_or(text));
        }
        ctx.countries
            .iter()
            .filter_map(|code| region(code))
            .find_map(|id| parse_valid(Some(id), text))
    }

    fn country_hint(&self, value: &str) -> Option<String> {
        let number = phonenumber::parse(None, value).ok()?;
        let id = number.country().id()?;
        Some(format!("{id:?}").to_lowercase())
    }

    fn specificity(&self, value: &str) -> f64 {
        dampen(7, 11, value)
    }

    fn node_id(&self, value: &str) -> Option<String> {
        Some(format!("tel:{value}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn international_numbers_need_no_context() {
        let ctx = CleanContext::default();
        assert_eq!(PHONE.clean("+1 (202) 555-7612", &ctx).as_deref(), Some("+12025557612"));
        assert_eq!(PHONE.clean("001 202 555 7612", &ctx).as_deref(), Some("+12025557612"));
    }

    #[test]
    fn national_numbers_need_a_country() {
        assert_eq!(PHONE.clean("(202) 555-7612", &CleanContext::default()), None);
        let countries = vec!["us".to_string()];
        let ctx = CleanContext::with_countries(&countries);
        assert_eq!(PHONE.clean("(202) 555-7612", &ctx).as_deref(), Some("+12025557612"));
    }

    #[test]
    fn country_hint_from_number() {
        assert_eq!(PHONE.country_hint("+12025557612").as_deref(), Some("us"));
    }
}
