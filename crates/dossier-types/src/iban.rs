//! International bank account numbers, validated with `iban_validate`.

use iban::{Iban, IbanLike};

use crate::{CleanContext, PropertyType};

pub static IBAN: IbanType = IbanType;

#[derive(Debug, Clone, Copy)]
pub struct IbanType;

impl PropertyType for IbanType {
    fn name(&self) -> &'static str {
        "iban"
    }

    fn label(&self) -> &'static str {
        "IBAN"
    }

    fn plural(&self) -> &'static str {
        "IBANs"
    }

    fn group(&self) -> Option<&'static str> {
        Some("ibans")
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
        let compact: String = text
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-')
            .flat_map(char::to_uppercase)
            .collect();
        let iban: Iban = compact.parse().ok()?;
        Some(iban.electronic_str().to_string())
    }

    fn country_hint(&self, value: &str) -> Option<String> {
        value.get(..2).map(str::to_lowercase)
    }

    fn specificity(&self, _value: &str) -> f64 {
        1.0
    }

    fn caption(&self, value: &str) -> String {
        value
            .parse::<Iban>()
            .map(|iban| iban.to_string())
            .unwrap_or_else(|_| value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_compacts_and_validates() {
        let ctx = CleanContext::default();
        assert_eq!(
            IBAN.clean("de44 5001 0517 5407 3249 31", &ctx).as_deref(),
            Some("DE44500105175407324931")
        );
        assert_eq!(IBAN.clean("DE44 5001 0517 5407 3249 32", &ctx), None);
    }

    #[test]
    fn country_hint_from_prefix() {
        assert_eq!(IBAN.country_hint("DE44500105175407324931").as_deref(), Some("de"));
    }
}
