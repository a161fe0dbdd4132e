//! Numeric amounts, optionally followed by a unit.

use std::sync::LazyLock;

use regex::Regex;

use crate::{CleanContext, PropertyType};

pub static NUMBER: NumberType = NumberType;

static NUMERIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(-?\d[\d,]*(?:\.\d+)?)\s*([^\d\s][^\s]*)?$").expect("static regex")
});

#[derive(Debug, Clone, Copy)]
pub struct NumberType;

impl NumberType {
    /// Parse the numeric part of a cleaned value.
    pub fn to_number(&self, value: &str) -> Option<f64> {
        let caps = NUMERIC.captures(value.trim())?;
        caps.get(1)?.as_str().replace(',', "").parse().ok()
    }
}

impl PropertyType for NumberType {
    fn name(&self) -> &'static str {
        "number"
    }

    fn label(&self) -> &'static str {
        "Number"
    }

    fn plural(&self) -> &'static str {
        "Numbers"
    }

    fn group(&self) -> Option<&'static str> {
        Some("numbers")
    }

    fn clean_text(&self, text: &str, _ctx: &CleanContext<'_>) -> Option<String> {
        let caps = NUMERIC.captures(text.trim())?;
        let amount = caps.get(1)?.as_str().replace(',', "");
        match caps.get(2) {
            Some(unit) => Some(format!("{amount} {}", unit.as_str())),
            None => Some(amount),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousands_separators_are_dropped() {
        let ctx = CleanContext::default();
        assert_eq!(NUMBER.clean("1,000,000 USD", &ctx).as_deref(), Some("1000000 USD"));
        assert_eq!(NUMBER.clean("-3.5", &ctx).as_deref(), Some("-3.5"));
        assert_eq!(NUMBER.clean("many", &ctx), None);
        assert_eq!(NUMBER.to_number("1000000 USD"), Some(1_000_000.0));
    }
}
