//! Partial ISO-8601 dates.
//!
//! Values keep only the precision the source actually had: `2017`,
//! `2017-04`, `2017-04-01`, up to `2017-04-01T10:32:05`. Single-digit parts
//! are zero-padded and the value is cut at the first component that does not
//! form a valid date, so `2017-13-01` becomes `2017`.

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;

use crate::text::dampen;
use crate::{CleanContext, PropertyType};

pub static DATE: DateType = DateType;

static PREFIX_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(\d{4})(?:-(\d{1,2})(?:-(\d{1,2})(?:[T ](\d{1,2})(?::(\d{1,2})(?::(\d{1,2}))?)?)?)?)?",
    )
    .expect("static regex")
});

/// Fallback grammars tried in order when strict parsing fails and the caller
/// asked for fuzzy cleaning. Day-first forms come before month-first ones.
const FUZZY_DATE_FORMATS: &[&str] = &[
    "%d.%m.%Y",
    "%d/%m/%Y",
    "%m/%d/%Y",
    "%d-%m-%Y",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%Y%m%d",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d. %B %Y",
    "%A, %d %B %Y",
];

const FUZZY_DATETIME_FORMATS: &[&str] = &[
    "%d.%m.%Y %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
    "%d/%m/%Y %H:%M",
];

/// Precision levels, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precision {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
}

impl Precision {
    /// Number of leading characters a value of this precision occupies.
    pub fn width(self) -> usize {
        match self {
            Precision::Year => 4,
            Precision::Month => 7,
            Precision::Day => 10,
            Precision::Hour => 13,
            Precision::Minute => 16,
            Precision::Second => 19,
        }
    }

    pub fn of(value: &str) -> Option<Precision> {
        match value.len() {
            4 => Some(Precision::Year),
            7 => Some(Precision::Month),
            10 => Some(Precision::Day),
            13 => Some(Precision::Hour),
            16 => Some(Precision::Minute),
            19 => Some(Precision::Second),
            _ => None,
        }
    }
}

/// Parse the longest valid ISO-like prefix of `text`.
pub fn parse_prefix_date(text: &str) -> Option<String> {
    let caps = PREFIX_DATE.captures(text.trim())?;
    let whole = caps.get(0)?;
    if text.trim()[whole.end()..]
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit())
    {
        return None;
    }
    let part = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());

    let year = part(1)? as i32;
    if year == 0 {
        return None;
    }
    let mut out = format!("{year:04}");
    let Some(month) = part(2).filter(|m| (1..=12).contains(m)) else {
        return Some(out);
    };
    out.push_str(&format!("-{month:02}"));
    let Some(day) = part(3).filter(|d| NaiveDate::from_ymd_opt(year, month, *d).is_some()) else {
        return Some(out);
    };
    out.push_str(&format!("-{day:02}"));
    let Some(hour) = part(4).filter(|h| *h < 24) else {
        return Some(out);
    };
    out.push_str(&format!("T{hour:02}"));
    let Some(minute) = part(5).filter(|m| *m < 60) else {
        return Some(out);
    };
    out.push_str(&format!(":{minute:02}"));
    let Some(second) = part(6).filter(|s| *s < 60) else {
        return Some(out);
    };
    out.push_str(&format!(":{second:02}"));
    Some(out)
}

fn parse_with_format(text: &str, format: &str) -> Option<String> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
        return Some(dt.format("%Y-%m-%dT%H:%M:%S").to_string());
    }
    NaiveDate::parse_from_str(text, format)
        .ok()
        .map(|d| d.format("%Y-%m-%d").to_string())
}

fn parse_fuzzy(text: &str) -> Option<String> {
    let text = text.trim().trim_end_matches('.');
    FUZZY_DATETIME_FORMATS
        .iter()
        .chain(FUZZY_DATE_FORMATS.iter())
        .find_map(|format| parse_with_format(text, format))
}

#[derive(Debug, Clone, Copy)]
pub struct DateType;

impl PropertyType for DateType {
    fn name(&self) -> &'static str {
        "date"
    }

    fn label(&self) -> &'static str {
        "Date"
    }

    fn plural(&self) -> &'static str {
        "Dates"
    }

    fn group(&self) -> Option<&'static str> {
        Some("dates")
    }

    fn matchable(&self) -> bool {
        true
    }

    fn max_length(&self) -> usize {
        32
    }

    fn clean_text(&self, text: &str, ctx: &CleanContext<'_>) -> Option<String> {
        if let Some(format) = ctx.format {
            return parse_with_format(text.trim(), format);
        }
        parse_prefix_date(text).or_else(|| if ctx.fuzzy { parse_fuzzy(text) } else { None })
    }

    /// Ratio of the shared prefix to the longer value: `2017-04` vs
    /// `2017-04-01` shares 7 of 10 characters.
    fn compare(&self, left: &str, right: &str) -> f64 {
        let longest = left.len().max(right.len());
        if longest == 0 {
            return 0.0;
        }
        let common = left
            .bytes()
            .zip(right.bytes())
            .take_while(|(l, r)| l == r)
            .count();
        common as f64 / longest as f64
    }

    fn specificity(&self, value: &str) -> f64 {
        dampen(5, 13, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn clean(raw: &str) -> Option<String> {
        DATE.clean(raw, &CleanContext::default())
    }

    #[test]
    fn partial_dates_are_padded() {
        assert_eq!(clean("2017-4").as_deref(), Some("2017-04"));
        assert_eq!(clean("2017-4-3").as_deref(), Some("2017-04-03"));
        assert_eq!(clean("2017").as_deref(), Some("2017"));
        assert_eq!(clean("2017-04-03T9:05").as_deref(), Some("2017-04-03T09:05"));
    }

    #[test]
    fn invalid_components_truncate() {
        assert_eq!(clean("2017-13-01").as_deref(), Some("2017"));
        assert_eq!(clean("2017-02-30").as_deref(), Some("2017-02"));
        assert_eq!(clean("2017-02-03T10:32:05.123Z").as_deref(), Some("2017-02-03T10:32:05"));
    }

    #[test]
    fn garbage_is_rejected() {
        assert_eq!(clean("yesterday"), None);
        assert_eq!(clean("20170403"), None);
        assert_eq!(clean("0000-01-01"), None);
    }

    #[test]
    fn fuzzy_fallback_parses_locale_forms() {
        let ctx = CleanContext::default().fuzzy(true);
        assert_eq!(DATE.clean("03.04.2017", &ctx).as_deref(), Some("2017-04-03"));
        assert_eq!(DATE.clean("April 3, 2017", &ctx).as_deref(), Some("2017-04-03"));
        assert_eq!(DATE.clean("20170403", &ctx).as_deref(), Some("2017-04-03"));
    }

    #[test]
    fn explicit_format_wins() {
        let ctx = CleanContext::default().format(Some("%m/%d/%Y"));
        assert_eq!(DATE.clean("04/03/2017", &ctx).as_deref(), Some("2017-04-03"));
    }

    #[test]
    fn compare_uses_shared_prefix() {
        assert_relative_eq!(DATE.compare("2017-04-01", "2017-04-01"), 1.0);
        assert_relative_eq!(DATE.compare("2017-04", "2017-04-01"), 0.7);
        assert_relative_eq!(DATE.compare("1999", "2017"), 0.0);
    }
}
