//! E-mail addresses.

use std::sync::LazyLock;

use regex::Regex;

use crate::text::dampen;
use crate::{CleanContext, PropertyType};

pub static EMAIL: EmailType = EmailType;

static LOCAL_PART: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@<>()\[\],;:]+$").expect("static regex"));
static DOMAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z0-9]([a-z0-9\-]{0,61}[a-z0-9])?\.)+[a-z][a-z0-9\-]{0,61}[a-z0-9]$")
        .expect("static regex")
});

#[derive(Debug, Clone, Copy)]
pub struct EmailType;

impl PropertyType for EmailType {
    fn name(&self) -> &'static str {
        "email"
    }

    fn label(&self) -> &'static str {
        "E-Mail Address"
    }

    fn plural(&self) -> &'static str {
        "E-Mail Addresses"
    }

    fn group(&self) -> Option<&'static str> {
        Some("emails")
    }

    fn matchable(&self) -> bool {
        true
    }

    fn pivot(&self) -> bool {
        true
    }

    fn clean_text(&self, text: &str, _ctx: &CleanContext<'_>) -> Option<String> {
        let mut text = text.trim().trim_start_matches('<').trim_end_matches('>').trim();
        if let Some(rest) = strip_prefix_ignore_case(text, "mailto:") {
            text = rest;
        }
        let (local, domain) = text.rsplit_once('@')?;
        if !LOCAL_PART.is_match(local) {
            return None;
        }
        let domain = domain.trim_end_matches('.').to_lowercase();
        if !DOMAIN.is_match(&domain) {
            return None;
        }
        Some(format!("{local}@{domain}"))
    }

    fn specificity(&self, value: &str) -> f64 {
        dampen(6, 50, value)
    }

    fn node_id(&self, value: &str) -> Option<String> {
        Some(format!("mail:{value}"))
    }
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &text[prefix.len()..])
        .filter(|rest| !rest.is_empty())
}
