//! URLs, normalized by the `url` crate.

use url::Url;

use crate::text::dampen;
use crate::{CleanContext, PropertyType};

pub static URL: UrlType = UrlType;

const SCHEMES: &[&str] = &["http", "https", "ftp", "mailto"];

fn parse_url(text: &str) -> Option<Url> {
    let parsed = Url::parse(text).ok()?;
    if !SCHEMES.contains(&parsed.scheme()) {
        return None;
    }
    if parsed.scheme() != "mailto" && parsed.host_str().map_or(true, str::is_empty) {
        return None;
    }
    Some(parsed)
}

#[derive(Debug, Clone, Copy)]
pub struct UrlType;

impl PropertyType for UrlType {
    fn name(&self) -> &'static str {
        "url"
    }

    fn label(&self) -> &'static str {
        "URL"
    }

    fn plural(&self) -> &'static str {
        "URLs"
    }

    fn group(&self) -> Option<&'static str> {
        Some("urls")
    }

    fn matchable(&self) -> bool {
        true
    }

    fn pivot(&self) -> bool {
        true
    }

    fn max_length(&self) -> usize {
        4096
    }

    fn clean_text(&self, text: &str, _ctx: &CleanContext<'_>) -> Option<String> {
        let text = text.trim();
        if text.contains(char::is_whitespace) {
            return None;
        }
        let parsed = parse_url(text).or_else(|| {
            if !text.contains("://") && text.contains('.') {
                parse_url(&format!("http://{text}"))
            } else {
                None
            }
        })?;
        Some(parsed.to_string())
    }

    fn specificity(&self, value: &str) -> f64 {
        dampen(10, 120, value)
    }

    fn node_id(&self, value: &str) -> Option<String> {
        Some(format!("url:{value}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean(raw: &str) -> Option<String> {
        URL.clean(raw, &CleanContext::default())
    }

    #[test]
    fn clean_normalizes_and_adds_scheme() {
        assert_eq!(clean("https://Example.com").as_deref(), Some("https://example.com/"));
        assert_eq!(clean("example.com/about").as_deref(), Some("http://example.com/about"));
    }

    #[test]
    fn clean_rejects_other_schemes() {
        assert_eq!(clean("javascript:alert(1)"), None);
        assert_eq!(clean("file:///etc/passwd"), None);
        assert_eq!(clean("not a url"), None);
    }
}
