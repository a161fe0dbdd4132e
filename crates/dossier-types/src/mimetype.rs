//! MIME types of documents.

use std::sync::LazyLock;

use regex::Regex;

use crate::{CleanContext, PropertyType};

pub static MIMETYPE: MimeType = MimeType;

static MIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9][a-z0-9!#$&^_.+\-]*/[a-z0-9][a-z0-9!#$&^_.+\-]*$").expect("static regex")
});

pub const DEFAULT_MIMETYPE: &str = "application/octet-stream";

#[derive(Debug, Clone, Copy)]
pub struct MimeType;

impl PropertyType for MimeType {
    fn name(&self) -> &'static str {
        "mimetype"
    }

    fn label(&self) -> &'static str {
        "MIME-Type"
    }

    fn plural(&self) -> &'static str {
        "MIME-Types"
    }

    fn group(&self) -> Option<&'static str> {
        Some("mimetypes")
    }

    fn clean_text(&self, text: &str, _ctx: &CleanContext<'_>) -> Option<String> {
        let essence = text.split(';').next()?.trim().to_lowercase();
        MIME.is_match(&essence).then_some(essence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameters_are_stripped() {
        let ctx = CleanContext::default();
        assert_eq!(
            MIMETYPE.clean("Text/HTML; charset=UTF-8", &ctx).as_deref(),
            Some("text/html")
        );
        assert_eq!(MIMETYPE.clean("html", &ctx), None);
    }
}
