//! Free-form text: short labels (`string`), long bodies (`text`) and markup
//! (`html`). None of these are matchable or reified as graph nodes except
//! plain strings.

use crate::{CleanContext, PropertyType, BULK_MAX_SIZE};

pub static STRING: StringType = StringType;
pub static TEXT: TextType = TextType;
pub static HTML: HtmlType = HtmlType;

#[derive(Debug, Clone, Copy)]
pub struct StringType;

impl PropertyType for StringType {
    fn name(&self) -> &'static str {
        "string"
    }

    fn label(&self) -> &'static str {
        "Label"
    }

    fn plural(&self) -> &'static str {
        "Labels"
    }

    fn max_length(&self) -> usize {
        1024
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TextType;

impl PropertyType for TextType {
    fn name(&self) -> &'static str {
        "text"
    }

    fn label(&self) -> &'static str {
        "Text"
    }

    fn plural(&self) -> &'static str {
        "Texts"
    }

    fn max_length(&self) -> usize {
        usize::MAX
    }

    fn max_size(&self) -> usize {
        BULK_MAX_SIZE
    }

    fn node_id(&self, _value: &str) -> Option<String> {
        None
    }
}

#[derive(Debug, Clone, Copy)]
pub struct HtmlType;

impl PropertyType for HtmlType {
    fn name(&self) -> &'static str {
        "html"
    }

    fn label(&self) -> &'static str {
        "HTML"
    }

    fn plural(&self) -> &'static str {
        "HTMLs"
    }

    fn max_length(&self) -> usize {
        usize::MAX
    }

    fn max_size(&self) -> usize {
        BULK_MAX_SIZE
    }

    fn clean_text(&self, text: &str, _ctx: &CleanContext<'_>) -> Option<String> {
        Some(text.to_string())
    }

    fn node_id(&self, _value: &str) -> Option<String> {
        None
    }
}
