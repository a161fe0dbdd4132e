//! Text utilities shared by the type handlers.
//!
//! Everything in here is pure. Comparison helpers operate on *folded* text:
//! NFKD-decomposed, combining marks stripped, lowercased, with punctuation
//! turned into single spaces.

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("static regex"));

/// Legal-form tokens collapsed to a canonical short form when building
/// name fingerprints.
const LEGAL_FORMS: &[(&str, &str)] = &[
    ("gesellschaft mit beschrankter haftung", "gmbh"),
    ("limited liability company", "llc"),
    ("public limited company", "plc"),
    ("societe anonyme", "sa"),
    ("aktiengesellschaft", "ag"),
    ("incorporated", "inc"),
    ("corporation", "corp"),
    ("limited", "ltd"),
    ("company", "co"),
];

/// Strip control characters, normalize to NFC and trim.
///
/// Returns `None` when nothing printable remains.
pub fn sanitize_text(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .nfc()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t' || *c == '\r')
        .collect();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Collapse every run of whitespace (including line breaks) into a single space.
pub fn collapse_spaces(text: &str) -> String {
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// Fold text for comparison: strip accents, lowercase, map punctuation to spaces.
pub fn fold(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_space = true;
    for c in text.nfkd() {
        if is_combining_mark(c) {
            continue;
        }
        if c.is_alphanumeric() {
            for lower in c.to_lowercase() {
                out.push(lower);
            }
            last_space = false;
        } else if !last_space {
            out.push(' ');
            last_space = true;
        }
    }
    if out.ends_with(' ') {
        out.pop();
    }
    out
}

/// Token-sorted, legal-form-normalized version of a name.
///
/// `"ACME, Incorporated"` and `"Inc. ACME"` share the fingerprint `"acme inc"`.
pub fn fingerprint(text: &str) -> Option<String> {
    let mut folded = format!(" {} ", fold(text));
    for (long, short) in LEGAL_FORMS {
        let needle = format!(" {long} ");
        if folded.contains(&needle) {
            folded = folded.replace(&needle, &format!(" {short} "));
        }
    }
    let mut tokens: Vec<&str> = folded.split_whitespace().collect();
    if tokens.is_empty() {
        return None;
    }
    tokens.sort_unstable();
    tokens.dedup();
    Some(tokens.join(" "))
}

/// Fold and join with dashes; used for node ids.
pub fn slugify(text: &str) -> String {
    fold(text).replace(' ', "-")
}

/// Levenshtein similarity in [0, 1] between two already-folded strings.
pub fn levenshtein_similarity(left: &str, right: &str) -> f64 {
    if left.is_empty() && right.is_empty() {
        return 0.0;
    }
    strsim::normalized_levenshtein(left, right)
}

/// Length-based damping curve.
///
/// Values of `short` characters or fewer score 0, values of `long` characters
/// or more score 1, with a linear ramp in between.
pub fn dampen(short: usize, long: usize, text: &str) -> f64 {
    let length = text.chars().count() as f64 - short as f64;
    let baseline = (long as f64 - short as f64).max(1.0);
    (length / baseline).clamp(0.0, 1.0)
}

/// Truncate to at most `max_chars` characters on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Split folded text into tokens of at least `min_len` characters.
pub fn tokenize(text: &str, min_len: usize) -> Vec<String> {
    fold(text)
        .split_whitespace()
        .filter(|t| t.chars().count() >= min_len)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sanitize_drops_control_and_blank() {
        assert_eq!(sanitize_text("  \u{0000}  "), None);
        assert_eq!(sanitize_text(" a\u{0007}b "), Some("ab".to_string()));
    }

    #[test]
    fn fold_strips_accents_and_punctuation() {
        assert_eq!(fold("Müller-Lüdenscheidt, GmbH."), "muller ludenscheidt gmbh");
        assert_eq!(fold("  ...  "), "");
    }

    #[test]
    fn fingerprint_is_token_sorted() {
        assert_eq!(fingerprint("ACME, Incorporated").as_deref(), Some("acme inc"));
        assert_eq!(fingerprint("Inc. ACME").as_deref(), Some("acme inc"));
        assert_eq!(fingerprint("--"), None);
    }

    #[test]
    fn dampen_ramps_between_bounds() {
        assert_relative_eq!(dampen(2, 12, "ab"), 0.0);
        assert_relative_eq!(dampen(2, 12, "abcdefg"), 0.5);
        assert_relative_eq!(dampen(2, 12, &"x".repeat(40)), 1.0);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("ääää", 2), "ää");
        assert_eq!(truncate_chars("ab", 5), "ab");
    }
}
