//! Content digests (hex-encoded hashes of documents).

use crate::{CleanContext, PropertyType};

pub static CHECKSUM: ChecksumType = ChecksumType;

#[derive(Debug, Clone, Copy)]
pub struct ChecksumType;

impl PropertyType for ChecksumType {
    fn name(&self) -> &'static str {
        "checksum"
    }

    fn label(&self) -> &'static str {
        "Checksum"
    }

    fn plural(&self) -> &'static str {
        "Checksums"
    }

    fn group(&self) -> Option<&'static str> {
        Some("checksums")
    }

    fn matchable(&self) -> bool {
        true
    }

    fn pivot(&self) -> bool {
        true
    }

    fn max_length(&self) -> usize {
        128
    }

    fn clean_text(&self, text: &str, _ctx: &CleanContext<'_>) -> Option<String> {
        let digest = text.trim().to_lowercase();
        let valid = (32..=128).contains(&digest.len())
            && digest.chars().all(|c| c.is_ascii_hexdigit());
        valid.then_some(digest)
    }

    fn specificity(&self, _value: &str) -> f64 {
        1.0
    }

    fn node_id(&self, value: &str) -> Option<String> {
        Some(format!("hash:{value}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_accepts_hex_digests() {
        let ctx = CleanContext::default();
        let sha1 = "DA39A3EE5E6B4B0D3255BFEF95601890AFD80709";
        assert_eq!(CHECKSUM.clean(sha1, &ctx), Some(sha1.to_lowercase()));
        assert_eq!(CHECKSUM.clean("xyz", &ctx), None);
    }
}
