//! Namespaced entity ids.
//!
//! A signed id carries an HMAC of its base id, keyed by the namespace name:
//!
//! ```text
//!   ent-1  ──sign("dataset-a")──►  ent-1.<64 hex digits>
//! ```
//!
//! Entity ids from different sources can then be mixed without collisions,
//! and an id's namespace can be checked without a lookup table.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::proxy::EntityProxy;

type HmacSha256 = Hmac<Sha256>;

pub const SEPARATOR: char = '.';

const DIGEST_HEX_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    key: Vec<u8>,
}

impl Namespace {
    /// An empty name yields a namespace that strips signatures without
    /// adding any.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            key: name.as_ref().as_bytes().to_vec(),
        }
    }

    /// Split an id into its base and (if present) signature. Only a suffix
    /// of 64 hex digits counts as a signature, since bare ids may contain
    /// the separator too.
    pub fn parse(id: &str) -> (&str, Option<&str>) {
        if let Some((base, digest)) = id.rsplit_once(SEPARATOR) {
            let is_digest = digest.len() == DIGEST_HEX_LEN
                && digest.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
            if is_digest && !base.is_empty() {
                return (base, Some(digest));
            }
        }
        (id, None)
    }

    pub fn strip(id: &str) -> &str {
        Self::parse(id).0
    }

    fn mac(&self, base: &str) -> Option<HmacSha256> {
        if self.key.is_empty() {
            return None;
        }
        let mut mac = HmacSha256::new_from_slice(&self.key).ok()?;
        mac.update(base.as_bytes());
        Some(mac)
    }

    /// Hex signature of the id's base under this namespace.
    pub fn signature(&self, id: &str) -> Option<String> {
        let mac = self.mac(Self::strip(id))?;
        Some(hex::encode(mac.finalize().into_bytes()))
    }

    /// Re-sign an id, replacing any previous signature.
    pub fn sign(&self, id: &str) -> String {
        let base = Self::strip(id);
        match self.signature(base) {
            Some(digest) => format!("{base}{SEPARATOR}{digest}"),
            None => base.to_string(),
        }
    }

    /// Check the id's signature in constant time.
    pub fn verify(&self, id: &str) -> bool {
        let (base, Some(digest)) = Self::parse(id) else {
            return false;
        };
        let Ok(expected) = hex::decode(digest) else {
            return false;
        };
        self.mac(base)
            .is_some_and(|mac| mac.verify_slice(&expected).is_ok())
    }

    /// Sign the entity's id and, unless `shallow`, every entity reference.
    pub fn apply<'m>(&self, proxy: &EntityProxy<'m>, shallow: bool) -> EntityProxy<'m> {
        let mut signed = proxy.clone();
        signed.set_id(proxy.id().map(|id| self.sign(id)));
        if !shallow {
            signed.rewrite_entity_values(|_, value| self.sign(value));
        }
        signed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_then_verify() {
        let ns = Namespace::new("dataset-a");
        let signed = ns.sign("ent-1");
        assert!(signed.starts_with("ent-1."));
        assert!(ns.verify(&signed));
        assert!(!Namespace::new("dataset-b").verify(&signed));
        assert!(!ns.verify("ent-1"));
    }

    #[test]
    fn signing_is_idempotent() {
        let ns = Namespace::new("dataset-a");
        let once = ns.sign("ent-1");
        assert_eq!(ns.sign(&once), once);
        assert_eq!(Namespace::strip(&once), "ent-1");
    }

    #[test]
    fn dotted_ids_are_not_mistaken_for_signatures() {
        assert_eq!(Namespace::parse("gb.coh.123"), ("gb.coh.123", None));
        let ns = Namespace::new("x");
        assert_eq!(Namespace::strip(&ns.sign("gb.coh.123")), "gb.coh.123");
    }

    #[test]
    fn empty_namespace_only_strips() {
        let signed = Namespace::new("a").sign("ent-1");
        let empty = Namespace::new("");
        assert_eq!(empty.sign(&signed), "ent-1");
        assert_eq!(empty.signature("ent-1"), None);
    }
}
