//! Identity clusters and reference rewriting.
//!
//! The linker is a union-find over entity ids: `add(a, b)` merges the
//! clusters holding `a` and `b` (the smaller one is absorbed). Each cluster
//! derives its canonical id from its sorted members, so the id does not
//! depend on the order merges happened in.

use std::cell::OnceCell;
use std::collections::{BTreeSet, HashMap, HashSet};

use dossier_model::{make_id, AddOptions, EntityProxy, SAME_AS};

use crate::judgement::{Judgement, Match};

/// Prefix of derived cluster ids.
pub const CLUSTER_PREFIX: &str = "NK-";

/// A set of entity ids judged to describe the same thing.
#[derive(Debug, Clone, Default)]
pub struct Cluster {
    members: BTreeSet<String>,
    id: OnceCell<String>,
}

impl Cluster {
    pub fn new<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            members: members.into_iter().map(Into::into).collect(),
            id: OnceCell::new(),
        }
    }

    /// Hash of the sorted members, computed once per membership.
    pub fn id(&self) -> &str {
        self.id.get_or_init(|| {
            let digest = make_id(None, &self.members).unwrap_or_default();
            format!("{CLUSTER_PREFIX}{digest}")
        })
    }

    pub fn members(&self) -> &BTreeSet<String> {
        &self.members
    }

    pub fn contains(&self, id: &str) -> bool {
        self.members.contains(id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn add(&mut self, id: impl Into<String>) -> bool {
        let added = self.members.insert(id.into());
        if added {
            self.id.take();
        }
        added
    }

    /// Take over every member of `other`.
    pub fn absorb(&mut self, other: Cluster) {
        self.members.extend(other.members);
        self.id.take();
    }
}

impl PartialEq for Cluster {
    fn eq(&self, other: &Self) -> bool {
        self.members == other.members
    }
}

impl Eq for Cluster {}

#[derive(Debug, Clone, Default)]
pub struct Linker {
    slots: Vec<Option<Cluster>>,
    // Slots emptied by `union`, reused before the vector grows.
    free: Vec<usize>,
    index: HashMap<String, usize>,
}

impl Linker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `subject` and `canonical` to be the same entity. Returns
    /// whether any cluster changed; equal or empty ids are ignored.
    pub fn add(&mut self, subject: &str, canonical: &str) -> bool {
        if subject.is_empty() || canonical.is_empty() || subject == canonical {
            return false;
        }
        let left = self.index.get(subject).copied();
        let right = self.index.get(canonical).copied();
        match (left, right) {
            (Some(l), Some(r)) if l == r => false,
            (Some(l), Some(r)) => {
                self.union(l, r);
                true
            }
            (Some(slot), None) => self.insert(slot, canonical),
            (None, Some(slot)) => self.insert(slot, subject),
            (None, None) => {
                let slot = self.allocate(Cluster::new([subject, canonical]));
                self.index.insert(subject.to_string(), slot);
                self.index.insert(canonical.to_string(), slot);
                true
            }
        }
    }

    fn allocate(&mut self, cluster: Cluster) -> usize {
        match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(cluster);
                slot
            }
            None => {
                self.slots.push(Some(cluster));
                self.slots.len() - 1
            }
        }
    }

    fn insert(&mut self, slot: usize, id: &str) -> bool {
        let Some(cluster) = self.slots.get_mut(slot).and_then(Option::as_mut) else {
            return false;
        };
        cluster.add(id);
        self.index.insert(id.to_string(), slot);
        true
    }

    fn union(&mut self, a: usize, b: usize) {
        let size = |slot: usize| self.slots.get(slot).and_then(Option::as_ref).map_or(0, Cluster::len);
        let (keep, absorb) = if size(a) >= size(b) { (a, b) } else { (b, a) };
        let Some(absorbed) = self.slots.get_mut(absorb).and_then(Option::take) else {
            return;
        };
        self.free.push(absorb);
        for member in absorbed.members() {
            self.index.insert(member.clone(), keep);
        }
        if let Some(cluster) = self.slots.get_mut(keep).and_then(Option::as_mut) {
            cluster.absorb(absorbed);
        }
    }

    pub fn get_cluster(&self, id: &str) -> Option<&Cluster> {
        let slot = *self.index.get(id)?;
        self.slots.get(slot)?.as_ref()
    }

    /// The canonical id for `id`: its cluster id, or `id` itself when it is
    /// not clustered.
    pub fn resolve<'a>(&'a self, id: &'a str) -> &'a str {
        self.get_cluster(id).map_or(id, Cluster::id)
    }

    pub fn clusters(&self) -> impl Iterator<Item = &Cluster> + '_ {
        self.slots.iter().flatten()
    }

    /// Every id known to be the same as `id`, including `id`.
    pub fn connected<'a>(&'a self, id: &'a str) -> BTreeSet<&'a str> {
        match self.get_cluster(id) {
            Some(cluster) => cluster.members().iter().map(String::as_str).collect(),
            None => BTreeSet::from([id]),
        }
    }

    /// Number of clusters.
    pub fn len(&self) -> usize {
        self.clusters().count()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Point an entity and its references at canonical ids.
    ///
    /// Existing `sameAs` values are kept as they are. Every id that was
    /// rewritten, the entity's own included, is added to `sameAs` when the
    /// schema has that property.
    pub fn apply(&self, proxy: &mut EntityProxy<'_>) {
        let mut replaced: BTreeSet<String> = BTreeSet::new();
        if let Some(id) = proxy.id().map(str::to_string) {
            let canonical = self.resolve(&id);
            if canonical != id {
                proxy.set_id(Some(canonical.to_string()));
                replaced.insert(id);
            }
        }
        let same_as = proxy.schema().get(SAME_AS);
        let kept = match same_as {
            Some(prop) => proxy.pop(prop).unwrap_or_default(),
            None => Vec::new(),
        };
        proxy.rewrite_entity_values(|_, value| {
            let canonical = self.resolve(value);
            if canonical != value {
                replaced.insert(value.to_string());
            }
            canonical.to_string()
        });
        let Some(prop) = same_as else {
            return;
        };
        let own = proxy.id().map(str::to_string);
        for value in kept.iter().chain(replaced.iter()) {
            if own.as_deref() != Some(value.as_str()) {
                proxy.unsafe_add(prop, value, AddOptions::cleaned());
            }
        }
    }

    /// Cluster the ids of positive matches and of undecided matches scoring
    /// at least `threshold`.
    ///
    /// Positive judgements are applied first, then scored matches from the
    /// highest score down. A merge is skipped when a negative judgement
    /// exists between any members of the two clusters.
    pub fn from_matches<'a, I>(matches: I, threshold: f64) -> Self
    where
        I: IntoIterator<Item = &'a Match>,
    {
        let mut negatives: HashSet<(String, String)> = HashSet::new();
        let mut accepted: Vec<&Match> = Vec::new();
        for m in matches {
            match m.judgement {
                Judgement::Negative => {
                    let (l, r) = m.key();
                    negatives.insert((l.to_string(), r.to_string()));
                }
                Judgement::Positive => accepted.push(m),
                Judgement::NoJudgement if m.score >= threshold => accepted.push(m),
                _ => {}
            }
        }
        accepted.sort_by(|a, b| {
            (a.judgement != Judgement::Positive)
                .cmp(&(b.judgement != Judgement::Positive))
                .then_with(|| b.score.total_cmp(&a.score))
        });

        let mut linker = Linker::new();
        for m in accepted {
            if linker.blocked(&m.left, &m.right, &negatives) {
                tracing::debug!(left = %m.left, right = %m.right, "merge blocked by negative judgement");
                continue;
            }
            linker.add(&m.left, &m.right);
        }
        linker
    }

    fn blocked(&self, left: &str, right: &str, negatives: &HashSet<(String, String)>) -> bool {
        if negatives.is_empty() {
            return false;
        }
        let right_ids = self.connected(right);
        self.connected(left).into_iter().any(|l| {
            right_ids.iter().any(|r| {
                let key = if l <= *r { (l, *r) } else { (*r, l) };
                negatives.contains(&(key.0.to_string(), key.1.to_string()))
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cluster_id_follows_membership() {
        let mut cluster = Cluster::new(["b", "a"]);
        let first = cluster.id().to_string();
        assert!(first.starts_with(CLUSTER_PREFIX));
        assert_eq!(Cluster::new(["a", "b"]).id(), first);
        assert!(!cluster.add("a"));
        assert_eq!(cluster.id(), first);
        assert!(cluster.add("c"));
        assert_ne!(cluster.id(), first);
    }

    #[test]
    fn add_ignores_degenerate_pairs() {
        let mut linker = Linker::new();
        assert!(!linker.add("a", "a"));
        assert!(!linker.add("", "a"));
        assert!(linker.is_empty());
        assert!(linker.add("a", "b"));
        assert!(!linker.add("b", "a"));
        assert_eq!(linker.len(), 1);
    }

    #[test]
    fn union_absorbs_into_the_larger_cluster() {
        let mut linker = Linker::new();
        linker.add("a", "b");
        linker.add("b", "c");
        linker.add("x", "y");
        assert_eq!(linker.len(), 2);
        linker.add("y", "c");
        assert_eq!(linker.len(), 1);
        let ids: Vec<&str> = linker.connected("x").into_iter().collect();
        assert_eq!(ids, ["a", "b", "c", "x", "y"]);
        assert_eq!(linker.resolve("a"), linker.resolve("y"));
    }

    #[test]
    fn absorbed_slots_are_reused() {
        let mut linker = Linker::new();
        linker.add("hub", "n0");
        for i in 0..50 {
            linker.add(&format!("a{i}"), &format!("b{i}"));
            linker.add(&format!("b{i}"), "hub");
        }
        assert_eq!(linker.len(), 1);
        assert!(linker.slots.len() <= 2, "{} slots", linker.slots.len());
        assert_eq!(linker.connected("a49").len(), 102);
    }

    #[test]
    fn unknown_ids_resolve_to_themselves() {
        let linker = Linker::new();
        assert_eq!(linker.resolve("solo"), "solo");
        assert_eq!(linker.connected("solo").len(), 1);
    }
}
