//! Dossier deduplication
//!
//! ```text
//!   entities ──► BlockingIndex ──► candidate pairs ──► compare() ──► Match*
//!                                                                      │
//!                        judgements (positive / negative / unsure) ────┤
//!                                                                      ▼
//!                                   Linker::from_matches ──► clusters ──► apply()
//! ```
//!
//! Scoring works on anything implementing `EntityView`, so flat proxies and
//! statement entities can be compared against each other.

pub mod blocking;
pub mod compare;
pub mod judgement;
pub mod linker;

pub use blocking::{blocking_keys, xref, BlockingIndex};
pub use compare::{compare, compare_names, compare_scores, CompareWeights, NAME_PENALTY};
pub use judgement::{Judgement, Match};
pub use linker::{Cluster, Linker, CLUSTER_PREFIX};
