//! Dossier schema model
//!
//! Schemas describe entity kinds (people, companies, vessels, ownerships)
//! as typed property slots with multiple inheritance. The [`Model`] is the
//! frozen catalog of all schemas; entities are built against it.
//!
//! ```text
//!   YAML definitions ──► ModelBuilder ──► Model (arena, read-only)
//!                                           │
//!                          ┌────────────────┼──────────────────┐
//!                          ▼                ▼                  ▼
//!                    EntityProxy     common_schema      descriptors
//!                   (flat values)    (narrowing)        (serde)
//! ```
//!
//! Entities hold `&Model`, so they cannot outlive the catalog they were
//! validated against.

mod build;
pub mod definition;
pub mod error;
pub mod helpers;
pub mod ids;
pub mod model;
pub mod namespace;
pub mod property;
pub mod proxy;
pub mod schema;
pub mod view;

pub use build::RESERVED_PROPERTIES;
pub use definition::{Definitions, PropertySpec, SchemaSpec};
pub use error::{DataError, ModelError};
pub use ids::make_id;
pub use model::{Model, ModelDescriptor, DEFAULT_SCHEMA_YAML};
pub use namespace::Namespace;
pub use property::{Property, PropertyDescriptor, PropertyId, PropertyRef};
pub use proxy::{AddOptions, EntityData, EntityProxy};
pub use schema::{Edge, Schema, SchemaDescriptor, SchemaId};
pub use view::EntityView;

/// Property that records ids an entity was merged from.
pub const SAME_AS: &str = "sameAs";
