//! Dossier statements
//!
//! The statement form of an entity: every value is a [`Statement`] tagged
//! with the dataset that asserted it and when it was seen. A
//! [`StatementEntity`] assembles statements from many sources into one
//! canonical entity and can be flattened into an `EntityProxy` at any time.
//!
//! ```text
//!   source A ─┐                          ┌─► to_proxy() ─► EntityProxy
//!   source B ─┼─► Statement* ─► StatementEntity
//!   source C ─┘                          └─► statements() ─► json | csv | pack
//! ```

pub mod entity;
pub mod error;
pub mod formats;
pub mod statement;

pub use entity::{StatementEntity, ValueOptions, DEFAULT_DATASET};
pub use error::StatementError;
pub use formats::{
    read_csv, read_json, read_pack, read_statements, write_json, write_statements, CsvStatementWriter, Format,
};
pub use statement::{Statement, BASE};
