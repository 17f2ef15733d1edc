//! The generated query schema: a type arena built from validated content
//! metadata, resolved through variant dispatch instead of runtime type
//! synthesis. Type shells are allocated in a first pass and fields are
//! wired in a second pass, so self-referential and forward-referencing
//! relation fields need no mutable registries.
#![deny(rust_2018_idioms, unsafe_code)]

mod build;
mod enum_type;
mod identifier;
mod input_types;
mod output_types;
mod query_schema;

pub use build::build;
pub use enum_type::*;
pub use identifier::*;
pub use input_types::*;
pub use output_types::*;
pub use query_schema::*;

use std::sync::Arc;

pub type QuerySchemaRef = Arc<QuerySchema>;

/// Index of an object type in the schema's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectTypeId(pub(crate) usize);

/// Index of an enum type in the schema's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnumTypeId(pub(crate) usize);

/// Index of an input object type in the schema's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InputObjectTypeId(pub(crate) usize);

#[derive(Debug, thiserror::Error)]
pub enum SchemaBuildError {
    #[error("invalid relation metadata: {0}")]
    Metadata(#[from] content_metadata::MetadataError),
}
