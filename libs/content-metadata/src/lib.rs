//! The in-memory representation of the content catalog: content types,
//! attributes, sites and their derived lookups, plus the validation pass
//! that turns raw catalog rows into a schema-safe catalog and the query
//! context derivation consumed by the SQL builders.
#![deny(rust_2018_idioms, unsafe_code)]

mod article;
mod content_type;
mod context;
mod error;
mod filter;
mod order;
mod pagination;
mod site;
mod validate;

pub mod system_fields;

pub use article::*;
pub use content_type::*;
pub use context::*;
pub use error::*;
pub use filter::*;
pub use order::*;
pub use pagination::*;
pub use site::*;
pub use validate::validate;

use std::collections::BTreeMap;

/// The validated catalog, keyed by content-type id. A BTreeMap keeps
/// iteration in ascending id order, which makes alias deduplication
/// deterministic across runs.
pub type ContentCatalog = BTreeMap<i64, ContentType>;
