//! Translates graph field resolution into parameterized SQL: point and
//! batched lookups, relation lookups, Relay cursor pagination and filter
//! compilation, rendered through one dialect contract with PostgreSQL and
//! SQL Server implementations.
#![deny(rust_2018_idioms, unsafe_code)]

mod articles_accessor;
mod cursor_condition;
mod dialect;
mod error;
mod filter;
mod metadata_accessor;
mod ordering;
mod query_builder;
mod row;

pub use articles_accessor::*;
pub use dialect::*;
pub use error::SqlError;
pub use metadata_accessor::*;

pub type Result<T> = std::result::Result<T, SqlError>;
