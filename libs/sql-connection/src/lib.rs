//! An abstraction layer over the SQL connections the engine executes
//! against. Provides the parameter/result value model, result sets and the
//! [`Queryable`] contract, plus native driver connectors behind the
//! `postgresql-native` and `mssql-native` features.
#![deny(rust_2018_idioms, unsafe_code)]

mod connector;
mod error;
mod result_set;
mod value;

pub use connector::*;
pub use error::*;
pub use result_set::*;
pub use value::*;

pub type Result<T> = std::result::Result<T, Error>;

/// The family of the connected database, deciding which SQL dialect the
/// query builders render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlFamily {
    Postgres,
    Mssql,
}

impl SqlFamily {
    pub fn as_str(self) -> &'static str {
        match self {
            SqlFamily::Postgres => "postgresql",
            SqlFamily::Mssql => "mssql",
        }
    }
}
