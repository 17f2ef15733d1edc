mod queryable;

#[cfg(feature = "mssql-native")]
pub mod mssql;
#[cfg(feature = "postgresql-native")]
pub mod postgres;

pub use queryable::*;

#[cfg(feature = "mssql-native")]
pub use mssql::Mssql;
#[cfg(feature = "postgresql-native")]
pub use postgres::PostgreSql;
