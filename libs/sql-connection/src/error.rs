use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("error querying the database: {0}")]
    QueryError(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("error opening a database connection: {0}")]
    ConnectionError(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("could not convert value in column {column}: {message}")]
    ConversionError { column: String, message: String },

    #[error("column {0} not found in result set")]
    ColumnNotFound(String),
}

impl Error {
    pub fn conversion(column: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ConversionError {
            column: column.into(),
            message: message.into(),
        }
    }
}

#[cfg(feature = "postgresql-native")]
impl From<tokio_postgres::Error> for Error {
    fn from(e: tokio_postgres::Error) -> Self {
        Error::QueryError(Box::new(e))
    }
}

#[cfg(feature = "mssql-native")]
impl From<tiberius::error::Error> for Error {
    fn from(e: tiberius::error::Error) -> Self {
        Error::QueryError(Box::new(e))
    }
}
