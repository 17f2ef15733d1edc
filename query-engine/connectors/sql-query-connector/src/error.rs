use thiserror::Error;

#[derive(Debug, Error)]
pub enum SqlError {
    #[error(transparent)]
    Connection(#[from] sql_connection::Error),

    /// Invalid caller-supplied query arguments (pagination counts,
    /// cursors). Surfaced to the caller before any SQL executes.
    #[error("{0}")]
    InvalidArgument(String),

    #[error("could not interpret row data: {0}")]
    Conversion(String),
}

impl SqlError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        SqlError::InvalidArgument(message.into())
    }
}
