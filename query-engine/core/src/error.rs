use schema::SchemaBuildError;
use sql_query_connector::SqlError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Invalid caller input: unknown fields, malformed pagination
    /// arguments, bad cursors. No partial execution happens.
    #[error("{0}")]
    ArgumentError(String),

    /// A schema generation failed to build; the previous generation stays
    /// active.
    #[error(transparent)]
    SchemaBuild(#[from] SchemaBuildError),

    /// SQL or connection failure during execution.
    #[error("error during query execution: {0}")]
    Connector(#[source] SqlError),
}

impl CoreError {
    pub fn argument(message: impl Into<String>) -> Self {
        CoreError::ArgumentError(message.into())
    }
}

impl From<SqlError> for CoreError {
    fn from(e: SqlError) -> Self {
        match e {
            SqlError::InvalidArgument(message) => CoreError::ArgumentError(message),
            other => CoreError::Connector(other),
        }
    }
}

/// One entry of the response's `errors` list.
#[derive(Debug, Clone, serde::Serialize)]
pub struct GraphqlError {
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<String>,
}

impl GraphqlError {
    pub fn new(message: impl Into<String>, path: Vec<String>) -> Self {
        GraphqlError {
            message: message.into(),
            path,
        }
    }
}

impl From<&CoreError> for GraphqlError {
    fn from(e: &CoreError) -> Self {
        GraphqlError::new(e.to_string(), vec![])
    }
}
