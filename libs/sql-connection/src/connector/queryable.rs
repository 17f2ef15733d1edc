use crate::{ResultSet, Value};
use async_trait::async_trait;

/// A connection that can run parameterized SQL. Implemented by the native
/// driver connectors and by test doubles.
#[async_trait]
pub trait Queryable: Send + Sync {
    /// Execute the SQL, interpolating the given parameters, and return the
    /// resulting rows.
    async fn query_raw(&self, sql: &str, params: &[Value]) -> crate::Result<ResultSet>;

    /// Execute the SQL, interpolating the given parameters, and return the
    /// number of affected rows.
    async fn execute_raw(&self, sql: &str, params: &[Value]) -> crate::Result<u64>;
}
