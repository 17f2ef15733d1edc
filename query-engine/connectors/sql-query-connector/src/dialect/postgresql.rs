use super::QueryDialect;
use sql_connection::{SqlFamily, Value};

/// SQL generation for the PostgreSQL backend: `$n` placeholders with
/// explicit type casts, double-quoted lower-cased identifiers, `LIMIT` /
/// `OFFSET` and array parameters unnested into id tables.
#[derive(Debug, Default)]
pub struct Postgres;

impl QueryDialect for Postgres {
    fn family(&self) -> SqlFamily {
        SqlFamily::Postgres
    }

    fn quote(&self, identifier: &str) -> String {
        format!("\"{}\"", identifier.to_lowercase())
    }

    /// The cast keeps prepared-statement parameter inference from fighting
    /// the bound value type.
    fn placeholder(&self, index: usize, value: &Value) -> String {
        let cast = match value {
            Value::Integer(_) => "int8",
            Value::Real(_) => "numeric",
            Value::Boolean(_) => "bool",
            Value::Text(_) => "text",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::DateTime(_) => "timestamp",
            Value::Array(_) => "int8[]",
        };

        format!("${index}::{cast}")
    }

    fn id_set_table(&self, ids: &[i64], alias: &str, params: &mut Vec<Value>) -> String {
        let placeholder = self.bind(params, Value::id_array(ids.iter().copied()));

        format!("unnest({placeholder}) {alias}(id)")
    }

    fn aggregate_ids(&self) -> String {
        "array_to_string(array_agg(id), ',')".to_string()
    }

    fn cast_time(&self, expression: &str) -> String {
        format!("{expression}::time")
    }

    fn limited_select(
        &self,
        fields: &str,
        from: &str,
        where_clause: &str,
        order_by: &str,
        count: i64,
    ) -> String {
        format!("select {fields} from {from} where {where_clause} order by {order_by} limit {count}")
    }

    fn take_skip_select(
        &self,
        fields: &str,
        from: &str,
        where_clause: &str,
        order_by: &str,
        take: i64,
        skip: i64,
    ) -> String {
        format!(
            "select {fields} from {from} where {where_clause} order by {order_by} limit {take} offset {skip}"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_carry_type_casts() {
        let dialect = Postgres;
        let mut params = Vec::new();

        assert_eq!(dialect.bind(&mut params, Value::integer(5)), "$1::int8");
        assert_eq!(dialect.bind(&mut params, Value::text("x")), "$2::text");
        assert_eq!(params, vec![Value::integer(5), Value::text("x")]);
    }

    #[test]
    fn id_sets_unnest_an_array_parameter() {
        let dialect = Postgres;
        let mut params = Vec::new();

        let table = dialect.id_set_table(&[1, 2, 3], "i", &mut params);

        assert_eq!(table, "unnest($1::int8[]) i(id)");
        assert_eq!(params, vec![Value::id_array([1, 2, 3])]);
    }

    #[test]
    fn identifiers_are_quoted_lowercase() {
        assert_eq!(Postgres.quote("Title"), "\"title\"");
    }

    #[test]
    fn limit_and_offset_render_postgres_style() {
        let sql = Postgres.take_skip_select("*", "content_1_live cid_1", "1=1", "cid_1.content_item_id asc", 10, 20);

        assert_eq!(
            sql,
            "select * from content_1_live cid_1 where 1=1 order by cid_1.content_item_id asc limit 10 offset 20"
        );
    }
}
