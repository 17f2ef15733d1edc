use super::QueryDialect;
use itertools::Itertools;
use sql_connection::{SqlFamily, Value};

/// SQL generation for the SQL Server backend: `@Pn` placeholders, bracket
/// quoting, `TOP` / `OFFSET … FETCH` and id sets expanded into a `VALUES`
/// row constructor (tiberius cannot bind table-valued parameters).
#[derive(Debug, Default)]
pub struct Mssql;

impl QueryDialect for Mssql {
    fn family(&self) -> SqlFamily {
        SqlFamily::Mssql
    }

    fn quote(&self, identifier: &str) -> String {
        format!("[{identifier}]")
    }

    fn placeholder(&self, index: usize, _value: &Value) -> String {
        format!("@P{index}")
    }

    fn id_set_table(&self, ids: &[i64], alias: &str, params: &mut Vec<Value>) -> String {
        if ids.is_empty() {
            // A VALUES constructor cannot be empty; an id set that matches
            // nothing keeps the shape intact.
            return format!("(select id = NULL where 1=0) {alias}");
        }

        let rows = ids
            .iter()
            .map(|id| format!("({})", self.bind(params, Value::integer(*id))))
            .join(", ");

        format!("(values {rows}) {alias}(id)")
    }

    fn aggregate_ids(&self) -> String {
        "STRING_AGG(CONVERT(varchar(max), id), ',')".to_string()
    }

    fn cast_time(&self, expression: &str) -> String {
        format!("CONVERT(time, {expression})")
    }

    fn limited_select(
        &self,
        fields: &str,
        from: &str,
        where_clause: &str,
        order_by: &str,
        count: i64,
    ) -> String {
        format!("select top({count}) {fields} from {from} where {where_clause} order by {order_by}")
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
            "select {fields} from {from} where {where_clause} order by {order_by} offset {skip} rows fetch next {take} rows only"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_sets_expand_into_a_values_constructor() {
        let dialect = Mssql;
        let mut params = Vec::new();

        let table = dialect.id_set_table(&[7, 8], "i", &mut params);

        assert_eq!(table, "(values (@P1), (@P2)) i(id)");
        assert_eq!(params, vec![Value::integer(7), Value::integer(8)]);
    }

    #[test]
    fn empty_id_set_matches_nothing() {
        let mut params = Vec::new();
        let table = Mssql.id_set_table(&[], "i", &mut params);

        assert_eq!(table, "(select id = NULL where 1=0) i");
        assert!(params.is_empty());
    }

    #[test]
    fn top_and_fetch_render_sql_server_style() {
        assert_eq!(
            Mssql.limited_select("*", "content_1_live cid_1", "1=1", "cid_1.content_item_id asc", 3),
            "select top(3) * from content_1_live cid_1 where 1=1 order by cid_1.content_item_id asc"
        );

        assert_eq!(
            Mssql.take_skip_select("*", "content_1_live cid_1", "1=1", "cid_1.content_item_id asc", 10, 20),
            "select * from content_1_live cid_1 where 1=1 order by cid_1.content_item_id asc offset 20 rows fetch next 10 rows only"
        );
    }

    #[test]
    fn identifiers_are_bracket_quoted() {
        assert_eq!(Mssql.quote("Title"), "[Title]");
    }
}
