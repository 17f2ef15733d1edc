use crate::{query_builder, QueryDialect};
use content_metadata::{system_fields, ArticleState, OrderByToken};
use sql_connection::Value;

/// Build the keyset predicate for cursor pagination.
///
/// The cursor is the row id; the order list (id always last) is walked in
/// reverse, nesting `(col > cursor_col) OR (col = cursor_col AND …)` so the
/// page starts strictly after the cursor row under the active total order.
/// Comparison direction flips for descending tokens and when paging
/// backward. Order column values of the cursor row are read through
/// correlated sub-selects against the content table, so the predicate works
/// off nothing but the row id.
pub(crate) fn build(
    dialect: &dyn QueryDialect,
    params: &mut Vec<Value>,
    content_type_id: i64,
    table_alias: &str,
    order_by: &[OrderByToken],
    cursor_id: i64,
    reverse: bool,
    state: ArticleState,
) -> String {
    let content_table = query_builder::content_table(content_type_id, state);
    let id_column = system_fields::ID.db_name;

    let id_comparison = if reverse { "<" } else { ">" };
    let cursor = dialect.bind(params, Value::integer(cursor_id));
    let mut predicate = format!("({table_alias}.{id_column} {id_comparison} {cursor})");

    for token in order_by.iter().rev() {
        if token.column == id_column {
            continue;
        }

        let column = format!("{table_alias}.{}", dialect.quote(&token.column));
        let ascending = !token.descending;
        let comparison = if ascending ^ reverse { ">" } else { "<" };

        let cursor = dialect.bind(params, Value::integer(cursor_id));
        let cursor_value = format!(
            "(select {} from {content_table} where {id_column} = {cursor})",
            dialect.quote(&token.column),
        );

        predicate = format!(
            "({column} {comparison} {cursor_value} or ({column} = {cursor_value} and {predicate}))"
        );
    }

    predicate
}
