use crate::QueryDialect;
use content_metadata::{system_fields, OrderByToken, RootContext};
use itertools::Itertools;

/// Append the row identifier as a forced final sort key. Cursor pagination
/// needs a total order for stable cursors; ties on the caller's sort
/// columns would otherwise make pages overlap.
pub(crate) fn prepare_order_by(mut order_by: Vec<OrderByToken>) -> Vec<OrderByToken> {
    if !order_by.iter().any(|t| t.column == system_fields::ID.db_name) {
        order_by.push(OrderByToken::asc(system_fields::ID.db_name));
    }

    order_by
}

/// Render an ORDER BY list against the root table alias. `reverse` flips
/// every direction for backward paging.
pub(crate) fn render_order_by(
    dialect: &dyn QueryDialect,
    table_alias: &str,
    order_by: &[OrderByToken],
    reverse: bool,
) -> String {
    order_by
        .iter()
        .map(|token| {
            let direction = if token.descending ^ reverse { "desc" } else { "asc" };

            format!("{table_alias}.{} {direction}", dialect.quote(&token.column))
        })
        .join(", ")
}

/// Render an ORDER BY referencing the aliased output columns of a wrapped
/// sub-select (backward pages are re-sorted into forward order outside the
/// limited query).
pub(crate) fn render_order_by_aliased(
    dialect: &dyn QueryDialect,
    context: &RootContext,
    order_by: &[OrderByToken],
    reverse: bool,
) -> String {
    order_by
        .iter()
        .map(|token| {
            let direction = if token.descending ^ reverse { "desc" } else { "asc" };
            let column = if system_fields::ALL.iter().any(|s| s.db_name == token.column) {
                token.column.clone()
            } else {
                dialect.quote(&format!(
                    "cid_{}_{}",
                    context.content_type_id,
                    token.column.to_lowercase()
                ))
            };

            format!("{column} {direction}")
        })
        .join(", ")
}
