use crate::QueryDialect;
use content_metadata::{system_fields, ArticleState, RootContext};

/// Physical content table name for a state variant.
pub(crate) fn content_table(content_type_id: i64, state: ArticleState) -> String {
    format!("content_{content_type_id}_{}", state.as_str())
}

/// Physical link table name for a relation; stage reads the united view and
/// backward relations read the reversed one.
pub(crate) fn link_table(relation_id: i64, state: ArticleState, is_backward: bool) -> String {
    let backward = if is_backward { "_rev" } else { "" };

    match state {
        ArticleState::Live => format!("item_link_{relation_id}{backward}"),
        ArticleState::Stage => format!("item_link_{relation_id}_united{backward}"),
    }
}

/// The SELECT list for a root context: system columns off the base table,
/// the classifier, and every context field aliased to its query alias so
/// that no two columns collide across the joined extension tables.
pub(crate) fn field_list(dialect: &dyn QueryDialect, context: &RootContext) -> String {
    let table_alias = context.table_alias();
    let mut columns = Vec::new();

    for system in system_fields::ALL {
        columns.push(format!("{table_alias}.{}", system.db_name));
    }

    if let Some(classifier) = &context.classifier {
        columns.push(format!(
            "{table_alias}.{} as {}",
            dialect.quote(&classifier.alias),
            dialect.quote(&classifier.query_alias()),
        ));
    }

    for field in &context.fields {
        columns.push(format!(
            "{table_alias}.{} as {}",
            dialect.quote(&field.alias),
            dialect.quote(&field.query_alias()),
        ));
    }

    for extension in &context.extensions {
        let extension_alias = extension.table_alias();

        for field in &extension.fields {
            columns.push(format!(
                "{extension_alias}.{} as {}",
                dialect.quote(&field.alias),
                dialect.quote(&field.query_alias()),
            ));
        }
    }

    columns.join(", ")
}

/// The FROM clause for a root context: the content table plus a LEFT JOIN
/// per extension on its reference-to-base column.
pub(crate) fn from_clause(
    dialect: &dyn QueryDialect,
    context: &RootContext,
    state: ArticleState,
) -> String {
    format!(
        "{} {}{}",
        content_table(context.content_type_id, state),
        context.table_alias(),
        extension_joins(dialect, context, state),
    )
}

/// The LEFT JOINs bringing the extension tables into a select; empty for
/// types without extensions.
pub(crate) fn extension_joins(
    dialect: &dyn QueryDialect,
    context: &RootContext,
    state: ArticleState,
) -> String {
    let table_alias = context.table_alias();
    let mut joins = String::new();

    for extension in &context.extensions {
        let extension_alias = extension.table_alias();

        joins.push_str(&format!(
            " left join {} {extension_alias} on {extension_alias}.{} = {table_alias}.{}",
            content_table(extension.content_type_id, state),
            dialect.quote(&extension.reference_to_base),
            system_fields::ID.db_name,
        ));
    }

    joins
}

/// Renders `(select id from <id set>)` for IN predicates.
pub(crate) fn id_subselect(
    dialect: &dyn QueryDialect,
    ids: &[i64],
    params: &mut Vec<sql_connection::Value>,
) -> String {
    format!("(select id from {})", dialect.id_set_table(ids, "i", params))
}
