use crate::{query_builder, QueryDialect, SqlError};
use content_metadata::{ArticleState, AttributeType, FilterClause, FilterDefinition, FilterOperator};
use sql_connection::Value;

/// Compile a filter clause list into one predicate string, binding every
/// caller-supplied value as a parameter. Only column identifiers from
/// validated metadata are rendered as text. Clauses with null values are
/// skipped; an empty list compiles to a tautology so the WHERE clause shape
/// stays uniform.
pub(crate) fn compile_where(
    dialect: &dyn QueryDialect,
    params: &mut Vec<Value>,
    table_alias: &str,
    clauses: &[FilterClause],
    state: ArticleState,
) -> crate::Result<String> {
    let mut predicates = Vec::new();

    for clause in clauses {
        if clause.value.is_null() {
            continue;
        }

        predicates.push(compile_clause(dialect, params, table_alias, clause, state)?);
    }

    if predicates.is_empty() {
        Ok("1=1".to_string())
    } else {
        Ok(predicates.join(" and "))
    }
}

fn compile_clause(
    dialect: &dyn QueryDialect,
    params: &mut Vec<Value>,
    table_alias: &str,
    clause: &FilterClause,
    state: ArticleState,
) -> crate::Result<String> {
    match &clause.definition {
        FilterDefinition::Field {
            field_name,
            field_type,
            operator,
        } => compile_field_clause(
            dialect,
            params,
            table_alias,
            field_name,
            *field_type,
            *operator,
            &clause.value,
        ),
        FilterDefinition::ManyToMany {
            relation_id,
            is_backward,
            operator,
        } => compile_m2m_clause(
            dialect,
            params,
            table_alias,
            *relation_id,
            *is_backward,
            *operator,
            &clause.value,
            state,
        ),
    }
}

fn compile_field_clause(
    dialect: &dyn QueryDialect,
    params: &mut Vec<Value>,
    table_alias: &str,
    field_name: &str,
    field_type: AttributeType,
    operator: FilterOperator,
    value: &Value,
) -> crate::Result<String> {
    let mut column = format!("{table_alias}.{}", dialect.quote(field_name));

    if field_type == AttributeType::Time {
        column = dialect.cast_time(&column);
    }

    let sql_operator = match operator {
        FilterOperator::Equal => "=",
        FilterOperator::NotEqual => "<>",
        FilterOperator::GreaterThan => ">",
        FilterOperator::GreaterOrEqual => ">=",
        FilterOperator::LessThan => "<",
        FilterOperator::LessOrEqual => "<=",
        FilterOperator::Like => "like",
        FilterOperator::NotLike => "not like",
        FilterOperator::IsNull => {
            return Ok(match value.as_bool() {
                Some(false) => format!("({column} is not null)"),
                _ => format!("({column} is null)"),
            });
        }
        FilterOperator::In | FilterOperator::NotIn => {
            let ids = id_list(value, operator)?;
            let negation = if operator == FilterOperator::NotIn { "not " } else { "" };
            let subselect = query_builder::id_subselect(dialect, &ids, params);

            return Ok(format!("({column} {negation}in {subselect})"));
        }
        FilterOperator::Contains | FilterOperator::NotContains => {
            return Err(SqlError::invalid_argument(format!(
                "operator {operator:?} applies to relation filters only"
            )));
        }
    };

    let bound = bind_typed(field_type, operator, value)?;

    if matches!(operator, FilterOperator::Like | FilterOperator::NotLike) {
        // Case-insensitivity: lower both sides.
        let placeholder = dialect.bind(params, bound);

        Ok(format!("(lower({column}) {sql_operator} lower({placeholder}))"))
    } else {
        let placeholder = dialect.bind(params, bound);

        Ok(format!("({column} {sql_operator} {placeholder})"))
    }
}

#[allow(clippy::too_many_arguments)]
fn compile_m2m_clause(
    dialect: &dyn QueryDialect,
    params: &mut Vec<Value>,
    table_alias: &str,
    relation_id: i64,
    is_backward: bool,
    operator: FilterOperator,
    value: &Value,
    state: ArticleState,
) -> crate::Result<String> {
    let ids = id_list(value, operator)?;
    let link_table = query_builder::link_table(relation_id, state, is_backward);
    let subselect = query_builder::id_subselect(dialect, &ids, params);
    let negation = if operator == FilterOperator::NotContains { "not " } else { "" };

    Ok(format!(
        "({negation}exists (select 1 from {link_table} l where l.id = {table_alias}.content_item_id and l.linked_id in {subselect}))"
    ))
}

fn id_list(value: &Value, operator: FilterOperator) -> crate::Result<Vec<i64>> {
    match value {
        Value::Array(Some(values)) => Ok(values.iter().filter_map(|v| v.as_i64()).collect()),
        Value::Integer(Some(id)) => Ok(vec![*id]),
        _ => Err(SqlError::invalid_argument(format!(
            "operator {operator:?} requires an id list"
        ))),
    }
}

/// Coerce the caller value to the column's storage type. Booleans are
/// stored as 0/1 numerics.
fn bind_typed(
    field_type: AttributeType,
    operator: FilterOperator,
    value: &Value,
) -> crate::Result<Value> {
    let coerced = match field_type {
        AttributeType::Boolean => match value.as_bool() {
            Some(b) => Value::integer(i64::from(b)),
            None => value.clone(),
        },
        AttributeType::Relation => match value.as_i64() {
            Some(id) => Value::integer(id),
            None => value.clone(),
        },
        _ => value.clone(),
    };

    if matches!(operator, FilterOperator::Like | FilterOperator::NotLike) && coerced.as_str().is_none() {
        return Err(SqlError::invalid_argument("like filters require a string value"));
    }

    Ok(coerced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Mssql, Postgres};
    use content_metadata::FilterDefinition;
    use pretty_assertions::assert_eq;

    fn clause(field: &str, field_type: AttributeType, operator: FilterOperator, value: Value) -> FilterClause {
        FilterClause {
            definition: FilterDefinition::Field {
                field_name: field.into(),
                field_type,
                operator,
            },
            value,
        }
    }

    #[test]
    fn values_bind_as_parameters_never_as_text() {
        let mut params = Vec::new();
        let injection = "x' or '1'='1";

        let sql = compile_where(
            &Postgres,
            &mut params,
            "cid_1",
            &[clause("title", AttributeType::String, FilterOperator::Equal, Value::text(injection))],
            ArticleState::Live,
        )
        .unwrap();

        assert_eq!(sql, "(cid_1.\"title\" = $1::text)");
        assert_eq!(params, vec![Value::text(injection)]);
    }

    #[test]
    fn like_lowercases_both_sides() {
        let mut params = Vec::new();

        let sql = compile_where(
            &Postgres,
            &mut params,
            "cid_1",
            &[clause("title", AttributeType::String, FilterOperator::Like, Value::text("%News%"))],
            ArticleState::Live,
        )
        .unwrap();

        assert_eq!(sql, "(lower(cid_1.\"title\") like lower($1::text))");
    }

    #[test]
    fn null_valued_clauses_are_skipped() {
        let mut params = Vec::new();

        let sql = compile_where(
            &Postgres,
            &mut params,
            "cid_1",
            &[clause("title", AttributeType::String, FilterOperator::Equal, Value::Text(None))],
            ArticleState::Live,
        )
        .unwrap();

        assert_eq!(sql, "1=1");
        assert!(params.is_empty());
    }

    #[test]
    fn booleans_bind_as_zero_or_one() {
        let mut params = Vec::new();

        compile_where(
            &Postgres,
            &mut params,
            "cid_1",
            &[clause("visible", AttributeType::Boolean, FilterOperator::Equal, Value::boolean(true))],
            ArticleState::Live,
        )
        .unwrap();

        assert_eq!(params, vec![Value::integer(1)]);
    }

    #[test]
    fn time_columns_compare_through_a_cast() {
        let mut params = Vec::new();

        let sql = compile_where(
            &Postgres,
            &mut params,
            "cid_1",
            &[clause(
                "airs_at",
                AttributeType::Time,
                FilterOperator::GreaterOrEqual,
                Value::time(chrono::NaiveTime::from_hms_opt(10, 0, 0).unwrap()),
            )],
            ArticleState::Live,
        )
        .unwrap();

        assert_eq!(sql, "(cid_1.\"airs_at\"::time >= $1::time)");
    }

    #[test]
    fn in_filter_uses_the_id_set_mechanism() {
        let mut params = Vec::new();

        let sql = compile_where(
            &Postgres,
            &mut params,
            "cid_1",
            &[clause(
                "author",
                AttributeType::Relation,
                FilterOperator::In,
                Value::id_array([3, 4]),
            )],
            ArticleState::Live,
        )
        .unwrap();

        assert_eq!(sql, "(cid_1.\"author\" in (select id from unnest($1::int8[]) i(id)))");
        assert_eq!(params, vec![Value::id_array([3, 4])]);
    }

    #[test]
    fn m2m_contains_compiles_to_an_exists_probe() {
        let mut params = Vec::new();
        let clause = FilterClause {
            definition: FilterDefinition::ManyToMany {
                relation_id: 9,
                is_backward: false,
                operator: FilterOperator::Contains,
            },
            value: Value::id_array([5]),
        };

        let sql = compile_where(&Mssql, &mut params, "cid_1", &[clause], ArticleState::Stage).unwrap();

        assert_eq!(
            sql,
            "(exists (select 1 from item_link_9_united l where l.id = cid_1.content_item_id \
             and l.linked_id in (select id from (values (@P1)) i(id))))"
        );
    }

    #[test]
    fn clauses_join_with_and() {
        let mut params = Vec::new();

        let sql = compile_where(
            &Postgres,
            &mut params,
            "cid_1",
            &[
                clause("title", AttributeType::String, FilterOperator::Like, Value::text("%a%")),
                clause("rating", AttributeType::Numeric, FilterOperator::GreaterThan, Value::integer(3)),
            ],
            ArticleState::Live,
        )
        .unwrap();

        assert_eq!(
            sql,
            "(lower(cid_1.\"title\") like lower($1::text)) and (cid_1.\"rating\" > $2::int8)"
        );
    }
}
