use content_metadata::{system_fields, Article, RootContext};
use sql_connection::{ResultRow, ResultSet, Value};

/// Map a result set into articles: system columns are lifted onto the
/// article, everything else lands in the field bag keyed by lower-cased
/// column alias. Rows without a positive id are discarded.
pub(crate) fn parse_articles(result: ResultSet, context: &RootContext) -> Vec<Article> {
    let classifier_alias = classifier_alias(context);
    let mut articles = Vec::with_capacity(result.len());

    for row in result {
        if let Some(article) = parse_article(&row, context, classifier_alias.as_deref()) {
            articles.push(article);
        }
    }

    articles
}

pub(crate) fn classifier_alias(context: &RootContext) -> Option<String> {
    context.classifier.as_ref().map(|c| c.query_alias())
}

pub(crate) fn parse_article(
    row: &ResultRow,
    context: &RootContext,
    classifier_alias: Option<&str>,
) -> Option<Article> {
    let mut article = Article::new(context.content_type_id);

    for (column, value) in row.columns().iter().zip(row.values()) {
        let column = column.to_lowercase();

        match column.as_str() {
            c if c == system_fields::ID.db_name => {
                article.id = value.as_i64().unwrap_or(0);
            }
            c if c == system_fields::STATUS_TYPE_ID.db_name => {
                article.status_type_id = value.as_i64();
            }
            c if c == system_fields::CREATED.db_name => {
                article.created = as_datetime(value);
            }
            c if c == system_fields::MODIFIED.db_name => {
                article.modified = as_datetime(value);
            }
            c if c == system_fields::LAST_MODIFIED_BY.db_name => {
                article.last_modified_by = value.as_i64();
            }
            _ => {
                article.fields.insert(column, value.clone());
            }
        }
    }

    if let Some(classifier_alias) = classifier_alias {
        article.extension_content_id = article.field(classifier_alias).and_then(|v| v.as_i64()).filter(|id| *id > 0);
    }

    (article.id > 0).then_some(article)
}

fn as_datetime(value: &Value) -> Option<chrono::DateTime<chrono::Utc>> {
    match value {
        Value::DateTime(dt) => *dt,
        Value::Date(Some(date)) => date
            .and_hms_opt(0, 0, 0)
            .map(|dt| chrono::DateTime::from_naive_utc_and_offset(dt, chrono::Utc)),
        _ => None,
    }
}

/// Split the aggregated, comma-delimited parent-id column of an M2M lookup.
pub(crate) fn parse_id_list(value: &Value) -> Vec<i64> {
    match value {
        Value::Text(Some(ids)) => ids
            .split(',')
            .filter_map(|id| id.trim().parse::<i64>().ok())
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::test_helpers::article_context;

    #[test]
    fn system_columns_are_lifted_and_fields_are_bagged() {
        let result = ResultSet::new(
            vec!["content_item_id".into(), "status_type_id".into(), "cid_1_title".into()],
            vec![vec![Value::integer(7), Value::integer(140), Value::text("hello")]],
        );

        let articles = parse_articles(result, &article_context());

        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].id, 7);
        assert_eq!(articles[0].status_type_id, Some(140));
        assert_eq!(articles[0].field("CID_1_TITLE"), Some(&Value::text("hello")));
    }

    #[test]
    fn rows_without_an_id_are_discarded() {
        let result = ResultSet::new(
            vec!["content_item_id".into()],
            vec![vec![Value::Integer(None)], vec![Value::integer(3)]],
        );

        assert_eq!(parse_articles(result, &article_context()).len(), 1);
    }

    #[test]
    fn aggregated_id_lists_split_and_trim() {
        assert_eq!(parse_id_list(&Value::text("1, 2,3")), vec![1, 2, 3]);
        assert_eq!(parse_id_list(&Value::Text(None)), Vec::<i64>::new());
    }
}
