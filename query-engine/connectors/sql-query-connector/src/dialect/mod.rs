mod mssql;
mod postgresql;

pub use mssql::Mssql;
pub use postgresql::Postgres;

use sql_connection::{SqlFamily, Value};

/// Backend-specific SQL syntax behind one contract: identifier quoting,
/// parameter substitution, limit/offset shapes, id-set table expressions
/// and the many-to-many id aggregation. Everything else the builders
/// render identically for both backends.
pub trait QueryDialect: Send + Sync {
    fn family(&self) -> SqlFamily;

    /// Quote an identifier coming from validated metadata.
    fn quote(&self, identifier: &str) -> String;

    /// Placeholder for the 1-based `index` parameter holding `value`.
    fn placeholder(&self, index: usize, value: &Value) -> String;

    /// Render an id set as a table expression exposing one `id` column,
    /// pushing the necessary parameters.
    fn id_set_table(&self, ids: &[i64], alias: &str, params: &mut Vec<Value>) -> String;

    /// Aggregation expression turning the grouped link-table ids into one
    /// delimited string.
    fn aggregate_ids(&self) -> String;

    /// Cast a column expression to a time-of-day for comparison.
    fn cast_time(&self, expression: &str) -> String;

    /// A SELECT returning at most `count` rows.
    fn limited_select(
        &self,
        fields: &str,
        from: &str,
        where_clause: &str,
        order_by: &str,
        count: i64,
    ) -> String;

    /// A SELECT skipping `skip` rows and returning at most `take`.
    fn take_skip_select(
        &self,
        fields: &str,
        from: &str,
        where_clause: &str,
        order_by: &str,
        take: i64,
        skip: i64,
    ) -> String;

    /// Bind a value, returning its placeholder.
    fn bind(&self, params: &mut Vec<Value>, value: Value) -> String {
        let placeholder = self.placeholder(params.len() + 1, &value);
        params.push(value);
        placeholder
    }
}

#[cfg(test)]
pub(crate) mod test_helpers {
    use content_metadata::{Attribute, AttributeType, ContentType, RootContext, Site};
    use std::sync::Arc;

    pub(crate) fn attribute(content_id: i64, alias: &str, type_name: AttributeType) -> Attribute {
        Attribute {
            id: content_id * 100,
            content_type_id: content_id,
            friendly_name: alias.to_string(),
            alias: alias.to_string(),
            schema_alias: alias.to_string(),
            type_name,
            indexed: false,
            required: false,
            related_o2m_content_id: None,
            related_m2m_content_id: None,
            m2m_relation_id: None,
            m2m_is_backward: None,
            related_m2o_content_id: None,
            m2o_backward_field: None,
            classifier_attribute_id: None,
            is_classifier: false,
            sub_folder: None,
            use_site_library: false,
        }
    }

    /// `Article{Title, Author}` context used across the SQL tests.
    pub(crate) fn article_context() -> RootContext {
        let content = ContentType {
            id: 1,
            friendly_name: "Article".into(),
            alias_singular: "Article".into(),
            alias_plural: "Articles".into(),
            description: None,
            site: Arc::new(Site::default()),
            attributes: vec![
                attribute(1, "title", AttributeType::String),
                attribute(1, "author", AttributeType::Relation),
            ],
            extensions: vec![],
        };

        content.root_context()
    }
}
