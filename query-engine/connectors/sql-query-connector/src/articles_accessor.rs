use crate::{cursor_condition, filter, ordering, query_builder, row, QueryDialect, SqlError};
use content_metadata::{
    system_fields, Article, ArticleState, FilterClause, OrderByToken, RelayPaginationArgs,
    RelayPaginationResult, RootContext,
};
use sql_connection::{Params, Queryable, ResultSet, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Connector-level settings.
#[derive(Debug, Clone, Default)]
pub struct AccessorSettings {
    /// Enables the extra existence probe that computes the far-side
    /// `hasPreviousPage`/`hasNextPage`. Off by default: the far side then
    /// reports `false` without a second round trip.
    pub calculate_paging_data: bool,
}

/// Executes the generated SQL for article lookups, relation batches and
/// cursor pagination against one request-scoped connection.
pub struct ArticlesAccessor {
    connection: Arc<dyn Queryable>,
    dialect: Arc<dyn QueryDialect>,
    settings: AccessorSettings,
}

impl ArticlesAccessor {
    pub fn new(
        connection: Arc<dyn Queryable>,
        dialect: Arc<dyn QueryDialect>,
        settings: AccessorSettings,
    ) -> Self {
        ArticlesAccessor {
            connection,
            dialect,
            settings,
        }
    }

    async fn query(&self, sql: &str, params: &[Value]) -> crate::Result<ResultSet> {
        tracing::debug!(query = %sql, params = %Params(params));

        Ok(self.connection.query_raw(sql, params).await?)
    }

    /// Point lookups batched by id set.
    pub async fn articles_by_id_list(
        &self,
        context: &RootContext,
        article_ids: &[i64],
        state: ArticleState,
    ) -> crate::Result<HashMap<i64, Article>> {
        if article_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let dialect = self.dialect.as_ref();
        let mut params = Vec::new();

        let sql = format!(
            "select {fields} from {from} where {table_alias}.{id} in {ids}",
            fields = query_builder::field_list(dialect, context),
            from = query_builder::from_clause(dialect, context, state),
            table_alias = context.table_alias(),
            id = system_fields::ID.db_name,
            ids = query_builder::id_subselect(dialect, article_ids, &mut params),
        );

        let result = self.query(&sql, &params).await?;

        Ok(row::parse_articles(result, context)
            .into_iter()
            .map(|article| (article.id, article))
            .collect())
    }

    /// Many-to-many lookup: group the link table by the far-side id,
    /// aggregate the near-side ids into one delimited string per group,
    /// join the content table and un-pivot the id list client-side.
    #[allow(clippy::too_many_arguments)]
    pub async fn related_m2m_articles_by_id_list(
        &self,
        context: &RootContext,
        parent_ids: &[i64],
        relation_id: i64,
        is_backward: bool,
        order_by: &[OrderByToken],
        where_clauses: &[FilterClause],
        state: ArticleState,
    ) -> crate::Result<HashMap<i64, Vec<Article>>> {
        if parent_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let dialect = self.dialect.as_ref();
        let table_alias = context.table_alias();
        let mut params = Vec::new();

        let ids = query_builder::id_subselect(dialect, parent_ids, &mut params);
        let where_clause = filter::compile_where(dialect, &mut params, &table_alias, where_clauses, state)?;
        let order_clause = if order_by.is_empty() {
            String::new()
        } else {
            format!(" order by {}", ordering::render_order_by(dialect, &table_alias, order_by, false))
        };

        let sql = format!(
            "select m2m.item_ids, {fields} from (select {aggregate} as item_ids, linked_id \
             from {link_table} where id in {ids} group by linked_id) m2m \
             join {content_table} {table_alias} on {table_alias}.{id} = m2m.linked_id{extension_joins} \
             where {where_clause}{order_clause}",
            fields = query_builder::field_list(dialect, context),
            aggregate = dialect.aggregate_ids(),
            link_table = query_builder::link_table(relation_id, state, is_backward),
            content_table = query_builder::content_table(context.content_type_id, state),
            id = system_fields::ID.db_name,
            extension_joins = query_builder::extension_joins(dialect, context, state),
        );

        let result = self.query(&sql, &params).await?;
        let classifier_alias = row::classifier_alias(context);
        let mut lookup: HashMap<i64, Vec<Article>> = HashMap::new();

        for result_row in result {
            let item_ids = result_row
                .get("item_ids")
                .map(row::parse_id_list)
                .unwrap_or_default();

            let Some(article) = row::parse_article(&result_row, context, classifier_alias.as_deref())
            else {
                continue;
            };

            for parent_id in item_ids {
                lookup.entry(parent_id).or_default().push(article.clone());
            }
        }

        Ok(lookup)
    }

    /// Many-to-one ("backward") lookup: the related table filtered by its
    /// own forward-reference column.
    #[allow(clippy::too_many_arguments)]
    pub async fn related_m2o_articles_by_id_list(
        &self,
        context: &RootContext,
        parent_ids: &[i64],
        backward_field: &str,
        order_by: &[OrderByToken],
        where_clauses: &[FilterClause],
        state: ArticleState,
    ) -> crate::Result<HashMap<i64, Vec<Article>>> {
        if parent_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let dialect = self.dialect.as_ref();
        let table_alias = context.table_alias();
        let mut params = Vec::new();

        let ids = query_builder::id_subselect(dialect, parent_ids, &mut params);
        let where_clause = filter::compile_where(dialect, &mut params, &table_alias, where_clauses, state)?;
        let order_clause = if order_by.is_empty() {
            String::new()
        } else {
            format!(" order by {}", ordering::render_order_by(dialect, &table_alias, order_by, false))
        };

        let sql = format!(
            "select {fields} from {from} where {table_alias}.{backward} in {ids} and {where_clause}{order_clause}",
            fields = query_builder::field_list(dialect, context),
            from = query_builder::from_clause(dialect, context, state),
            backward = dialect.quote(backward_field),
        );

        let result = self.query(&sql, &params).await?;
        let backward_alias = format!("cid_{}_{}", context.content_type_id, backward_field.to_lowercase());
        let mut lookup: HashMap<i64, Vec<Article>> = HashMap::new();

        for article in row::parse_articles(result, context) {
            let Some(parent_id) = article.field(&backward_alias).and_then(|v| v.as_i64()) else {
                continue;
            };

            if parent_id > 0 {
                lookup.entry(parent_id).or_default().push(article);
            }
        }

        Ok(lookup)
    }

    /// The root connection query: offset pagination with `skip`+`first`,
    /// cursor pagination with `first`/`after` or `last`/`before`, plain
    /// select otherwise. Fetches `count+1` rows in cursor mode to compute
    /// the near-side page flag, trims the extra row, and re-sorts backward
    /// pages into forward order.
    pub async fn paged_articles(
        &self,
        context: &RootContext,
        order_by: Vec<OrderByToken>,
        where_clauses: &[FilterClause],
        pagination: RelayPaginationArgs,
        calc_total_count: bool,
        state: ArticleState,
    ) -> crate::Result<RelayPaginationResult> {
        let dialect = self.dialect.as_ref();
        let table_alias = context.table_alias();
        let fields = query_builder::field_list(dialect, context);
        let from = query_builder::from_clause(dialect, context, state);

        let prepared_order = ordering::prepare_order_by(order_by.clone());

        let mut params = Vec::new();
        let where_clause = filter::compile_where(dialect, &mut params, &table_alias, where_clauses, state)?;

        let sql = if let (Some(skip), Some(first)) = (pagination.skip, pagination.first) {
            let mut invalid = Vec::new();

            if skip < 0 {
                invalid.push("skip");
            }
            if first <= 0 {
                invalid.push("first");
            }
            if !invalid.is_empty() {
                return Err(SqlError::invalid_argument(format!(
                    "Pagination parameter(s) {} must be positive/nonnegative",
                    invalid.join(", ")
                )));
            }

            let order = ordering::render_order_by(dialect, &table_alias, &prepared_order, false);

            dialect.take_skip_select(&fields, &from, &where_clause, &order, first, skip)
        } else if let Some((forward, count)) = cursor_mode(&pagination) {
            if count <= 0 {
                return Err(SqlError::invalid_argument(format!(
                    "Pagination parameter {} must be positive",
                    if forward { "first" } else { "last" }
                )));
            }

            let cursor = if forward { &pagination.after } else { &pagination.before };
            let paging_where = match cursor {
                Some(cursor) => {
                    let cursor_id = parse_cursor(cursor)?;

                    cursor_condition::build(
                        dialect,
                        &mut params,
                        context.content_type_id,
                        &table_alias,
                        &prepared_order,
                        cursor_id,
                        !forward,
                        state,
                    )
                }
                None => "(1=1)".to_string(),
            };

            let combined = format!("{where_clause} and {paging_where}");

            if forward {
                let order = ordering::render_order_by(dialect, &table_alias, &prepared_order, false);

                dialect.limited_select(&fields, &from, &combined, &order, count + 1)
            } else {
                let reversed = ordering::render_order_by(dialect, &table_alias, &prepared_order, true);
                let inner = dialect.limited_select(&fields, &from, &combined, &reversed, count + 1);
                let outer_order =
                    ordering::render_order_by_aliased(dialect, context, &prepared_order, false);

                format!("select * from ({inner}) tbl order by {outer_order}")
            }
        } else if order_by.is_empty() {
            format!("select {fields} from {from} where {where_clause}")
        } else {
            let order = ordering::render_order_by(dialect, &table_alias, &order_by, false);

            format!("select {fields} from {from} where {where_clause} order by {order}")
        };

        let total_count = if calc_total_count {
            Some(self.total_count(context, where_clauses, state).await?)
        } else {
            None
        };

        let result = self.query(&sql, &params).await?;

        let mut result = RelayPaginationResult {
            total_count,
            has_next_page: false,
            has_previous_page: false,
            articles: row::parse_articles(result, context),
        };

        if let (Some(first), None) = (pagination.first, pagination.skip) {
            // One more row than asked for means a next page exists.
            result.has_next_page = result.articles.len() as i64 > first;

            if result.has_next_page {
                result.articles.pop();
            }

            let first_id = result.articles.first().map(|a| a.id);
            result.has_previous_page = self
                .has_other_page(context, where_clauses, &prepared_order, state, first_id, &pagination, false)
                .await?;
        } else if let Some(last) = pagination.last {
            result.has_previous_page = result.articles.len() as i64 > last;

            if result.has_previous_page {
                // The page was re-sorted into forward order, so the extra
                // row before the window is the first one.
                result.articles.remove(0);
            }

            let last_id = result.articles.last().map(|a| a.id);
            result.has_next_page = self
                .has_other_page(context, where_clauses, &prepared_order, state, last_id, &pagination, true)
                .await?;
        }

        Ok(result)
    }

    async fn total_count(
        &self,
        context: &RootContext,
        where_clauses: &[FilterClause],
        state: ArticleState,
    ) -> crate::Result<i64> {
        let dialect = self.dialect.as_ref();
        let table_alias = context.table_alias();
        let mut params = Vec::new();
        let where_clause = filter::compile_where(dialect, &mut params, &table_alias, where_clauses, state)?;

        let sql = format!(
            "select count(*) from {content_table} {table_alias} where {where_clause}",
            content_table = query_builder::content_table(context.content_type_id, state),
        );

        let result = self.query(&sql, &params).await?;

        Ok(result
            .first()
            .and_then(|row| row.at(0))
            .and_then(|value| value.as_i64())
            .unwrap_or(0))
    }

    /// The far-side page-info probe: a 1-row keyset query in the opposite
    /// direction, wrapped in a count. Only runs when the corresponding
    /// cursor argument was supplied and the settings enable the extra round
    /// trip; otherwise the far side reports `false`.
    #[allow(clippy::too_many_arguments)]
    async fn has_other_page(
        &self,
        context: &RootContext,
        where_clauses: &[FilterClause],
        order_by: &[OrderByToken],
        state: ArticleState,
        cursor_id: Option<i64>,
        pagination: &RelayPaginationArgs,
        check_next: bool,
    ) -> crate::Result<bool> {
        let far_cursor_missing = (check_next && pagination.last.is_some() && pagination.before.is_none())
            || (!check_next && pagination.first.is_some() && pagination.after.is_none());

        if far_cursor_missing || !self.settings.calculate_paging_data {
            return Ok(false);
        }

        let Some(cursor_id) = cursor_id else {
            return Ok(false);
        };

        let dialect = self.dialect.as_ref();
        let table_alias = context.table_alias();
        let mut params = Vec::new();

        let where_clause = filter::compile_where(dialect, &mut params, &table_alias, where_clauses, state)?;
        let paging_where = cursor_condition::build(
            dialect,
            &mut params,
            context.content_type_id,
            &table_alias,
            order_by,
            cursor_id,
            !check_next,
            state,
        );

        let combined = format!("{where_clause} and {paging_where}");
        let order = ordering::render_order_by(dialect, &table_alias, order_by, !check_next);
        let inner = dialect.limited_select(
            &format!("{table_alias}.{}", system_fields::ID.db_name),
            &query_builder::from_clause(dialect, context, state),
            &combined,
            &order,
            1,
        );

        let sql = format!("select count(*) from ({inner}) tbl");
        let result = self.query(&sql, &params).await?;

        Ok(result
            .first()
            .and_then(|row| row.at(0))
            .and_then(|value| value.as_i64())
            .unwrap_or(0)
            > 0)
    }
}

/// Cursor mode and its page size: `first` paging forward wins over `last`
/// paging backward.
fn cursor_mode(pagination: &RelayPaginationArgs) -> Option<(bool, i64)> {
    match (pagination.first, pagination.last) {
        (Some(first), _) => Some((true, first)),
        (None, Some(last)) => Some((false, last)),
        _ => None,
    }
}

/// The cursor is opaque to clients but is simply the row id rendered as a
/// decimal string.
fn parse_cursor(cursor: &str) -> crate::Result<i64> {
    cursor
        .parse::<i64>()
        .map_err(|_| SqlError::invalid_argument("Cursor must be an integer"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::test_helpers::article_context;
    use crate::{Mssql, Postgres};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Records executed SQL and replays canned result sets.
    struct MockConnection {
        responses: Mutex<VecDeque<ResultSet>>,
        queries: Mutex<Vec<(String, Vec<Value>)>>,
    }

    impl MockConnection {
        fn new(responses: Vec<ResultSet>) -> Arc<Self> {
            Arc::new(MockConnection {
                responses: Mutex::new(responses.into()),
                queries: Mutex::new(Vec::new()),
            })
        }

        fn executed(&self) -> Vec<(String, Vec<Value>)> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Queryable for MockConnection {
        async fn query_raw(&self, sql: &str, params: &[Value]) -> sql_connection::Result<ResultSet> {
            self.queries.lock().unwrap().push((sql.to_string(), params.to_vec()));

            Ok(self.responses.lock().unwrap().pop_front().unwrap_or_default())
        }

        async fn execute_raw(&self, _sql: &str, _params: &[Value]) -> sql_connection::Result<u64> {
            Ok(0)
        }
    }

    fn article_columns() -> Vec<String> {
        vec!["content_item_id".into(), "cid_1_title".into()]
    }

    fn article_row(id: i64) -> Vec<Value> {
        vec![Value::integer(id), Value::text(format!("title {id}"))]
    }

    fn rows(ids: &[i64]) -> ResultSet {
        ResultSet::new(article_columns(), ids.iter().map(|id| article_row(*id)).collect())
    }

    fn count(n: i64) -> ResultSet {
        ResultSet::new(vec!["count".into()], vec![vec![Value::integer(n)]])
    }

    fn accessor(connection: Arc<MockConnection>, calculate_paging_data: bool) -> ArticlesAccessor {
        ArticlesAccessor::new(
            connection,
            Arc::new(Postgres),
            AccessorSettings { calculate_paging_data },
        )
    }

    #[tokio::test]
    async fn negative_pagination_arguments_are_rejected() {
        let connection = MockConnection::new(vec![]);
        let accessor = accessor(connection.clone(), false);

        let err = accessor
            .paged_articles(
                &article_context(),
                vec![],
                &[],
                RelayPaginationArgs {
                    skip: Some(-1),
                    first: Some(0),
                    ..Default::default()
                },
                false,
                ArticleState::Live,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, SqlError::InvalidArgument(_)));
        assert!(err.to_string().contains("skip, first"));
        // Rejected before any SQL executes.
        assert!(connection.executed().is_empty());
    }

    #[tokio::test]
    async fn non_integer_cursors_are_rejected() {
        let connection = MockConnection::new(vec![]);
        let accessor = accessor(connection.clone(), false);

        let err = accessor
            .paged_articles(
                &article_context(),
                vec![],
                &[],
                RelayPaginationArgs {
                    first: Some(2),
                    after: Some("bm90LWFuLWlk".into()),
                    ..Default::default()
                },
                false,
                ArticleState::Live,
            )
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Cursor must be an integer"));
    }

    #[tokio::test]
    async fn first_fetches_one_extra_row_and_trims_it() {
        // Rows 1..=3 returned for first=2: the page is 1-2, a next page exists.
        let connection = MockConnection::new(vec![rows(&[1, 2, 3])]);
        let accessor = accessor(connection.clone(), false);

        let result = accessor
            .paged_articles(
                &article_context(),
                vec![],
                &[],
                RelayPaginationArgs {
                    first: Some(2),
                    ..Default::default()
                },
                false,
                ArticleState::Live,
            )
            .await
            .unwrap();

        assert!(result.has_next_page);
        assert!(!result.has_previous_page);
        assert_eq!(result.articles.iter().map(|a| a.id).collect::<Vec<_>>(), vec![1, 2]);

        let (sql, _) = &connection.executed()[0];
        assert!(sql.contains("limit 3"), "{sql}");
        assert!(sql.contains("order by cid_1.\"content_item_id\" asc"), "{sql}");
    }

    #[tokio::test]
    async fn first_after_pages_through_the_keyset() {
        // The worked example: 5 rows sorted by id, first=2 after the cursor
        // of row 2 yields rows 3-4 and a total count of 5.
        let connection = MockConnection::new(vec![count(5), rows(&[3, 4, 5])]);
        let accessor = accessor(connection.clone(), false);

        let result = accessor
            .paged_articles(
                &article_context(),
                vec![],
                &[],
                RelayPaginationArgs {
                    first: Some(2),
                    after: Some("2".into()),
                    ..Default::default()
                },
                true,
                ArticleState::Live,
            )
            .await
            .unwrap();

        assert_eq!(result.total_count, Some(5));
        assert!(result.has_next_page);
        assert_eq!(result.articles.iter().map(|a| a.id).collect::<Vec<_>>(), vec![3, 4]);

        let executed = connection.executed();
        assert!(executed[0].0.starts_with("select count(*) from content_1_live"));

        let (page_sql, page_params) = &executed[1];
        assert!(page_sql.contains("(cid_1.content_item_id > $1::int8)"), "{page_sql}");
        assert!(page_sql.contains("limit 3"), "{page_sql}");
        assert_eq!(page_params, &vec![Value::integer(2)]);
    }

    #[tokio::test]
    async fn last_before_reverses_and_restores_forward_order() {
        // last=2 before cursor 4: the reversed inner select returns 3,2,1;
        // the outer order-by restores 1,2,3; the extra leading row is
        // trimmed.
        let connection = MockConnection::new(vec![rows(&[1, 2, 3])]);
        let accessor = accessor(connection.clone(), false);

        let result = accessor
            .paged_articles(
                &article_context(),
                vec![],
                &[],
                RelayPaginationArgs {
                    last: Some(2),
                    before: Some("4".into()),
                    ..Default::default()
                },
                false,
                ArticleState::Live,
            )
            .await
            .unwrap();

        assert!(result.has_previous_page);
        assert_eq!(result.articles.iter().map(|a| a.id).collect::<Vec<_>>(), vec![2, 3]);

        let (sql, params) = &connection.executed()[0];
        assert!(sql.starts_with("select * from (select"), "{sql}");
        assert!(sql.contains("(cid_1.content_item_id < $1::int8)"), "{sql}");
        assert!(sql.contains("order by cid_1.\"content_item_id\" desc limit 3"), "{sql}");
        assert!(sql.ends_with(") tbl order by content_item_id asc"), "{sql}");
        assert_eq!(params, &vec![Value::integer(4)]);
    }

    #[tokio::test]
    async fn far_side_probe_runs_only_when_enabled() {
        // Probe disabled: one query, far side reports false.
        let connection = MockConnection::new(vec![rows(&[3, 4])]);
        let accessor_without = accessor(connection.clone(), false);

        let result = accessor_without
            .paged_articles(
                &article_context(),
                vec![],
                &[],
                RelayPaginationArgs {
                    first: Some(2),
                    after: Some("2".into()),
                    ..Default::default()
                },
                false,
                ArticleState::Live,
            )
            .await
            .unwrap();

        assert!(!result.has_previous_page);
        assert_eq!(connection.executed().len(), 1);

        // Probe enabled: a second, 1-row keyset count runs in the opposite
        // direction and finds the previous page.
        let connection = MockConnection::new(vec![rows(&[3, 4]), count(1)]);
        let accessor_with = accessor(connection.clone(), true);

        let result = accessor_with
            .paged_articles(
                &article_context(),
                vec![],
                &[],
                RelayPaginationArgs {
                    first: Some(2),
                    after: Some("2".into()),
                    ..Default::default()
                },
                false,
                ArticleState::Live,
            )
            .await
            .unwrap();

        assert!(result.has_previous_page);

        let executed = connection.executed();
        assert_eq!(executed.len(), 2);
        assert!(executed[1].0.starts_with("select count(*) from (select cid_1.content_item_id"));
        assert!(executed[1].0.contains("limit 1"));
    }

    #[tokio::test]
    async fn by_id_list_selects_the_batched_id_set() {
        let connection = MockConnection::new(vec![rows(&[1, 2])]);
        let accessor = accessor(connection.clone(), false);

        let articles = accessor
            .articles_by_id_list(&article_context(), &[1, 2], ArticleState::Stage)
            .await
            .unwrap();

        assert_eq!(articles.len(), 2);
        assert!(articles.contains_key(&1));

        let (sql, params) = &connection.executed()[0];
        assert!(sql.contains("from content_1_stage cid_1"), "{sql}");
        assert!(
            sql.contains("where cid_1.content_item_id in (select id from unnest($1::int8[]) i(id))"),
            "{sql}"
        );
        assert_eq!(params, &vec![Value::id_array([1, 2])]);
    }

    #[tokio::test]
    async fn empty_id_sets_skip_the_round_trip() {
        let connection = MockConnection::new(vec![]);
        let accessor = accessor(connection.clone(), false);

        let articles = accessor
            .articles_by_id_list(&article_context(), &[], ArticleState::Live)
            .await
            .unwrap();

        assert!(articles.is_empty());
        assert!(connection.executed().is_empty());
    }

    #[tokio::test]
    async fn m2m_lookup_unpivots_the_aggregated_parent_ids() {
        let result = ResultSet::new(
            vec!["item_ids".into(), "content_item_id".into(), "cid_1_title".into()],
            vec![
                vec![Value::text("10,11"), Value::integer(1), Value::text("a")],
                vec![Value::text("11"), Value::integer(2), Value::text("b")],
            ],
        );
        let connection = MockConnection::new(vec![result]);
        let accessor = accessor(connection.clone(), false);

        let lookup = accessor
            .related_m2m_articles_by_id_list(
                &article_context(),
                &[10, 11],
                77,
                false,
                &[],
                &[],
                ArticleState::Live,
            )
            .await
            .unwrap();

        assert_eq!(lookup[&10].iter().map(|a| a.id).collect::<Vec<_>>(), vec![1]);
        assert_eq!(lookup[&11].iter().map(|a| a.id).collect::<Vec<_>>(), vec![1, 2]);

        let (sql, _) = &connection.executed()[0];
        assert!(
            sql.contains("(select array_to_string(array_agg(id), ',') as item_ids, linked_id from item_link_77"),
            "{sql}"
        );
        assert!(sql.contains("group by linked_id) m2m"), "{sql}");
        assert!(sql.contains("join content_1_live cid_1 on cid_1.content_item_id = m2m.linked_id"), "{sql}");
    }

    #[tokio::test]
    async fn m2o_lookup_groups_by_the_backward_column() {
        let result = ResultSet::new(
            vec!["content_item_id".into(), "cid_1_author".into()],
            vec![
                vec![Value::integer(1), Value::integer(10)],
                vec![Value::integer(2), Value::integer(10)],
                vec![Value::integer(3), Value::integer(11)],
            ],
        );
        let connection = MockConnection::new(vec![result]);
        let accessor = accessor(connection.clone(), false);

        let lookup = accessor
            .related_m2o_articles_by_id_list(
                &article_context(),
                &[10, 11],
                "author",
                &[],
                &[],
                ArticleState::Live,
            )
            .await
            .unwrap();

        assert_eq!(lookup[&10].iter().map(|a| a.id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(lookup[&11].iter().map(|a| a.id).collect::<Vec<_>>(), vec![3]);

        let (sql, _) = &connection.executed()[0];
        assert!(sql.contains("where cid_1.\"author\" in (select id from unnest"), "{sql}");
    }

    #[tokio::test]
    async fn mssql_paging_uses_top_and_values_constructors() {
        let connection = MockConnection::new(vec![rows(&[3, 4, 5])]);
        let accessor = ArticlesAccessor::new(
            connection.clone(),
            Arc::new(Mssql),
            AccessorSettings::default(),
        );

        accessor
            .paged_articles(
                &article_context(),
                vec![],
                &[],
                RelayPaginationArgs {
                    first: Some(2),
                    after: Some("2".into()),
                    ..Default::default()
                },
                false,
                ArticleState::Live,
            )
            .await
            .unwrap();

        let (sql, _) = &connection.executed()[0];
        assert!(sql.starts_with("select top(3)"), "{sql}");
        assert!(sql.contains("(cid_1.content_item_id > @P1)"), "{sql}");
    }
}
