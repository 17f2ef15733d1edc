use content_metadata::{
    filter_signature, order_signature, Article, ArticleState, FilterClause, OrderByToken,
    RelayPaginationArgs, RelayPaginationResult, RootContext,
};
use sql_query_connector::ArticlesAccessor;
use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex;

/// The per-request batch loader. Field resolution passes whole sibling row
/// sets, so one relation field resolved across M parents issues exactly one
/// grouped statement; the memo keyed by content type (and, for relation
/// lookups, the canonical filter/order signatures) keeps repeated keys at
/// one round trip per execution. Dies with the request; nothing is shared
/// across executions.
pub struct LoaderContext {
    accessor: ArticlesAccessor,
    state: ArticleState,
    by_id: Mutex<HashMap<i64, HashMap<i64, Option<Article>>>>,
    related: Mutex<HashMap<RelationKey, RelationCache>>,
}

/// Memoized relation batch: which parent ids have been fetched, and the
/// rows per parent.
#[derive(Debug, Default)]
struct RelationCache {
    fetched: HashSet<i64>,
    lookup: HashMap<i64, Vec<Article>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RelationKey {
    attribute_id: i64,
    filter_signature: String,
    order_signature: String,
}

impl LoaderContext {
    pub fn new(accessor: ArticlesAccessor, state: ArticleState) -> Self {
        LoaderContext {
            accessor,
            state,
            by_id: Mutex::new(HashMap::new()),
            related: Mutex::new(HashMap::new()),
        }
    }

    pub fn state(&self) -> ArticleState {
        self.state
    }

    /// Batched point lookup: fetches the ids not already memoized for this
    /// content type in one statement and returns the requested subset.
    pub async fn load_many_by_id(
        &self,
        context: &RootContext,
        ids: &[i64],
    ) -> crate::CoreResult<HashMap<i64, Article>> {
        let mut cache = self.by_id.lock().await;
        let cached = cache.entry(context.content_type_id).or_default();

        let missing: Vec<i64> = {
            let mut missing: Vec<i64> = ids.iter().copied().filter(|id| !cached.contains_key(id)).collect();
            missing.sort_unstable();
            missing.dedup();
            missing
        };

        if !missing.is_empty() {
            let loaded = self
                .accessor
                .articles_by_id_list(context, &missing, self.state)
                .await?;

            for id in &missing {
                cached.insert(*id, loaded.get(id).cloned());
            }
        }

        Ok(ids
            .iter()
            .filter_map(|id| cached.get(id).cloned().flatten().map(|article| (*id, article)))
            .collect())
    }

    /// Batched many-to-many lookup, keyed by attribute and the canonical
    /// filter/order signatures so sibling fields with different arguments
    /// never share a batch.
    #[allow(clippy::too_many_arguments)]
    pub async fn load_related_m2m(
        &self,
        attribute_id: i64,
        context: &RootContext,
        parent_ids: &[i64],
        relation_id: i64,
        is_backward: bool,
        order_by: &[OrderByToken],
        filters: &[FilterClause],
    ) -> crate::CoreResult<HashMap<i64, Vec<Article>>> {
        let key = RelationKey {
            attribute_id,
            filter_signature: filter_signature(filters),
            order_signature: order_signature(order_by),
        };

        let mut cache = self.related.lock().await;
        let entry = cache.entry(key).or_default();
        let missing = missing_parents(entry, parent_ids);

        if !missing.is_empty() {
            let loaded = self
                .accessor
                .related_m2m_articles_by_id_list(
                    context,
                    &missing,
                    relation_id,
                    is_backward,
                    order_by,
                    filters,
                    self.state,
                )
                .await?;

            merge(entry, missing, loaded);
        }

        Ok(subset(&entry.lookup, parent_ids))
    }

    /// Batched many-to-one ("backward") lookup.
    #[allow(clippy::too_many_arguments)]
    pub async fn load_related_m2o(
        &self,
        attribute_id: i64,
        context: &RootContext,
        parent_ids: &[i64],
        backward_field: &str,
        order_by: &[OrderByToken],
        filters: &[FilterClause],
    ) -> crate::CoreResult<HashMap<i64, Vec<Article>>> {
        let key = RelationKey {
            attribute_id,
            filter_signature: filter_signature(filters),
            order_signature: order_signature(order_by),
        };

        let mut cache = self.related.lock().await;
        let entry = cache.entry(key).or_default();
        let missing = missing_parents(entry, parent_ids);

        if !missing.is_empty() {
            let loaded = self
                .accessor
                .related_m2o_articles_by_id_list(context, &missing, backward_field, order_by, filters, self.state)
                .await?;

            merge(entry, missing, loaded);
        }

        Ok(subset(&entry.lookup, parent_ids))
    }

    /// The root connection query; not memoized, every connection field runs
    /// its own paged statement.
    pub async fn paged_articles(
        &self,
        context: &RootContext,
        order_by: Vec<OrderByToken>,
        filters: &[FilterClause],
        pagination: RelayPaginationArgs,
        calc_total_count: bool,
    ) -> crate::CoreResult<RelayPaginationResult> {
        Ok(self
            .accessor
            .paged_articles(context, order_by, filters, pagination, calc_total_count, self.state)
            .await?)
    }
}

fn missing_parents(cache: &RelationCache, parent_ids: &[i64]) -> Vec<i64> {
    let mut missing: Vec<i64> = parent_ids
        .iter()
        .copied()
        .filter(|id| !cache.fetched.contains(id))
        .collect();

    missing.sort_unstable();
    missing.dedup();
    missing
}

fn merge(cache: &mut RelationCache, fetched: Vec<i64>, loaded: HashMap<i64, Vec<Article>>) {
    cache.fetched.extend(fetched);
    cache.lookup.extend(loaded);
}

fn subset(lookup: &HashMap<i64, Vec<Article>>, parent_ids: &[i64]) -> HashMap<i64, Vec<Article>> {
    parent_ids
        .iter()
        .filter_map(|id| lookup.get(id).map(|articles| (*id, articles.clone())))
        .collect()
}
