use crate::{
    arguments, CoreError, CoreResult, GraphqlError, Item, LoaderContext, Map, QueryRequest,
    Response, Selection,
};
use content_metadata::{Article, RelayPaginationResult, Site};
use futures::future::BoxFuture;
use futures::FutureExt;
use rust_decimal::prelude::ToPrimitive;
use schema::{
    FieldResolution, ObjectKind, ObjectType, OutputField, QuerySchema, QueryTag, ScalarKind,
    SystemFieldKind,
};
use sql_connection::Value;
use std::collections::{HashMap, HashSet};

/// Execute one request against the active schema generation. Argument
/// errors abort the request with no partial execution; execution errors
/// surface as error entries with a null data member for the failed field.
pub async fn execute(schema: &QuerySchema, loader: &LoaderContext, request: &QueryRequest) -> Response {
    let mut data = Map::new();
    let mut errors = Vec::new();

    for selection in &request.operation.selections {
        let path = vec![selection.response_name().to_string()];

        match resolve_root(schema, loader, request, selection).await {
            Ok(item) => {
                data.insert(selection.response_name().to_string(), item);
            }
            Err(error @ CoreError::ArgumentError(_)) => {
                return Response::from_error(GraphqlError::new(error.to_string(), path));
            }
            Err(error) => {
                tracing::error!(field = %selection.name, error = %error, "query execution failed");

                errors.push(GraphqlError::new(error.to_string(), path));
                data.insert(selection.response_name().to_string(), Item::Null);
            }
        }
    }

    Response {
        data: Some(data),
        errors,
    }
}

async fn resolve_root(
    schema: &QuerySchema,
    loader: &LoaderContext,
    request: &QueryRequest,
    selection: &Selection,
) -> CoreResult<Item> {
    let root = schema
        .root_field(&selection.name)
        .ok_or_else(|| CoreError::argument(format!("Unknown query field {}", selection.name)))?;

    match root.tag {
        QueryTag::FindById => {
            let id = arguments::int_argument(request, selection, "id")?
                .ok_or_else(|| CoreError::argument("Argument id is required"))?;

            let context = content_context(schema, root.content_type_id)?;
            let articles = loader.load_many_by_id(context, &[id]).await?;

            match articles.get(&id) {
                Some(article) => {
                    let mut items = resolve_articles(
                        schema,
                        loader,
                        request,
                        std::slice::from_ref(article),
                        &selection.nested_selections,
                    )
                    .await?;

                    Ok(items.pop().unwrap_or(Item::Null))
                }
                None => Ok(Item::Null),
            }
        }
        QueryTag::FindMany => resolve_connection(schema, loader, request, root.content_type_id, selection).await,
    }
}

async fn resolve_connection(
    schema: &QuerySchema,
    loader: &LoaderContext,
    request: &QueryRequest,
    content_type_id: i64,
    selection: &Selection,
) -> CoreResult<Item> {
    let context = content_context(schema, content_type_id)?;
    let pagination = arguments::pagination(request, selection)?;
    let order_by = arguments::order_by(request, selection, schema.order_enum(content_type_id))?;
    let filters = arguments::filters(request, selection, schema.filter_map(content_type_id))?;

    // The count query only runs when the selection asks for it.
    let needs_total_count = selection.find_nested("totalCount").is_some();

    let page = loader
        .paged_articles(context, order_by, &filters, pagination, needs_total_count)
        .await?;

    let mut map = Map::new();

    for sub in &selection.nested_selections {
        let item = match sub.name.as_str() {
            "totalCount" => page.total_count.map(Item::int).unwrap_or(Item::Null),
            "pageInfo" => page_info_item(&page, sub)?,
            "edges" => {
                let nodes = match sub.find_nested("node") {
                    Some(node) => {
                        resolve_articles(schema, loader, request, &page.articles, &node.nested_selections)
                            .await?
                    }
                    None => vec![Item::Null; page.articles.len()],
                };

                let mut edges = Vec::with_capacity(page.articles.len());

                for (article, node) in page.articles.iter().zip(nodes) {
                    let mut edge = Map::new();

                    for edge_field in &sub.nested_selections {
                        let value = match edge_field.name.as_str() {
                            "node" => node.clone(),
                            "cursor" => Item::string(article.id.to_string()),
                            other => {
                                return Err(CoreError::argument(format!(
                                    "Unknown field {other} on edge type"
                                )))
                            }
                        };

                        edge.insert(edge_field.response_name().to_string(), value);
                    }

                    edges.push(Item::Map(edge));
                }

                Item::List(edges)
            }
            "items" => {
                let items =
                    resolve_articles(schema, loader, request, &page.articles, &sub.nested_selections).await?;

                Item::List(items)
            }
            other => {
                return Err(CoreError::argument(format!(
                    "Unknown field {other} on connection type"
                )))
            }
        };

        map.insert(sub.response_name().to_string(), item);
    }

    Ok(Item::Map(map))
}

fn page_info_item(page: &RelayPaginationResult, selection: &Selection) -> CoreResult<Item> {
    let mut map = Map::new();

    for sub in &selection.nested_selections {
        let item = match sub.name.as_str() {
            "hasNextPage" => Item::boolean(page.has_next_page),
            "hasPreviousPage" => Item::boolean(page.has_previous_page),
            "startCursor" => page
                .articles
                .first()
                .map(|a| Item::string(a.id.to_string()))
                .unwrap_or(Item::Null),
            "endCursor" => page
                .articles
                .last()
                .map(|a| Item::string(a.id.to_string()))
                .unwrap_or(Item::Null),
            other => {
                return Err(CoreError::argument(format!(
                    "Unknown field {other} on PageInfo"
                )))
            }
        };

        map.insert(sub.response_name().to_string(), item);
    }

    Ok(Item::Map(map))
}

/// Resolved relation batches for one sibling set, indexed by selection
/// position.
enum RelationItems {
    /// Related item per related row id.
    Single(HashMap<i64, Item>),
    /// Related item list per parent row id.
    Many(HashMap<i64, Vec<Item>>),
}

/// Resolve a whole sibling row set against one selection set. Relation
/// fields are batched across the entire set before any per-row item is
/// assembled, so resolving a relation across M parent rows costs one
/// grouped statement regardless of M.
fn resolve_articles<'a>(
    schema: &'a QuerySchema,
    loader: &'a LoaderContext,
    request: &'a QueryRequest,
    articles: &'a [Article],
    selections: &'a [Selection],
) -> BoxFuture<'a, CoreResult<Vec<Item>>> {
    async move {
        if articles.is_empty() {
            return Ok(Vec::new());
        }

        let mut relation_results: HashMap<usize, RelationItems> = HashMap::new();

        for (index, sub) in selections.iter().enumerate() {
            if sub.name == "__typename" {
                continue;
            }

            let Some(field) = find_field(schema, articles, sub)? else {
                continue;
            };

            match &field.resolution {
                FieldResolution::RelationOneToMany {
                    query_alias,
                    related_content_id,
                } => {
                    let mut seen = HashSet::new();
                    let related_ids: Vec<i64> = articles
                        .iter()
                        .filter_map(|a| a.field(query_alias).and_then(|v| v.as_i64()))
                        .filter(|id| *id > 0 && seen.insert(*id))
                        .collect();

                    let related_context = content_context(schema, *related_content_id)?;
                    let loaded = loader.load_many_by_id(related_context, &related_ids).await?;

                    let related_articles: Vec<Article> = related_ids
                        .iter()
                        .filter_map(|id| loaded.get(id).cloned())
                        .collect();

                    let items = resolve_articles(
                        schema,
                        loader,
                        request,
                        &related_articles,
                        &sub.nested_selections,
                    )
                    .await?;

                    let by_id = related_articles
                        .iter()
                        .map(|a| a.id)
                        .zip(items)
                        .collect::<HashMap<_, _>>();

                    relation_results.insert(index, RelationItems::Single(by_id));
                }
                FieldResolution::RelationManyToMany {
                    attribute_id,
                    query_alias,
                    relation_id,
                    is_backward,
                    related_content_id,
                } => {
                    let parent_ids: Vec<i64> = articles.iter().map(|a| a.id).collect();

                    // The column value carries the relation id per row;
                    // fall back to the attribute's relation metadata.
                    let relation_id = articles
                        .iter()
                        .find_map(|a| a.field(query_alias).and_then(|v| v.as_i64()))
                        .unwrap_or(*relation_id);

                    let related_context = content_context(schema, *related_content_id)?;
                    let order_by =
                        arguments::order_by(request, sub, schema.order_enum(*related_content_id))?;
                    let filters =
                        arguments::filters(request, sub, schema.filter_map(*related_content_id))?;

                    let lookup = loader
                        .load_related_m2m(
                            *attribute_id,
                            related_context,
                            &parent_ids,
                            relation_id,
                            *is_backward,
                            &order_by,
                            &filters,
                        )
                        .await?;

                    let resolved =
                        resolve_lookup(schema, loader, request, lookup, &sub.nested_selections).await?;

                    relation_results.insert(index, resolved);
                }
                FieldResolution::RelationManyToOne {
                    attribute_id,
                    related_content_id,
                    backward_field,
                } => {
                    let parent_ids: Vec<i64> = articles.iter().map(|a| a.id).collect();
                    let related_context = content_context(schema, *related_content_id)?;
                    let order_by =
                        arguments::order_by(request, sub, schema.order_enum(*related_content_id))?;
                    let filters =
                        arguments::filters(request, sub, schema.filter_map(*related_content_id))?;

                    let lookup = loader
                        .load_related_m2o(
                            *attribute_id,
                            related_context,
                            &parent_ids,
                            backward_field,
                            &order_by,
                            &filters,
                        )
                        .await?;

                    let resolved =
                        resolve_lookup(schema, loader, request, lookup, &sub.nested_selections).await?;

                    relation_results.insert(index, resolved);
                }
                _ => {}
            }
        }

        let mut results = Vec::with_capacity(articles.len());

        for article in articles {
            let concrete = concrete_type(schema, article)?;
            let mut map = Map::new();

            for (index, sub) in selections.iter().enumerate() {
                let item = if sub.name == "__typename" {
                    Item::string(concrete.identifier.name())
                } else {
                    match concrete.find_field(&sub.name) {
                        // A field of a sibling implementation this row's
                        // concrete type does not carry.
                        None => Item::Null,
                        Some(field) => {
                            resolve_article_field(article, field, relation_results.get(&index))
                        }
                    }
                };

                map.insert(sub.response_name().to_string(), item);
            }

            results.push(Item::Map(map));
        }

        Ok(results)
    }
    .boxed()
}

async fn resolve_lookup(
    schema: &QuerySchema,
    loader: &LoaderContext,
    request: &QueryRequest,
    lookup: HashMap<i64, Vec<Article>>,
    selections: &[Selection],
) -> CoreResult<RelationItems> {
    let mut spans = Vec::with_capacity(lookup.len());
    let mut flat = Vec::new();

    for (parent_id, articles) in lookup {
        spans.push((parent_id, articles.len()));
        flat.extend(articles);
    }

    let items = resolve_articles(schema, loader, request, &flat, selections).await?;

    let mut result = HashMap::with_capacity(spans.len());
    let mut offset = 0;

    for (parent_id, len) in spans {
        result.insert(parent_id, items[offset..offset + len].to_vec());
        offset += len;
    }

    Ok(RelationItems::Many(result))
}

fn resolve_article_field(
    article: &Article,
    field: &OutputField,
    relation: Option<&RelationItems>,
) -> Item {
    match &field.resolution {
        FieldResolution::System(kind) => system_item(article, *kind),
        FieldResolution::Scalar {
            query_alias,
            kind,
            site,
        } => scalar_item(article.field(query_alias), *kind, site.as_deref()),
        FieldResolution::MediaUrl { query_alias, base_url } => {
            media_item(article.field(query_alias), base_url)
        }
        FieldResolution::DegradedRelation { query_alias } => {
            scalar_item(article.field(query_alias), ScalarKind::Int, None)
        }
        FieldResolution::RelationOneToMany { query_alias, .. } => match relation {
            Some(RelationItems::Single(items)) => article
                .field(query_alias)
                .and_then(|v| v.as_i64())
                .and_then(|id| items.get(&id).cloned())
                .unwrap_or(Item::Null),
            _ => Item::Null,
        },
        FieldResolution::RelationManyToMany { .. } | FieldResolution::RelationManyToOne { .. } => {
            match relation {
                Some(RelationItems::Many(items)) => {
                    Item::List(items.get(&article.id).cloned().unwrap_or_default())
                }
                _ => Item::List(Vec::new()),
            }
        }
        FieldResolution::Structural => Item::Null,
    }
}

fn system_item(article: &Article, kind: SystemFieldKind) -> Item {
    match kind {
        SystemFieldKind::Id => Item::int(article.id),
        SystemFieldKind::StatusTypeId => article.status_type_id.map(Item::int).unwrap_or(Item::Null),
        SystemFieldKind::Created => article
            .created
            .map(|dt| Item::string(dt.to_rfc3339()))
            .unwrap_or(Item::Null),
        SystemFieldKind::Modified => article
            .modified
            .map(|dt| Item::string(dt.to_rfc3339()))
            .unwrap_or(Item::Null),
        SystemFieldKind::LastModifiedBy => {
            article.last_modified_by.map(Item::int).unwrap_or(Item::Null)
        }
    }
}

fn scalar_item(value: Option<&Value>, kind: ScalarKind, site: Option<&Site>) -> Item {
    let Some(value) = value else {
        return Item::Null;
    };

    if value.is_null() {
        return Item::Null;
    }

    match kind {
        ScalarKind::String | ScalarKind::Uri => match value.as_str() {
            Some(text) => match site {
                Some(site) => Item::string(site.replace_placeholders(text)),
                None => Item::string(text),
            },
            None => Item::Null,
        },
        ScalarKind::Int => value.as_i64().map(Item::int).unwrap_or(Item::Null),
        ScalarKind::Decimal => match value {
            Value::Integer(Some(i)) => Item::int(*i),
            Value::Real(Some(d)) => d.to_f64().map(Item::float).unwrap_or(Item::Null),
            _ => Item::Null,
        },
        ScalarKind::Boolean => value.as_bool().map(Item::boolean).unwrap_or(Item::Null),
        ScalarKind::Date => match value {
            Value::Date(Some(date)) => Item::string(date.format("%Y-%m-%d").to_string()),
            Value::DateTime(Some(dt)) => Item::string(dt.date_naive().format("%Y-%m-%d").to_string()),
            _ => Item::Null,
        },
        ScalarKind::Time => match value {
            Value::Time(Some(time)) => Item::string(time.format("%H:%M:%S").to_string()),
            Value::DateTime(Some(dt)) => Item::string(dt.format("%H:%M:%S").to_string()),
            _ => Item::Null,
        },
        ScalarKind::DateTime => match value {
            Value::DateTime(Some(dt)) => Item::string(dt.to_rfc3339()),
            Value::Date(Some(date)) => Item::string(format!("{}T00:00:00+00:00", date.format("%Y-%m-%d"))),
            _ => Item::Null,
        },
    }
}

fn media_item(value: Option<&Value>, base_url: &str) -> Item {
    match value.and_then(|v| v.as_str()) {
        Some(url) if !url.is_empty() => Item::string(format!("{base_url}/{url}")),
        _ => Item::Null,
    }
}

fn content_context<'a>(
    schema: &'a QuerySchema,
    content_type_id: i64,
) -> CoreResult<&'a content_metadata::RootContext> {
    schema
        .context(content_type_id)
        .map(|context| context.as_ref())
        .ok_or_else(|| CoreError::argument(format!("Unknown content type {content_type_id}")))
}

fn concrete_type<'a>(schema: &'a QuerySchema, article: &Article) -> CoreResult<&'a ObjectType> {
    schema
        .resolve_concrete(article.content_type_id, article.extension_content_id)
        .ok_or_else(|| {
            CoreError::argument(format!("Unknown content type {}", article.content_type_id))
        })
}

/// Find the field definition a selection refers to on a content type's
/// graph type: the object itself, or for extended types the base
/// implementation and then every extension implementation. A name no
/// implementation carries is a caller error.
fn find_field<'a>(
    schema: &'a QuerySchema,
    articles: &[Article],
    selection: &Selection,
) -> CoreResult<Option<&'a OutputField>> {
    let content_type_id = match articles.first() {
        Some(article) => article.content_type_id,
        None => return Ok(None),
    };

    let object = schema
        .content_object(content_type_id)
        .ok_or_else(|| CoreError::argument(format!("Unknown content type {content_type_id}")))?;

    match &object.kind {
        ObjectKind::Interface { base, implementations } => {
            if let Some(field) = schema.object_type(*base).find_field(&selection.name) {
                return Ok(Some(field));
            }

            for (_, implementation) in implementations {
                if let Some(field) = schema.object_type(*implementation).find_field(&selection.name) {
                    return Ok(Some(field));
                }
            }
        }
        _ => {
            if let Some(field) = object.find_field(&selection.name) {
                return Ok(Some(field));
            }
        }
    }

    Err(CoreError::argument(format!(
        "Unknown field {} on type {}",
        selection.name,
        object.identifier.name()
    )))
}
