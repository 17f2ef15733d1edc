use crate::QueryDialect;
use content_metadata::{Attribute, AttributeType, ContentCatalog, ContentType, Site};
use sql_connection::{Params, Queryable, ResultRow, Value};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Loads the content catalog from the store's own catalog tables. One SQL
/// round trip joins attributes to their content type, site, declared type
/// and relation metadata; rows assemble into the site map and the content
/// map the validation pass consumes.
pub struct MetadataAccessor {
    connection: Arc<dyn Queryable>,
    dialect: Arc<dyn QueryDialect>,
    /// Optional allow-list restricting which content types load.
    content_ids: Option<Vec<i64>>,
}

impl MetadataAccessor {
    pub fn new(
        connection: Arc<dyn Queryable>,
        dialect: Arc<dyn QueryDialect>,
        content_ids: Option<Vec<i64>>,
    ) -> Self {
        MetadataAccessor {
            connection,
            dialect,
            content_ids,
        }
    }

    pub async fn load_catalog(&self) -> crate::Result<ContentCatalog> {
        let mut params = Vec::new();

        let content_filter = match &self.content_ids {
            Some(ids) => {
                format!(
                    "select id from {}",
                    self.dialect.id_set_table(ids, "i", &mut params)
                )
            }
            None => "select content_id from content".to_string(),
        };

        let sql = format!(
            "select ca.attribute_id as attribute_id, \
             s.site_id as site_id, \
             s.upload_url_prefix as upload_url_prefix, \
             s.upload_url as upload_url, \
             s.use_absolute_upload_url as use_absolute_upload_url, \
             s.dns as dns, \
             s.stage_dns as stage_dns, \
             s.replace_urls as replace_urls, \
             s.live_virtual_root as live_virtual_root, \
             s.stage_virtual_root as stage_virtual_root, \
             s.is_live as is_live, \
             ca.content_id as content_id, \
             ca.friendly_name as friendly_name, \
             ca.attribute_name as attribute_name, \
             at.type_name as type_name, \
             ca.index_flag as index_flag, \
             ca.link_id as m2m_relation_id, \
             case when ctc.l_content_id = c.content_id then ctc.r_content_id \
                  when ctc.r_content_id = c.content_id then ctc.l_content_id end as related_m2m_content_id, \
             case when ctc.l_content_id = c.content_id then 0 \
                  when ctc.r_content_id = c.content_id then 1 end as m2m_is_backward, \
             rca.content_id as related_o2m_content_id, \
             bca.content_id as related_m2o_content_id, \
             bca.attribute_name as m2o_backward_field, \
             ca.classifier_attribute_id as classifier_attribute_id, \
             ca.is_classifier as is_classifier, \
             c.content_name as content_friendly_name, \
             c.net_content_name as content_alias_singular, \
             c.net_plural_content_name as content_alias_plural, \
             c.description as content_description, \
             ca.subfolder as subfolder, \
             ca.use_site_library as use_site_library \
             from content_attribute ca \
             join content c on c.content_id = ca.content_id \
             join site s on c.site_id = s.site_id \
             join attribute_type at on at.attribute_type_id = ca.attribute_type_id \
             left join content_to_content ctc on ctc.link_id = ca.link_id \
             left join content_attribute rca on rca.attribute_id = ca.related_attribute_id \
             left join content_attribute bca on bca.attribute_id = ca.back_related_attribute_id \
             where c.content_id in ({content_filter})"
        );

        tracing::debug!(query = %sql, params = %Params(&params));
        let result = self.connection.query_raw(&sql, &params).await?;

        let mut sites: BTreeMap<i64, Arc<Site>> = BTreeMap::new();
        let mut contents = ContentCatalog::new();

        for row in result {
            let Some(site_id) = get_i64(&row, "site_id") else { continue };
            let Some(content_id) = get_i64(&row, "content_id") else { continue };

            let site = sites
                .entry(site_id)
                .or_insert_with(|| Arc::new(parse_site(&row, site_id)))
                .clone();

            let content = contents
                .entry(content_id)
                .or_insert_with(|| parse_content(&row, content_id, site));

            match parse_attribute(&row, content_id) {
                Some(attribute) => content.attributes.push(attribute),
                None => {
                    tracing::warn!(
                        content_type_id = content_id,
                        attribute = ?row.get("attribute_name"),
                        "attribute has an unknown declared type, skipping",
                    );
                }
            }
        }

        tracing::info!(content_types = contents.len(), "content catalog loaded");

        Ok(contents)
    }
}

fn parse_site(row: &ResultRow, site_id: i64) -> Site {
    Site {
        id: site_id,
        dns: get_string(row, "dns").unwrap_or_default(),
        stage_dns: get_string(row, "stage_dns"),
        upload_url_prefix: get_string(row, "upload_url_prefix"),
        upload_url: get_string(row, "upload_url").unwrap_or_default(),
        use_absolute_upload_url: get_bool(row, "use_absolute_upload_url"),
        replace_urls: get_bool(row, "replace_urls"),
        live_virtual_root: get_string(row, "live_virtual_root").unwrap_or_default(),
        stage_virtual_root: get_string(row, "stage_virtual_root").unwrap_or_default(),
        is_live: get_bool(row, "is_live"),
        ..Default::default()
    }
}

fn parse_content(row: &ResultRow, content_id: i64, site: Arc<Site>) -> ContentType {
    ContentType {
        id: content_id,
        friendly_name: get_string(row, "content_friendly_name")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| format!("Content {content_id}")),
        alias_singular: get_string(row, "content_alias_singular")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| format!("Content{content_id}")),
        alias_plural: get_string(row, "content_alias_plural")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| format!("Contents{content_id}")),
        description: get_string(row, "content_description"),
        site,
        attributes: Vec::new(),
        extensions: Vec::new(),
    }
}

fn parse_attribute(row: &ResultRow, content_id: i64) -> Option<Attribute> {
    let alias = get_string(row, "attribute_name")?;
    let type_name = AttributeType::parse(&get_string(row, "type_name")?).ok()?;

    Some(Attribute {
        id: get_i64(row, "attribute_id")?,
        content_type_id: content_id,
        friendly_name: get_string(row, "friendly_name")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| format!("Field {alias}")),
        schema_alias: alias.clone(),
        alias,
        type_name,
        indexed: get_bool(row, "index_flag"),
        required: false,
        related_o2m_content_id: get_i64(row, "related_o2m_content_id"),
        related_m2m_content_id: get_i64(row, "related_m2m_content_id"),
        m2m_relation_id: get_i64(row, "m2m_relation_id"),
        m2m_is_backward: row.get("m2m_is_backward").and_then(|v| v.as_bool()),
        related_m2o_content_id: get_i64(row, "related_m2o_content_id"),
        m2o_backward_field: get_string(row, "m2o_backward_field"),
        classifier_attribute_id: get_i64(row, "classifier_attribute_id"),
        is_classifier: get_bool(row, "is_classifier"),
        sub_folder: get_string(row, "subfolder"),
        use_site_library: get_bool(row, "use_site_library"),
    })
}

fn get_i64(row: &ResultRow, column: &str) -> Option<i64> {
    row.get(column).and_then(|v| v.as_i64())
}

fn get_string(row: &ResultRow, column: &str) -> Option<String> {
    row.get(column).and_then(|v| v.as_str()).map(|s| s.to_string())
}

/// Catalog flags arrive as native booleans, 0/1 numerics or "0"/"1" text
/// depending on the backend.
fn get_bool(row: &ResultRow, column: &str) -> bool {
    match row.get(column) {
        Some(Value::Text(Some(s))) => s == "1",
        Some(value) => value.as_bool().unwrap_or(false),
        None => false,
    }
}
