use super::{ResourceScope, SchemaLoader};
use crate::{CoreResult, EngineSettings};
use async_trait::async_trait;
use schema::QuerySchema;
use sql_connection::Queryable;
use sql_query_connector::{MetadataAccessor, QueryDialect};
use std::sync::Arc;

/// The default schema loader: reads the catalog through the metadata
/// accessor, runs the validation pass and generates the schema. The
/// connection used for catalog loading becomes part of the generation's
/// resource scope.
pub struct CatalogSchemaLoader {
    connection: Arc<dyn Queryable>,
    dialect: Arc<dyn QueryDialect>,
    settings: EngineSettings,
    api_key: Option<String>,
}

impl CatalogSchemaLoader {
    pub fn new(
        connection: Arc<dyn Queryable>,
        dialect: Arc<dyn QueryDialect>,
        settings: EngineSettings,
        api_key: Option<String>,
    ) -> Self {
        CatalogSchemaLoader {
            connection,
            dialect,
            settings,
            api_key,
        }
    }
}

#[async_trait]
impl SchemaLoader for CatalogSchemaLoader {
    async fn load(&self) -> CoreResult<(QuerySchema, ResourceScope)> {
        let accessor = MetadataAccessor::new(
            self.connection.clone(),
            self.dialect.clone(),
            self.settings.content_ids.clone(),
        );

        let catalog = accessor.load_catalog().await?;
        let catalog = content_metadata::validate(catalog);
        let schema = schema::build(catalog, self.api_key.clone())?;

        Ok((
            schema,
            ResourceScope::new(Box::new(self.connection.clone())),
        ))
    }
}
