use crate::{
    EnumType, EnumTypeId, FilterMap, InputField, InputObjectType, InputObjectTypeId, ObjectKind,
    ObjectType, ObjectTypeId,
};
use content_metadata::{ContentCatalog, RootContext};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::sync::Arc;

/// The root query fields' tags: what kind of top-level query a field is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryTag {
    /// Singular point lookup by id.
    FindById,
    /// Plural Relay connection field.
    FindMany,
}

#[derive(Debug, Clone)]
pub struct RootField {
    pub name: String,
    pub description: Option<String>,
    pub content_type_id: i64,
    pub tag: QueryTag,
    pub arguments: Vec<InputField>,
}

/// The complete generated type graph for one schema generation. Immutable
/// once built; read-shared across all concurrent requests.
#[derive(Debug, Default)]
pub struct QuerySchema {
    pub(crate) object_types: Vec<ObjectType>,
    pub(crate) enum_types: Vec<EnumType>,
    pub(crate) input_object_types: Vec<InputObjectType>,

    pub(crate) query_fields: IndexMap<String, RootField>,

    /// Content type id → its graph type (the interface for extended types).
    pub(crate) content_objects: HashMap<i64, ObjectTypeId>,
    pub(crate) connections: HashMap<i64, ObjectTypeId>,
    pub(crate) order_enums: HashMap<i64, EnumTypeId>,
    pub(crate) filter_objects: HashMap<i64, InputObjectTypeId>,
    pub(crate) filters: HashMap<i64, FilterMap>,
    pub(crate) contexts: HashMap<i64, Arc<RootContext>>,

    /// The validated catalog the schema was generated from.
    pub(crate) catalog: Arc<ContentCatalog>,
    /// Site-level API key the transport checks inbound requests against.
    pub(crate) api_key: Option<String>,
}

impl QuerySchema {
    pub fn object_type(&self, id: ObjectTypeId) -> &ObjectType {
        &self.object_types[id.0]
    }

    pub fn enum_type(&self, id: EnumTypeId) -> &EnumType {
        &self.enum_types[id.0]
    }

    pub fn input_object_type(&self, id: InputObjectTypeId) -> &InputObjectType {
        &self.input_object_types[id.0]
    }

    pub fn root_field(&self, name: &str) -> Option<&RootField> {
        self.query_fields.get(name)
    }

    pub fn root_fields(&self) -> impl Iterator<Item = &RootField> {
        self.query_fields.values()
    }

    /// The graph type of a content type: its object type, or the interface
    /// type when the content type has extensions.
    pub fn content_object(&self, content_type_id: i64) -> Option<&ObjectType> {
        self.content_objects
            .get(&content_type_id)
            .map(|id| self.object_type(*id))
    }

    /// Resolve the concrete object type for a row: the implementation
    /// matching the row's extension content id, or the base type.
    pub fn resolve_concrete(
        &self,
        content_type_id: i64,
        extension_content_id: Option<i64>,
    ) -> Option<&ObjectType> {
        let object = self.content_object(content_type_id)?;

        match &object.kind {
            ObjectKind::Interface { base, implementations } => {
                let id = extension_content_id
                    .and_then(|ext| {
                        implementations
                            .iter()
                            .find(|(implementation_id, _)| *implementation_id == ext)
                            .map(|(_, object_id)| *object_id)
                    })
                    .unwrap_or(*base);

                Some(self.object_type(id))
            }
            _ => Some(object),
        }
    }

    pub fn connection_type(&self, content_type_id: i64) -> Option<&ObjectType> {
        self.connections
            .get(&content_type_id)
            .map(|id| self.object_type(*id))
    }

    pub fn order_enum(&self, content_type_id: i64) -> Option<&EnumType> {
        self.order_enums
            .get(&content_type_id)
            .map(|id| self.enum_type(*id))
    }

    pub fn filter_object(&self, content_type_id: i64) -> Option<&InputObjectType> {
        self.filter_objects
            .get(&content_type_id)
            .map(|id| self.input_object_type(*id))
    }

    pub fn filter_map(&self, content_type_id: i64) -> Option<&FilterMap> {
        self.filters.get(&content_type_id)
    }

    pub fn context(&self, content_type_id: i64) -> Option<&Arc<RootContext>> {
        self.contexts.get(&content_type_id)
    }

    pub fn catalog(&self) -> &ContentCatalog {
        &self.catalog
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }
}
