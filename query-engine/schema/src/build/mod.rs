mod enum_types;
mod filter_types;
mod object_types;

use crate::{
    EnumTypeId, Identifier, InputField, InputObjectType, InputObjectTypeId, InputType, ObjectKind,
    ObjectType, ObjectTypeId, QuerySchema, QueryTag, RootField, ScalarKind, SchemaBuildError,
};
use content_metadata::ContentCatalog;
use std::sync::Arc;

/// Build the full query schema from a validated catalog. Type shells are
/// allocated first so relation fields can reference any type, including
/// self-references and types defined later in the catalog; fields are wired
/// once every shell exists.
pub fn build(catalog: ContentCatalog, api_key: Option<String>) -> Result<QuerySchema, SchemaBuildError> {
    let mut builder = Builder::new(catalog);

    builder.build_shells();
    builder.build_order_enums();
    builder.build_filter_types();
    builder.build_connection_types();
    builder.wire_fields()?;
    builder.build_root_fields();

    tracing::info!(
        content_types = builder.schema.content_objects.len(),
        object_types = builder.schema.object_types.len(),
        "query schema generated",
    );

    Ok(builder.finish(api_key))
}

pub(crate) struct Builder {
    catalog: Arc<ContentCatalog>,
    schema: QuerySchema,
}

impl Builder {
    fn new(catalog: ContentCatalog) -> Self {
        let catalog = Arc::new(catalog);

        Builder {
            schema: QuerySchema {
                catalog: catalog.clone(),
                ..Default::default()
            },
            catalog,
        }
    }

    fn finish(mut self, api_key: Option<String>) -> QuerySchema {
        self.schema.api_key = api_key;
        self.schema
    }

    pub(crate) fn push_object(&mut self, object: ObjectType) -> ObjectTypeId {
        self.schema.object_types.push(object);
        ObjectTypeId(self.schema.object_types.len() - 1)
    }

    fn push_input_object(&mut self, object: InputObjectType) -> InputObjectTypeId {
        self.schema.input_object_types.push(object);
        InputObjectTypeId(self.schema.input_object_types.len() - 1)
    }

    /// Pass 1: one shell per graph type, no fields yet. Base types with
    /// extensions get an interface shell plus concrete shells for the base
    /// and every extension.
    fn build_shells(&mut self) {
        let catalog = self.catalog.clone();

        for content in catalog.values() {
            if content.has_extensions() {
                let base = self.push_object(ObjectType {
                    identifier: Identifier::new(&content.alias_singular),
                    description: Some(content.friendly_name.clone()),
                    content_type_id: Some(content.id),
                    kind: ObjectKind::Object,
                    fields: vec![],
                });

                let implementations = content
                    .extensions
                    .iter()
                    .map(|extension| {
                        let id = self.push_object(ObjectType {
                            identifier: Identifier::new(&extension.alias_singular),
                            description: Some(extension.friendly_name.clone()),
                            content_type_id: Some(extension.id),
                            kind: ObjectKind::Object,
                            fields: vec![],
                        });

                        (extension.id, id)
                    })
                    .collect();

                let interface = self.push_object(ObjectType {
                    identifier: Identifier::interface(&content.alias_singular),
                    description: Some(content.friendly_name.clone()),
                    content_type_id: Some(content.id),
                    kind: ObjectKind::Interface { base, implementations },
                    fields: vec![],
                });

                self.schema.content_objects.insert(content.id, interface);
            } else {
                let object = self.push_object(ObjectType {
                    identifier: Identifier::new(&content.alias_singular),
                    description: Some(content.friendly_name.clone()),
                    content_type_id: Some(content.id),
                    kind: ObjectKind::Object,
                    fields: vec![],
                });

                self.schema.content_objects.insert(content.id, object);
            }

            self.schema
                .contexts
                .insert(content.id, Arc::new(content.root_context()));
        }
    }

    fn build_order_enums(&mut self) {
        let catalog = self.catalog.clone();

        for content in catalog.values() {
            let type_name = self.type_name(content.id).to_string();

            if let Some(enum_type) = enum_types::order_enum(content, &type_name) {
                self.schema.enum_types.push(enum_type);
                self.schema
                    .order_enums
                    .insert(content.id, EnumTypeId(self.schema.enum_types.len() - 1));
            }
        }
    }

    fn build_filter_types(&mut self) {
        let catalog = self.catalog.clone();

        for content in catalog.values() {
            let type_name = self.type_name(content.id).to_string();
            let (filter_type, filter_map) = filter_types::filter_type(content, &type_name);

            let id = self.push_input_object(filter_type);
            self.schema.filter_objects.insert(content.id, id);
            self.schema.filters.insert(content.id, filter_map);
        }
    }

    fn build_connection_types(&mut self) {
        let page_info = self.push_object(object_types::page_info_type());
        let catalog = self.catalog.clone();

        for content in catalog.values() {
            let node = self.schema.content_objects[&content.id];
            let type_name = self.type_name(content.id).to_string();

            let edge = self.push_object(object_types::edge_type(&type_name, content, node));
            let connection =
                self.push_object(object_types::connection_type(&type_name, content, node, edge, page_info));

            self.schema.connections.insert(content.id, connection);
        }
    }

    /// Pass 2: wire fields now that every shell, enum and filter exists.
    /// The interface and every implementation carry the system fields and
    /// the base attributes; extension implementations append their own.
    fn wire_fields(&mut self) -> Result<(), SchemaBuildError> {
        let catalog = self.catalog.clone();

        for content in catalog.values() {
            let object_id = self.schema.content_objects[&content.id];
            let mut base_fields = object_types::system_fields();

            for attribute in &content.attributes {
                if attribute.is_classifier {
                    continue;
                }

                if let Some(field) = object_types::attribute_field(self, content, attribute)? {
                    base_fields.push(field);
                }
            }

            match self.schema.object_types[object_id.0].kind.clone() {
                ObjectKind::Interface { base, implementations } => {
                    for extension in &content.extensions {
                        let Some((_, extension_object)) = implementations
                            .iter()
                            .find(|(content_id, _)| *content_id == extension.id)
                        else {
                            continue;
                        };

                        let mut fields = base_fields.clone();

                        for attribute in &extension.attributes {
                            if attribute.classifier_attribute_id.is_some() {
                                continue;
                            }

                            if let Some(field) =
                                object_types::attribute_field(self, extension, attribute)?
                            {
                                fields.push(field);
                            }
                        }

                        self.schema.object_types[extension_object.0].fields = fields;
                    }

                    self.schema.object_types[base.0].fields = base_fields.clone();
                    self.schema.object_types[object_id.0].fields = base_fields;
                }
                _ => {
                    self.schema.object_types[object_id.0].fields = base_fields;
                }
            }
        }

        Ok(())
    }

    fn build_root_fields(&mut self) {
        let catalog = self.catalog.clone();

        for content in catalog.values() {
            self.schema.query_fields.insert(
                content.alias_singular.clone(),
                RootField {
                    name: content.alias_singular.clone(),
                    description: Some(format!("{} by id", content.friendly_name)),
                    content_type_id: content.id,
                    tag: QueryTag::FindById,
                    arguments: vec![InputField::new("id", InputType::Scalar(ScalarKind::Int))
                        .description("Id of the row")
                        .required()],
                },
            );

            let mut arguments = vec![
                InputField::new("skip", InputType::Scalar(ScalarKind::Int))
                    .description("Skips edges before selection"),
                InputField::new("after", InputType::Scalar(ScalarKind::String))
                    .description("Only return edges after the specified cursor."),
                InputField::new("first", InputType::Scalar(ScalarKind::Int)).description(
                    "Maximum number of edges to return, starting after the 'after' cursor.",
                ),
                InputField::new("before", InputType::Scalar(ScalarKind::String))
                    .description("Only return edges prior to the specified cursor."),
                InputField::new("last", InputType::Scalar(ScalarKind::Int)).description(
                    "Maximum number of edges to return, starting prior to the 'before' cursor.",
                ),
                InputField::new("filter", InputType::Object(self.schema.filter_objects[&content.id]))
                    .description("Filter by"),
            ];

            if let Some(order_enum) = self.schema.order_enums.get(&content.id) {
                arguments.push(
                    InputField::new("order", InputType::list(InputType::Enum(*order_enum)))
                        .description("Order by"),
                );
            }

            self.schema.query_fields.insert(
                content.alias_plural.clone(),
                RootField {
                    name: content.alias_plural.clone(),
                    description: Some(format!("{} list", content.friendly_name)),
                    content_type_id: content.id,
                    tag: QueryTag::FindMany,
                    arguments,
                },
            );
        }
    }

    /// The exposed type name of a content type: the interface name when the
    /// type has extensions (connection, edge and filter names derive from
    /// it), the object name otherwise.
    fn type_name(&self, content_type_id: i64) -> &str {
        let object = self.schema.content_objects[&content_type_id];
        self.schema.object_types[object.0].identifier.name()
    }

    pub(crate) fn catalog(&self) -> &ContentCatalog {
        &self.catalog
    }

    pub(crate) fn content_object_id(&self, content_type_id: i64) -> Option<ObjectTypeId> {
        self.schema.content_objects.get(&content_type_id).copied()
    }

    pub(crate) fn order_enum_id(&self, content_type_id: i64) -> Option<EnumTypeId> {
        self.schema.order_enums.get(&content_type_id).copied()
    }

    pub(crate) fn filter_object_id(&self, content_type_id: i64) -> Option<InputObjectTypeId> {
        self.schema.filter_objects.get(&content_type_id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FieldResolution, InnerOutputType};
    use content_metadata::{validate, Attribute, AttributeType, ContentType, Site};
    use pretty_assertions::assert_eq;

    fn site() -> Arc<Site> {
        Arc::new(Site::default())
    }

    fn content(id: i64, singular: &str, plural: &str) -> ContentType {
        ContentType {
            id,
            friendly_name: format!("Content {id}"),
            alias_singular: singular.into(),
            alias_plural: plural.into(),
            description: None,
            site: site(),
            attributes: vec![],
            extensions: vec![],
        }
    }

    fn attribute(id: i64, content_id: i64, alias: &str, type_name: AttributeType) -> Attribute {
        Attribute {
            id,
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

    fn catalog(contents: Vec<ContentType>) -> ContentCatalog {
        validate(contents.into_iter().map(|c| (c.id, c)).collect())
    }

    fn extended_catalog() -> ContentCatalog {
        let mut base = content(1, "Page", "Pages");
        let mut classifier = attribute(10, 1, "kind", AttributeType::Relation);
        classifier.is_classifier = true;
        base.attributes.push(classifier);
        base.attributes.push(attribute(11, 1, "Title", AttributeType::String));

        let mut video = content(2, "VideoPage", "VideoPages");
        let mut link = attribute(20, 2, "parent", AttributeType::Relation);
        link.classifier_attribute_id = Some(10);
        link.related_o2m_content_id = Some(1);
        video.attributes.push(link);
        video.attributes.push(attribute(21, 2, "Url", AttributeType::String));

        let mut audio = content(3, "AudioPage", "AudioPages");
        let mut link = attribute(30, 3, "parent", AttributeType::Relation);
        link.classifier_attribute_id = Some(10);
        link.related_o2m_content_id = Some(1);
        audio.attributes.push(link);

        catalog(vec![base, video, audio])
    }

    #[test]
    fn interface_implementations_are_base_plus_extensions() {
        let schema = build(extended_catalog(), None).unwrap();

        let interface = schema.content_object(1).unwrap();
        assert_eq!(interface.identifier.name(), "PageInterface");

        let ObjectKind::Interface { base, implementations } = &interface.kind else {
            panic!("expected an interface type");
        };

        assert_eq!(schema.object_type(*base).identifier.name(), "Page");

        let implementation_names: Vec<_> = implementations
            .iter()
            .map(|(_, id)| schema.object_type(*id).identifier.name().to_string())
            .collect();

        assert_eq!(implementation_names, vec!["VideoPage", "AudioPage"]);

        // Every implementation exposes the full system field set.
        for (_, id) in implementations {
            let object = schema.object_type(*id);

            for field in ["Id", "StatusTypeId", "Created", "Modified", "LastModifiedBy"] {
                assert!(object.find_field(field).is_some(), "{field} missing");
            }
        }
    }

    #[test]
    fn rows_resolve_to_the_matching_implementation_or_the_base() {
        let schema = build(extended_catalog(), None).unwrap();

        assert_eq!(schema.resolve_concrete(1, Some(2)).unwrap().identifier.name(), "VideoPage");
        assert_eq!(schema.resolve_concrete(1, Some(3)).unwrap().identifier.name(), "AudioPage");
        assert_eq!(schema.resolve_concrete(1, Some(77)).unwrap().identifier.name(), "Page");
        assert_eq!(schema.resolve_concrete(1, None).unwrap().identifier.name(), "Page");
    }

    #[test]
    fn extension_fields_merge_on_top_of_base_fields() {
        let schema = build(extended_catalog(), None).unwrap();
        let video = schema.resolve_concrete(1, Some(2)).unwrap();

        assert!(video.find_field("Title").is_some());
        assert!(video.find_field("Url").is_some());

        let base = schema.resolve_concrete(1, None).unwrap();
        assert!(base.find_field("Title").is_some());
        assert!(base.find_field("Url").is_none());
    }

    #[test]
    fn empty_content_type_still_gets_system_fields() {
        let schema = build(catalog(vec![content(5, "Empty", "Empties")]), None).unwrap();
        let object = schema.content_object(5).unwrap();

        assert_eq!(object.fields.len(), 5);
        assert!(object.fields.iter().all(|f| matches!(f.resolution, FieldResolution::System(_))));
    }

    #[test]
    fn order_enum_is_omitted_without_indexed_fields() {
        let mut with_index = content(1, "Article", "Articles");
        let mut title = attribute(1, 1, "Title", AttributeType::String);
        title.indexed = true;
        with_index.attributes.push(title);

        let plain = content(2, "Note", "Notes");

        let schema = build(catalog(vec![with_index, plain]), None).unwrap();

        let order = schema.order_enum(1).unwrap();
        assert_eq!(order.identifier.name(), "PossibleOrderForArticle");
        assert!(order.value("TitleAsc").is_some());
        assert!(order.value("TitleDesc").is_some());
        assert!(order.value("IdAsc").is_some());

        assert!(schema.order_enum(2).is_none());
    }

    #[test]
    fn filter_side_table_maps_generated_fields_to_definitions() {
        let mut c = content(1, "Article", "Articles");
        c.attributes.push(attribute(1, 1, "Title", AttributeType::String));
        c.attributes.push(attribute(2, 1, "Rating", AttributeType::Numeric));

        let schema = build(catalog(vec![c]), None).unwrap();
        let filters = schema.filter_map(1).unwrap();

        // Case-insensitive lookup, exactly like the argument matching.
        assert!(filters.get("titleLike").is_some());
        assert!(filters.get("TitleNotLike").is_some());
        assert!(filters.get("RatingGe").is_some());
        assert!(filters.get("IdEq").is_some());
        assert!(filters.get("TitleEq").is_none());
    }

    #[test]
    fn relation_to_absent_content_degrades_to_integer() {
        let mut c = content(1, "Article", "Articles");
        let mut author = attribute(1, 1, "Author", AttributeType::Relation);
        author.related_o2m_content_id = Some(999);
        c.attributes.push(author);

        let schema = build(catalog(vec![c]), None).unwrap();
        let object = schema.content_object(1).unwrap();
        let field = object.find_field("Author").unwrap();

        assert!(matches!(field.resolution, FieldResolution::DegradedRelation { .. }));
        assert!(matches!(field.field_type.inner, InnerOutputType::Scalar(ScalarKind::Int)));
    }

    #[test]
    fn ambiguous_relation_aborts_the_build() {
        let mut c = content(1, "Article", "Articles");
        c.attributes.push(attribute(1, 1, "Author", AttributeType::Relation));

        assert!(build(catalog(vec![c]), None).is_err());
    }

    #[test]
    fn root_fields_cover_every_content_type() {
        let mut article = content(1, "Article", "Articles");
        let mut title = attribute(1, 1, "Title", AttributeType::String);
        title.indexed = true;
        article.attributes.push(title);

        let schema = build(catalog(vec![article, content(2, "Note", "Notes")]), None).unwrap();

        let by_id = schema.root_field("Article").unwrap();
        assert_eq!(by_id.tag, QueryTag::FindById);
        assert!(by_id.arguments.iter().any(|a| a.name == "id" && a.is_required));

        let many = schema.root_field("Articles").unwrap();
        assert_eq!(many.tag, QueryTag::FindMany);

        let argument_names: Vec<_> = many.arguments.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(
            argument_names,
            vec!["skip", "after", "first", "before", "last", "filter", "order"]
        );

        // No indexed fields on Note, so no order argument.
        let note_many = schema.root_field("Notes").unwrap();
        assert!(!note_many.arguments.iter().any(|a| a.name == "order"));
    }
}
