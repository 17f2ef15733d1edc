use super::Builder;
use crate::{
    FieldResolution, Identifier, InnerOutputType, InputField, InputType, ObjectKind, ObjectType,
    ObjectTypeId, OutputField, OutputType, ScalarKind, SchemaBuildError, SystemFieldKind,
};
use content_metadata::{system_fields, Attribute, AttributeType, ContentType, RelationKind};

/// The system fields shared by every content object and interface.
pub(super) fn system_fields() -> Vec<OutputField> {
    vec![
        OutputField {
            name: system_fields::ID.name.to_string(),
            description: Some(system_fields::ID.description.to_string()),
            field_type: OutputType::scalar(ScalarKind::Int),
            is_nullable: false,
            arguments: vec![],
            resolution: FieldResolution::System(SystemFieldKind::Id),
        },
        OutputField {
            name: system_fields::STATUS_TYPE_ID.name.to_string(),
            description: Some(system_fields::STATUS_TYPE_ID.description.to_string()),
            field_type: OutputType::scalar(ScalarKind::Int),
            is_nullable: true,
            arguments: vec![],
            resolution: FieldResolution::System(SystemFieldKind::StatusTypeId),
        },
        OutputField {
            name: system_fields::CREATED.name.to_string(),
            description: Some(system_fields::CREATED.description.to_string()),
            field_type: OutputType::scalar(ScalarKind::DateTime),
            is_nullable: true,
            arguments: vec![],
            resolution: FieldResolution::System(SystemFieldKind::Created),
        },
        OutputField {
            name: system_fields::MODIFIED.name.to_string(),
            description: Some(system_fields::MODIFIED.description.to_string()),
            field_type: OutputType::scalar(ScalarKind::DateTime),
            is_nullable: true,
            arguments: vec![],
            resolution: FieldResolution::System(SystemFieldKind::Modified),
        },
        OutputField {
            name: system_fields::LAST_MODIFIED_BY.name.to_string(),
            description: Some(system_fields::LAST_MODIFIED_BY.description.to_string()),
            field_type: OutputType::scalar(ScalarKind::Int),
            is_nullable: true,
            arguments: vec![],
            resolution: FieldResolution::System(SystemFieldKind::LastModifiedBy),
        },
    ]
}

/// Map one attribute to an output field. Classifier attributes are filtered
/// out by the caller; a relation pointing outside the catalog degrades to a
/// plain integer field; unclassifiable relation metadata aborts the build.
pub(super) fn attribute_field(
    builder: &Builder,
    content: &ContentType,
    attribute: &Attribute,
) -> Result<Option<OutputField>, SchemaBuildError> {
    let query_alias = query_alias(attribute);

    let field = match attribute.type_name {
        AttributeType::String | AttributeType::Textbox | AttributeType::RichText => scalar_field(
            attribute,
            ScalarKind::String,
            FieldResolution::Scalar {
                query_alias,
                kind: ScalarKind::String,
                site: Some(content.site.clone()),
            },
        ),
        AttributeType::Numeric => plain_scalar_field(attribute, ScalarKind::Decimal, query_alias),
        AttributeType::Boolean => plain_scalar_field(attribute, ScalarKind::Boolean, query_alias),
        AttributeType::Date => plain_scalar_field(attribute, ScalarKind::Date, query_alias),
        AttributeType::Time => plain_scalar_field(attribute, ScalarKind::Time, query_alias),
        AttributeType::DateTime => plain_scalar_field(attribute, ScalarKind::DateTime, query_alias),
        AttributeType::File | AttributeType::Image | AttributeType::DynamicImage => scalar_field(
            attribute,
            ScalarKind::Uri,
            FieldResolution::MediaUrl {
                query_alias,
                base_url: attribute.media_base_url(&content.site, true, false),
            },
        ),
        AttributeType::Relation | AttributeType::RelationManyToOne => {
            match attribute.relation_kind()? {
                Some(RelationKind::ClassifierLink { .. }) | None => return Ok(None),
                Some(RelationKind::OneToMany { related_content_id }) => {
                    match builder.content_object_id(related_content_id) {
                        Some(object) => OutputField {
                            name: attribute.schema_alias.clone(),
                            description: Some(attribute.friendly_name.clone()),
                            field_type: OutputType::object(object),
                            is_nullable: true,
                            arguments: vec![],
                            resolution: FieldResolution::RelationOneToMany {
                                query_alias,
                                related_content_id,
                            },
                        },
                        None => degraded_field(attribute, query_alias),
                    }
                }
                Some(RelationKind::ManyToMany {
                    relation_id,
                    related_content_id,
                    is_backward,
                }) => match builder.content_object_id(related_content_id) {
                    Some(object) => OutputField {
                        name: attribute.schema_alias.clone(),
                        description: Some(attribute.friendly_name.clone()),
                        field_type: OutputType::list(InnerOutputType::Object(object)),
                        is_nullable: true,
                        arguments: relation_arguments(builder, related_content_id),
                        resolution: FieldResolution::RelationManyToMany {
                            attribute_id: attribute.id,
                            query_alias,
                            relation_id,
                            is_backward,
                            related_content_id,
                        },
                    },
                    None => degraded_field(attribute, query_alias),
                },
                Some(RelationKind::ManyToOne {
                    related_content_id,
                    backward_field,
                }) => match builder.content_object_id(related_content_id) {
                    Some(object) => OutputField {
                        name: attribute.schema_alias.clone(),
                        description: Some(attribute.friendly_name.clone()),
                        field_type: OutputType::list(InnerOutputType::Object(object)),
                        is_nullable: true,
                        arguments: relation_arguments(builder, related_content_id),
                        resolution: FieldResolution::RelationManyToOne {
                            attribute_id: attribute.id,
                            related_content_id,
                            backward_field,
                        },
                    },
                    None => degraded_field(attribute, query_alias),
                },
            }
        }
    };

    Ok(Some(field))
}

fn plain_scalar_field(attribute: &Attribute, kind: ScalarKind, query_alias: String) -> OutputField {
    scalar_field(
        attribute,
        kind,
        FieldResolution::Scalar {
            query_alias,
            kind,
            site: None,
        },
    )
}

fn scalar_field(attribute: &Attribute, kind: ScalarKind, resolution: FieldResolution) -> OutputField {
    OutputField {
        name: attribute.schema_alias.clone(),
        description: Some(attribute.friendly_name.clone()),
        field_type: OutputType::scalar(kind),
        is_nullable: !attribute.required,
        arguments: vec![],
        resolution,
    }
}

fn degraded_field(attribute: &Attribute, query_alias: String) -> OutputField {
    OutputField {
        name: attribute.schema_alias.clone(),
        description: Some(attribute.friendly_name.clone()),
        field_type: OutputType::scalar(ScalarKind::Int),
        is_nullable: true,
        arguments: vec![],
        resolution: FieldResolution::DegradedRelation { query_alias },
    }
}

fn relation_arguments(builder: &Builder, related_content_id: i64) -> Vec<InputField> {
    let mut arguments = Vec::with_capacity(2);

    if let Some(filter) = builder.filter_object_id(related_content_id) {
        arguments.push(InputField::new("filter", InputType::Object(filter)).description("Filter by"));
    }

    if let Some(order_enum) = builder.order_enum_id(related_content_id) {
        arguments.push(
            InputField::new("order", InputType::list(InputType::Enum(order_enum))).description("Order by"),
        );
    }

    arguments
}

fn query_alias(attribute: &Attribute) -> String {
    format!(
        "cid_{}_{}",
        attribute.content_type_id,
        attribute.alias.to_lowercase()
    )
}

pub(super) fn page_info_type() -> ObjectType {
    ObjectType {
        identifier: Identifier::new("PageInfo"),
        description: Some("Cursor-based pagination details.".to_string()),
        content_type_id: None,
        kind: ObjectKind::Object,
        fields: vec![
            structural_field("hasNextPage", OutputType::scalar(ScalarKind::Boolean), false),
            structural_field("hasPreviousPage", OutputType::scalar(ScalarKind::Boolean), false),
            structural_field("startCursor", OutputType::scalar(ScalarKind::String), true),
            structural_field("endCursor", OutputType::scalar(ScalarKind::String), true),
        ],
    }
}

pub(super) fn edge_type(type_name: &str, content: &ContentType, node: ObjectTypeId) -> ObjectType {
    ObjectType {
        identifier: Identifier::edge(type_name),
        description: Some(format!(
            "Edge of a connection containing a node (a row of `{}`) and cursor",
            content.alias_singular
        )),
        content_type_id: None,
        kind: ObjectKind::Object,
        fields: vec![
            OutputField {
                name: "node".to_string(),
                description: Some(format!(
                    "A single row of `{}` within the result data set.",
                    content.alias_singular
                )),
                field_type: OutputType::object(node),
                is_nullable: false,
                arguments: vec![],
                resolution: FieldResolution::Structural,
            },
            structural_field("cursor", OutputType::scalar(ScalarKind::String), false),
        ],
    }
}

pub(super) fn connection_type(
    type_name: &str,
    content: &ContentType,
    node: ObjectTypeId,
    edge: ObjectTypeId,
    page_info: ObjectTypeId,
) -> ObjectType {
    ObjectType {
        identifier: Identifier::connection(type_name),
        description: Some(format!(
            "A connection to a list of objects of type `{}`",
            content.alias_singular
        )),
        content_type_id: Some(content.id),
        kind: ObjectKind::Connection { node, edge },
        fields: vec![
            structural_field("totalCount", OutputType::scalar(ScalarKind::Int), true),
            structural_field("pageInfo", OutputType::object(page_info), false),
            structural_field("edges", OutputType::list(InnerOutputType::Object(edge)), true),
            structural_field("items", OutputType::list(InnerOutputType::Object(node)), true),
        ],
    }
}

fn structural_field(name: &str, field_type: OutputType, is_nullable: bool) -> OutputField {
    OutputField {
        name: name.to_string(),
        description: None,
        field_type,
        is_nullable,
        arguments: vec![],
        resolution: FieldResolution::Structural,
    }
}
