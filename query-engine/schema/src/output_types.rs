use crate::{EnumTypeId, Identifier, InputField, ObjectTypeId};
use content_metadata::Site;
use std::sync::Arc;

/// A scalar kind of the graph, mapped 1:1 from the attribute vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    String,
    Int,
    Decimal,
    Boolean,
    Date,
    Time,
    DateTime,
    /// Media fields serialize as a URI composed from site metadata.
    Uri,
}

#[derive(Debug, Clone)]
pub struct OutputType {
    pub is_list: bool,
    pub inner: InnerOutputType,
}

#[derive(Debug, Clone)]
pub enum InnerOutputType {
    Scalar(ScalarKind),
    Enum(EnumTypeId),
    Object(ObjectTypeId),
}

impl OutputType {
    pub fn scalar(kind: ScalarKind) -> Self {
        OutputType {
            is_list: false,
            inner: InnerOutputType::Scalar(kind),
        }
    }

    pub fn object(id: ObjectTypeId) -> Self {
        OutputType {
            is_list: false,
            inner: InnerOutputType::Object(id),
        }
    }

    pub fn list(inner: InnerOutputType) -> Self {
        OutputType { is_list: true, inner }
    }

    pub fn as_object_type(&self) -> Option<ObjectTypeId> {
        match self.inner {
            InnerOutputType::Object(id) => Some(id),
            _ => None,
        }
    }
}

/// An object or interface type of the generated graph.
#[derive(Debug, Clone)]
pub struct ObjectType {
    pub identifier: Identifier,
    pub description: Option<String>,
    /// The content type this object maps to, if any. Connection, edge and
    /// page-info types have none.
    pub content_type_id: Option<i64>,
    pub kind: ObjectKind,
    pub fields: Vec<OutputField>,
}

#[derive(Debug, Clone)]
pub enum ObjectKind {
    Object,
    /// Synthesized for a base type with extensions. Rows resolve to the
    /// implementation matching their extension content id, defaulting to
    /// the base implementation.
    Interface {
        base: ObjectTypeId,
        implementations: Vec<(i64, ObjectTypeId)>,
    },
    Connection {
        node: ObjectTypeId,
        edge: ObjectTypeId,
    },
}

impl ObjectType {
    pub fn find_field(&self, name: &str) -> Option<&OutputField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone)]
pub struct OutputField {
    pub name: String,
    pub description: Option<String>,
    pub field_type: OutputType,
    pub is_nullable: bool,
    /// Arguments are input fields positioned on an output field; only
    /// relation list fields carry them (filter/order of the target type).
    pub arguments: Vec<InputField>,
    pub resolution: FieldResolution,
}

/// How a field of a content object resolves against a row.
#[derive(Debug, Clone)]
pub enum FieldResolution {
    /// One of the synthetic system fields.
    System(SystemFieldKind),
    /// A plain column read from the row's field bag. String kinds carry the
    /// site for URL placeholder substitution.
    Scalar {
        query_alias: String,
        kind: ScalarKind,
        site: Option<Arc<Site>>,
    },
    /// A media column serialized as `{base_url}/{value}`.
    MediaUrl {
        query_alias: String,
        base_url: String,
    },
    /// Forward relation: the column holds the related row id.
    RelationOneToMany {
        query_alias: String,
        related_content_id: i64,
    },
    /// Many-to-many through a link table; the column holds the per-row
    /// relation id, falling back to the attribute's relation id.
    RelationManyToMany {
        attribute_id: i64,
        query_alias: String,
        relation_id: i64,
        is_backward: bool,
        related_content_id: i64,
    },
    /// Backward relation resolved through the related table's forward
    /// reference column.
    RelationManyToOne {
        attribute_id: i64,
        related_content_id: i64,
        backward_field: String,
    },
    /// A relation whose target content type is not part of the catalog,
    /// degraded to a plain integer field.
    DegradedRelation { query_alias: String },
    /// Structural fields of connection/edge/page-info types, resolved by
    /// the executor from the pagination result rather than from a row.
    Structural,
}

/// The system fields every content type exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemFieldKind {
    Id,
    StatusTypeId,
    Created,
    Modified,
    LastModifiedBy,
}
