use crate::{MetadataError, Site};
use std::sync::Arc;

/// A logical row shape in the relational store, exposed as one graph type.
///
/// Built once per schema generation from the store's catalog tables and
/// immutable afterwards. A content type is either a base with extensions,
/// a stand-alone type, or an extension of another type.
#[derive(Debug, Clone)]
pub struct ContentType {
    pub id: i64,
    pub friendly_name: String,
    pub alias_singular: String,
    pub alias_plural: String,
    pub description: Option<String>,
    pub site: Arc<Site>,
    pub attributes: Vec<Attribute>,
    pub extensions: Vec<ContentType>,
}

impl ContentType {
    /// True if any attribute is a classifier, meaning rows of this type can
    /// belong to an extension sub-type.
    pub fn has_extensions(&self) -> bool {
        self.attributes.iter().any(|a| a.is_classifier)
    }

    /// True if any attribute links back to a classifier in another type.
    pub fn is_extension(&self) -> bool {
        self.attributes.iter().any(|a| a.classifier_attribute_id.is_some())
    }

    pub fn classifier(&self) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.is_classifier)
    }

    /// The attribute linking an extension back to its base type.
    pub fn classifier_link(&self) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.classifier_attribute_id.is_some())
    }
}

/// The declared type of an attribute, from the catalog's fixed vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    String,
    Textbox,
    RichText,
    Numeric,
    Boolean,
    Date,
    Time,
    DateTime,
    File,
    Image,
    DynamicImage,
    Relation,
    RelationManyToOne,
}

impl AttributeType {
    /// Parse the catalog's type-name spelling. `VisualEdit` is the legacy
    /// catalog name for rich text.
    pub fn parse(type_name: &str) -> Result<Self, MetadataError> {
        match type_name {
            "String" => Ok(AttributeType::String),
            "Textbox" => Ok(AttributeType::Textbox),
            "RichText" | "VisualEdit" => Ok(AttributeType::RichText),
            "Numeric" => Ok(AttributeType::Numeric),
            "Boolean" => Ok(AttributeType::Boolean),
            "Date" => Ok(AttributeType::Date),
            "Time" => Ok(AttributeType::Time),
            "DateTime" => Ok(AttributeType::DateTime),
            "File" => Ok(AttributeType::File),
            "Image" => Ok(AttributeType::Image),
            "DynamicImage" | "Dynamic Image" => Ok(AttributeType::DynamicImage),
            "Relation" => Ok(AttributeType::Relation),
            "RelationManyToOne" | "Relation Many-to-One" => Ok(AttributeType::RelationManyToOne),
            other => Err(MetadataError::UnknownAttributeType(other.to_string())),
        }
    }

    pub fn is_media(self) -> bool {
        matches!(
            self,
            AttributeType::File | AttributeType::Image | AttributeType::DynamicImage
        )
    }

    pub fn is_text(self) -> bool {
        matches!(
            self,
            AttributeType::String | AttributeType::Textbox | AttributeType::RichText
        )
    }
}

/// How a relation attribute relates two content types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationKind {
    OneToMany {
        related_content_id: i64,
    },
    ManyToMany {
        relation_id: i64,
        related_content_id: i64,
        is_backward: bool,
    },
    ManyToOne {
        related_content_id: i64,
        backward_field: String,
    },
    /// The link from an extension type back to its base type's classifier.
    ClassifierLink {
        base_content_id: i64,
        classifier_attribute_id: i64,
    },
}

/// One field of a content type.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub id: i64,
    pub content_type_id: i64,
    pub friendly_name: String,
    /// The physical column name.
    pub alias: String,
    /// The name exposed in the schema, collision-resolved by validation.
    pub schema_alias: String,
    pub type_name: AttributeType,
    pub indexed: bool,
    pub required: bool,

    pub related_o2m_content_id: Option<i64>,
    pub related_m2m_content_id: Option<i64>,
    pub m2m_relation_id: Option<i64>,
    pub m2m_is_backward: Option<bool>,
    pub related_m2o_content_id: Option<i64>,
    pub m2o_backward_field: Option<String>,

    pub classifier_attribute_id: Option<i64>,
    pub is_classifier: bool,

    pub sub_folder: Option<String>,
    pub use_site_library: bool,
}

impl Attribute {
    /// Classify a relation attribute. Returns `None` for non-relation
    /// attributes; ambiguous or missing relation metadata is an error the
    /// schema builder treats as fatal.
    pub fn relation_kind(&self) -> Result<Option<RelationKind>, MetadataError> {
        match self.type_name {
            AttributeType::Relation => {
                if let Some(classifier_attribute_id) = self.classifier_attribute_id {
                    let base_content_id = self.related_o2m_content_id.ok_or(
                        MetadataError::AmbiguousRelation { attribute_id: self.id },
                    )?;

                    return Ok(Some(RelationKind::ClassifierLink {
                        base_content_id,
                        classifier_attribute_id,
                    }));
                }

                match (self.m2m_relation_id, self.related_m2m_content_id, self.m2m_is_backward) {
                    (Some(relation_id), Some(related_content_id), Some(is_backward)) => {
                        Ok(Some(RelationKind::ManyToMany {
                            relation_id,
                            related_content_id,
                            is_backward,
                        }))
                    }
                    _ => match self.related_o2m_content_id {
                        Some(related_content_id) => {
                            Ok(Some(RelationKind::OneToMany { related_content_id }))
                        }
                        None => Err(MetadataError::AmbiguousRelation { attribute_id: self.id }),
                    },
                }
            }
            AttributeType::RelationManyToOne => {
                match (&self.related_m2o_content_id, &self.m2o_backward_field) {
                    (Some(related_content_id), Some(backward_field)) => {
                        Ok(Some(RelationKind::ManyToOne {
                            related_content_id: *related_content_id,
                            backward_field: backward_field.clone(),
                        }))
                    }
                    _ => Err(MetadataError::AmbiguousRelation { attribute_id: self.id }),
                }
            }
            _ => Ok(None),
        }
    }

    /// True for attributes with a physical column in the content table.
    /// Many-to-one attributes live on the related table only.
    pub fn has_column(&self) -> bool {
        self.type_name != AttributeType::RelationManyToOne
    }
}
