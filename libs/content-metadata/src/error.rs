use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetadataError {
    /// A relation attribute that is neither one-to-many, many-to-many,
    /// many-to-one nor a classifier link. Fatal at schema-build time.
    #[error("relation attribute {attribute_id} has inconsistent relation metadata")]
    AmbiguousRelation { attribute_id: i64 },

    #[error("attribute type {0:?} is not part of the type vocabulary")]
    UnknownAttributeType(String),
}
