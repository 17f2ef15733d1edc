use crate::ContentType;

/// Physical naming context for one content type: table alias, column-to-
/// query-alias mappings and the extension join map. Derived from metadata,
/// never persisted, rebuilt for every schema generation.
#[derive(Debug, Clone)]
pub struct RootContext {
    pub content_type_id: i64,
    pub fields: Vec<FieldContext>,
    pub classifier: Option<FieldContext>,
    pub extensions: Vec<ExtensionContext>,
}

#[derive(Debug, Clone)]
pub struct ExtensionContext {
    pub content_type_id: i64,
    pub fields: Vec<FieldContext>,
    /// The extension table column joining back to the base row id.
    pub reference_to_base: String,
}

#[derive(Debug, Clone)]
pub struct FieldContext {
    pub content_type_id: i64,
    pub alias: String,
}

impl RootContext {
    pub fn table_alias(&self) -> String {
        table_alias(self.content_type_id)
    }
}

impl ExtensionContext {
    pub fn table_alias(&self) -> String {
        table_alias(self.content_type_id)
    }
}

impl FieldContext {
    /// The alias the column is selected under. A deterministic function of
    /// content id and field alias, so no two columns collide across the
    /// joined extension tables.
    pub fn query_alias(&self) -> String {
        format!("cid_{}_{}", self.content_type_id, self.alias.to_lowercase())
    }
}

fn table_alias(content_type_id: i64) -> String {
    format!("cid_{content_type_id}")
}

impl ContentType {
    /// Derive the query context for this type and its extensions.
    pub fn root_context(&self) -> RootContext {
        RootContext {
            content_type_id: self.id,
            fields: self
                .attributes
                .iter()
                .filter(|a| !a.is_classifier && a.has_column())
                .map(|a| FieldContext {
                    content_type_id: self.id,
                    alias: a.alias.clone(),
                })
                .collect(),
            classifier: self.classifier().map(|a| FieldContext {
                content_type_id: self.id,
                alias: a.alias.clone(),
            }),
            extensions: self
                .extensions
                .iter()
                .filter_map(|extension| {
                    let reference_to_base = extension.classifier_link()?.alias.clone();

                    Some(ExtensionContext {
                        content_type_id: extension.id,
                        reference_to_base,
                        fields: extension
                            .attributes
                            .iter()
                            .filter(|a| a.classifier_attribute_id.is_none() && a.has_column())
                            .map(|a| FieldContext {
                                content_type_id: extension.id,
                                alias: a.alias.clone(),
                            })
                            .collect(),
                    })
                })
                .collect(),
        }
    }
}
