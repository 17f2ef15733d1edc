use crate::Identifier;
use content_metadata::OrderByToken;

/// An order-by enumeration for one content type: `{field}Asc`/`{field}Desc`
/// per sortable field, each mapping to a physical sort token.
#[derive(Debug, Clone)]
pub struct EnumType {
    pub identifier: Identifier,
    pub description: Option<String>,
    pub values: Vec<EnumValue>,
}

#[derive(Debug, Clone)]
pub struct EnumValue {
    pub name: String,
    pub description: Option<String>,
    pub token: OrderByToken,
}

impl EnumType {
    pub fn value(&self, name: &str) -> Option<&EnumValue> {
        self.values.iter().find(|v| v.name == name)
    }
}
