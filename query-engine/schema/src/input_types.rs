use crate::{EnumTypeId, Identifier, InputObjectTypeId, ScalarKind};
use content_metadata::FilterDefinition;
use indexmap::IndexMap;

/// An input object type; in this schema always a filter type.
#[derive(Debug, Clone)]
pub struct InputObjectType {
    pub identifier: Identifier,
    pub description: Option<String>,
    pub fields: Vec<InputField>,
}

impl InputObjectType {
    pub fn find_field(&self, name: &str) -> Option<&InputField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone)]
pub struct InputField {
    pub name: String,
    pub description: Option<String>,
    pub field_type: InputType,
    pub is_required: bool,
}

impl InputField {
    pub fn new(name: impl Into<String>, field_type: InputType) -> Self {
        InputField {
            name: name.into(),
            description: None,
            field_type,
            is_required: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.is_required = true;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Clone)]
pub enum InputType {
    Scalar(ScalarKind),
    Enum(EnumTypeId),
    Object(InputObjectTypeId),
    List(Box<InputType>),
}

impl InputType {
    pub fn list(inner: InputType) -> Self {
        InputType::List(Box::new(inner))
    }
}

/// The side table mapping generated filter field names to their
/// definitions, keyed lower-cased so argument lookup is case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct FilterMap {
    definitions: IndexMap<String, FilterDefinition>,
}

impl FilterMap {
    pub fn insert(&mut self, field_name: &str, definition: FilterDefinition) {
        self.definitions.insert(field_name.to_lowercase(), definition);
    }

    pub fn get(&self, field_name: &str) -> Option<&FilterDefinition> {
        self.definitions.get(&field_name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}
