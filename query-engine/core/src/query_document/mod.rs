//! The parsed query document the transport hands to the core: operations,
//! selections and argument values, with variables substituted at
//! argument-read time.

use content_metadata::ArticleState;
use indexmap::IndexMap;

/// One executable operation. The transport picks the operation (by name if
/// several were sent) before handing it in.
#[derive(Debug, Clone, Default)]
pub struct Operation {
    pub name: Option<String>,
    pub selections: Vec<Selection>,
}

#[derive(Debug, Clone)]
pub struct Selection {
    pub name: String,
    pub alias: Option<String>,
    pub arguments: Vec<(String, ArgumentValue)>,
    pub nested_selections: Vec<Selection>,
}

impl Selection {
    pub fn new(name: impl Into<String>) -> Self {
        Selection {
            name: name.into(),
            alias: None,
            arguments: Vec::new(),
            nested_selections: Vec::new(),
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn argument(mut self, name: impl Into<String>, value: ArgumentValue) -> Self {
        self.arguments.push((name.into(), value));
        self
    }

    pub fn nested(mut self, selection: Selection) -> Self {
        self.nested_selections.push(selection);
        self
    }

    /// The key this selection serializes under.
    pub fn response_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    /// Case-insensitive argument lookup; filter field names arrive in
    /// caller casing.
    pub fn find_argument(&self, name: &str) -> Option<&ArgumentValue> {
        self.arguments
            .iter()
            .find(|(argument_name, _)| argument_name.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }

    pub fn find_nested(&self, name: &str) -> Option<&Selection> {
        self.nested_selections.iter().find(|s| s.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentValue {
    Int(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Enum(String),
    List(Vec<ArgumentValue>),
    Object(IndexMap<String, ArgumentValue>),
    Variable(String),
    Null,
}

impl ArgumentValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ArgumentValue::Null)
    }
}

/// A request as the core sees it: one operation, its variables, and the
/// live/stage state selector.
#[derive(Debug, Clone, Default)]
pub struct QueryRequest {
    pub operation: Operation,
    pub variables: IndexMap<String, ArgumentValue>,
    pub state: ArticleState,
}

impl QueryRequest {
    /// Substitute a variable reference with the caller-supplied value.
    pub fn resolve<'a>(&'a self, value: &'a ArgumentValue) -> crate::CoreResult<&'a ArgumentValue> {
        match value {
            ArgumentValue::Variable(name) => self
                .variables
                .get(name)
                .ok_or_else(|| crate::CoreError::argument(format!("Variable ${name} is not defined"))),
            other => Ok(other),
        }
    }
}
