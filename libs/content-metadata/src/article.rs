use chrono::{DateTime, Utc};
use sql_connection::Value;
use std::collections::HashMap;

/// Selects which physical table variant a query targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ArticleState {
    #[default]
    Live,
    Stage,
}

impl ArticleState {
    pub fn as_str(self) -> &'static str {
        match self {
            ArticleState::Live => "live",
            ArticleState::Stage => "stage",
        }
    }
}

/// One row of a content table, with system fields lifted out and the rest
/// kept in an open field bag keyed by lower-cased query alias.
#[derive(Debug, Clone)]
pub struct Article {
    pub content_type_id: i64,
    pub id: i64,
    /// The extension this row belongs to, read from the base type's
    /// classifier column.
    pub extension_content_id: Option<i64>,
    pub status_type_id: Option<i64>,
    pub created: Option<DateTime<Utc>>,
    pub modified: Option<DateTime<Utc>>,
    pub last_modified_by: Option<i64>,
    pub fields: HashMap<String, Value>,
}

impl Article {
    pub fn new(content_type_id: i64) -> Self {
        Article {
            content_type_id,
            id: 0,
            extension_content_id: None,
            status_type_id: None,
            created: None,
            modified: None,
            last_modified_by: None,
            fields: HashMap::new(),
        }
    }

    /// Look up a field by its query alias, case-insensitively.
    pub fn field(&self, query_alias: &str) -> Option<&Value> {
        self.fields.get(&query_alias.to_lowercase())
    }
}
