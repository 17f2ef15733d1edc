use crate::Article;

/// Relay-style pagination arguments, straight off the connection field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelayPaginationArgs {
    pub skip: Option<i64>,
    pub first: Option<i64>,
    pub after: Option<String>,
    pub before: Option<String>,
    pub last: Option<i64>,
}

/// One page of rows plus the page flags, before connection serialization.
#[derive(Debug, Default)]
pub struct RelayPaginationResult {
    pub total_count: Option<i64>,
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub articles: Vec<Article>,
}
