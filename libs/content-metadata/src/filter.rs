use crate::AttributeType;
use sql_connection::Value;

/// Operators a filter field can carry. `In`/`NotIn` and
/// `Contains`/`NotContains` are relation-aware and resolve against a linked
/// table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterOperator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterOrEqual,
    LessThan,
    LessOrEqual,
    Like,
    NotLike,
    IsNull,
    In,
    NotIn,
    Contains,
    NotContains,
}

impl FilterOperator {
    pub fn as_suffix(self) -> &'static str {
        match self {
            FilterOperator::Equal => "Eq",
            FilterOperator::NotEqual => "Not",
            FilterOperator::GreaterThan => "Gt",
            FilterOperator::GreaterOrEqual => "Ge",
            FilterOperator::LessThan => "Lt",
            FilterOperator::LessOrEqual => "Le",
            FilterOperator::Like => "Like",
            FilterOperator::NotLike => "NotLike",
            FilterOperator::IsNull => "IsNull",
            FilterOperator::In => "In",
            FilterOperator::NotIn => "NotIn",
            FilterOperator::Contains => "Contains",
            FilterOperator::NotContains => "NotContains",
        }
    }
}

/// What a generated filter field filters on. Recorded in the schema's side
/// table when the filter input types are synthesized, looked up again when
/// an incoming filter argument is compiled to SQL.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterDefinition {
    /// A plain column predicate.
    Field {
        /// The physical column name, always from validated metadata.
        field_name: String,
        field_type: AttributeType,
        operator: FilterOperator,
    },
    /// A many-to-many membership predicate against a link table.
    ManyToMany {
        relation_id: i64,
        is_backward: bool,
        operator: FilterOperator,
    },
}

impl FilterDefinition {
    pub fn operator(&self) -> FilterOperator {
        match self {
            FilterDefinition::Field { operator, .. } => *operator,
            FilterDefinition::ManyToMany { operator, .. } => *operator,
        }
    }

    fn sort_key(&self) -> (String, FilterOperator) {
        match self {
            FilterDefinition::Field { field_name, operator, .. } => (field_name.clone(), *operator),
            FilterDefinition::ManyToMany { relation_id, operator, .. } => {
                (format!("m2m_{relation_id}"), *operator)
            }
        }
    }
}

/// A filter field together with the caller-supplied value. Built per
/// incoming field argument, discarded after the query executes.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterClause {
    pub definition: FilterDefinition,
    pub value: Value,
}

/// Canonical rendering of a clause list, used to key relation batches so
/// that sibling fields with different filters never share one.
pub fn filter_signature(clauses: &[FilterClause]) -> String {
    let mut parts: Vec<(String, FilterOperator, String)> = clauses
        .iter()
        .map(|c| {
            let (name, operator) = c.definition.sort_key();
            (name, operator, c.value.to_string())
        })
        .collect();

    parts.sort();

    parts
        .into_iter()
        .map(|(name, operator, value)| format!("{name}_{}_{value}", operator.as_suffix()))
        .collect::<Vec<_>>()
        .join(",")
}
