/// One sort token of an `order` argument, referencing a physical column
/// from validated metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderByToken {
    pub column: String,
    pub descending: bool,
}

impl OrderByToken {
    pub fn asc(column: impl Into<String>) -> Self {
        OrderByToken {
            column: column.into(),
            descending: false,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        OrderByToken {
            column: column.into(),
            descending: true,
        }
    }
}

/// Canonical rendering of an order list, used to key relation batches.
pub fn order_signature(order_by: &[OrderByToken]) -> String {
    order_by
        .iter()
        .map(|t| {
            if t.descending {
                format!("^{}", t.column)
            } else {
                t.column.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}
