use crate::Value;
use std::sync::Arc;

/// Rows returned from a query, with the column names shared across rows.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    columns: Arc<Vec<String>>,
    rows: Vec<Vec<Value>>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        ResultSet {
            columns: Arc::new(columns),
            rows,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first(&self) -> Option<ResultRowRef<'_>> {
        self.get(0)
    }

    pub fn get(&self, index: usize) -> Option<ResultRowRef<'_>> {
        self.rows.get(index).map(|row| ResultRowRef {
            columns: &self.columns,
            values: row,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = ResultRowRef<'_>> {
        self.rows.iter().map(move |row| ResultRowRef {
            columns: &self.columns,
            values: row,
        })
    }
}

impl IntoIterator for ResultSet {
    type Item = ResultRow;
    type IntoIter = std::vec::IntoIter<ResultRow>;

    fn into_iter(self) -> Self::IntoIter {
        let columns = self.columns;

        self.rows
            .into_iter()
            .map(|values| ResultRow {
                columns: columns.clone(),
                values,
            })
            .collect::<Vec<_>>()
            .into_iter()
    }
}

/// An owned row of a result set.
#[derive(Debug, Clone)]
pub struct ResultRow {
    columns: Arc<Vec<String>>,
    values: Vec<Value>,
}

impl ResultRow {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|idx| &self.values[idx])
    }

    pub fn at(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

/// A borrowed row of a result set.
#[derive(Debug, Clone, Copy)]
pub struct ResultRowRef<'a> {
    columns: &'a [String],
    values: &'a [Value],
}

impl<'a> ResultRowRef<'a> {
    pub fn get(&self, name: &str) -> Option<&'a Value> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|idx| &self.values[idx])
    }

    pub fn at(&self, index: usize) -> Option<&'a Value> {
        self.values.get(index)
    }
}
