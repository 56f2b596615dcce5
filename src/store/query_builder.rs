use serde_json::Value;

use super::filter::Filter;
use super::{Backend, Operation, Row, StoreError, StoreRequest};

/// Fluent request against one table: pick the operation, add filters, execute.
pub struct QueryBuilder<'a> {
    backend: &'a dyn Backend,
    request: StoreRequest,
}

impl<'a> QueryBuilder<'a> {
    pub(crate) fn new(backend: &'a dyn Backend, table: impl Into<String>) -> Self {
        Self {
            backend,
            request: StoreRequest {
                table: table.into(),
                operation: Operation::Select { columns: "*".to_string() },
                filters: Vec::new(),
            },
        }
    }

    /// Project columns, comma separated (`"*"` for all)
    pub fn select(mut self, columns: &str) -> Self {
        self.request.operation = Operation::Select {
            columns: normalize_columns(columns),
        };
        self
    }

    pub fn insert(mut self, row: Row) -> Self {
        self.request.operation = Operation::Insert { rows: vec![row] };
        self
    }

    pub fn update(mut self, patch: Row) -> Self {
        self.request.operation = Operation::Update { patch };
        self
    }

    pub fn delete(mut self) -> Self {
        self.request.operation = Operation::Delete;
        self
    }

    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.request.filters.push(Filter::eq(column, value));
        self
    }

    pub fn in_<I, V>(mut self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.request.filters.push(Filter::in_list(column, values));
        self
    }

    pub fn request(&self) -> &StoreRequest {
        &self.request
    }

    pub async fn execute(self) -> Result<Vec<Row>, StoreError> {
        tracing::trace!(
            table = %self.request.table,
            operation = self.request.operation.verb(),
            filters = self.request.filters.len(),
            "store request"
        );
        self.backend.execute(self.request).await
    }
}

fn normalize_columns(columns: &str) -> String {
    let cols: Vec<&str> = columns
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .collect();
    if cols.is_empty() {
        "*".to_string()
    } else {
        cols.join(",")
    }
}
