use serde_json::Value;

use crate::GatewayError;

/// Row predicate understood by the remote store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Eq { column: String, value: String },
    /// Case-insensitive substring match.
    ILike { column: String, pattern: String },
    In { column: String, values: Vec<String> },
    /// Array column contains `tag`.
    HasTag { column: String, tag: String },
    /// Array column is null or does not contain `tag`.
    LacksTag { column: String, tag: String },
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::Eq {
            column: column.into(),
            value: value.into(),
        }
    }

    pub fn ilike(column: impl Into<String>, pattern: impl Into<String>) -> Self {
        Filter::ILike {
            column: column.into(),
            pattern: pattern.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub descending: bool,
}

/// Zero-based row window; `limit: None` fetches everything from `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRange {
    pub offset: usize,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub table: String,
    pub select: String,
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub range: Option<RowRange>,
    /// Ask the store for the total number of matching rows.
    pub count: bool,
}

impl ListQuery {
    pub fn new(table: impl Into<String>, select: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            select: select.into(),
            filters: Vec::new(),
            order: None,
            range: None,
            count: false,
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order_desc(mut self, column: impl Into<String>) -> Self {
        self.order = Some(Order {
            column: column.into(),
            descending: true,
        });
        self
    }

    pub fn range(mut self, offset: usize, limit: usize) -> Self {
        self.range = Some(RowRange {
            offset,
            limit: Some(limit),
        });
        self
    }

    pub fn with_count(mut self) -> Self {
        self.count = true;
        self
    }
}

/// Raw rows plus the remote total when it was requested.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RowPage {
    pub rows: Vec<Value>,
    pub total: Option<u64>,
}

/// The remote relational store, as far as the loader needs it.
#[async_trait::async_trait]
pub trait RemoteGateway: Send + Sync {
    async fn query_list(&self, query: &ListQuery) -> Result<RowPage, GatewayError>;

    /// Same as [`RemoteGateway::query_list`] with a one-to-many relation embedded in each row.
    async fn query_with_join(
        &self,
        query: &ListQuery,
        relation: &str,
    ) -> Result<RowPage, GatewayError> {
        let mut joined = query.clone();
        joined.select = format!("{},{}", query.select, relation);
        self.query_list(&joined).await
    }

    async fn call_procedure(&self, name: &str, args: Value) -> Result<Value, GatewayError>;
}
