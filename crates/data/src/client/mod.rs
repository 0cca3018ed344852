//! The data-access boundary.
//!
//! Every read and write goes through [`DataClient`]. [`RestClient`] talks to
//! the hosted backend's REST API; [`InMemoryClient`] keeps tables in memory
//! with the same filter semantics.

mod memory;
mod rest;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::DataError;

pub use memory::{InMemoryClient, Operation, Procedure, Tables, Trigger};
pub use rest::RestClient;

/// A row as exchanged with the backend.
pub type Row = serde_json::Map<String, Value>;

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// `=`
    Eq,
    /// `<>`
    Neq,
    /// `>`
    Gt,
    /// `>=`
    Gte,
    /// `<`
    Lt,
    /// `<=`
    Lte,
}

impl Op {
    /// Operator name in the REST filter syntax.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
        }
    }
}

/// A row filter.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// `column <op> value`.
    Compare {
        /// Column name.
        column: String,
        /// Operator.
        op: Op,
        /// Right-hand side.
        value: Value,
    },
    /// `column IN (values)`.
    In {
        /// Column name.
        column: String,
        /// Accepted values.
        values: Vec<Value>,
    },
    /// `column IS NULL`.
    IsNull {
        /// Column name.
        column: String,
    },
    /// Any of the inner filters.
    Or(Vec<Filter>),
}

impl Filter {
    /// `column <op> value`.
    pub fn compare(column: &str, op: Op, value: impl Serialize) -> Self {
        Self::Compare {
            column: column.to_string(),
            op,
            value: to_value(value),
        }
    }

    /// `column = value`.
    pub fn eq(column: &str, value: impl Serialize) -> Self {
        Self::compare(column, Op::Eq, value)
    }

    /// `column IS NULL`.
    pub fn is_null(column: &str) -> Self {
        Self::IsNull {
            column: column.to_string(),
        }
    }
}

/// Sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    /// Column name.
    pub column: String,
    /// Ascending when true.
    pub ascending: bool,
}

/// A select or count request.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// Table or view name.
    pub table: String,
    /// Column list; `None` selects everything.
    pub columns: Option<String>,
    /// Filters, all of which must match.
    pub filters: Vec<Filter>,
    /// Sort keys, applied in order.
    pub order: Vec<Order>,
    /// Maximum rows returned.
    pub limit: Option<usize>,
}

impl Query {
    /// Starts a query on `table`.
    pub fn table(table: &str) -> Self {
        Self {
            table: table.to_string(),
            columns: None,
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
        }
    }

    /// Restricts the selected columns.
    #[must_use]
    pub fn select(mut self, columns: &str) -> Self {
        self.columns = Some(columns.to_string());
        self
    }

    /// Adds a filter.
    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// `column = value`.
    #[must_use]
    pub fn eq(self, column: &str, value: impl Serialize) -> Self {
        self.filter(Filter::compare(column, Op::Eq, value))
    }

    /// `column <> value`.
    #[must_use]
    pub fn neq(self, column: &str, value: impl Serialize) -> Self {
        self.filter(Filter::compare(column, Op::Neq, value))
    }

    /// `column > value`.
    #[must_use]
    pub fn gt(self, column: &str, value: impl Serialize) -> Self {
        self.filter(Filter::compare(column, Op::Gt, value))
    }

    /// `column >= value`.
    #[must_use]
    pub fn gte(self, column: &str, value: impl Serialize) -> Self {
        self.filter(Filter::compare(column, Op::Gte, value))
    }

    /// `column < value`.
    #[must_use]
    pub fn lt(self, column: &str, value: impl Serialize) -> Self {
        self.filter(Filter::compare(column, Op::Lt, value))
    }

    /// `column <= value`.
    #[must_use]
    pub fn lte(self, column: &str, value: impl Serialize) -> Self {
        self.filter(Filter::compare(column, Op::Lte, value))
    }

    /// `column IN (values)`.
    #[must_use]
    pub fn in_list<T: Serialize>(self, column: &str, values: impl IntoIterator<Item = T>) -> Self {
        self.filter(Filter::In {
            column: column.to_string(),
            values: values.into_iter().map(to_value).collect(),
        })
    }

    /// `column IS NULL`.
    #[must_use]
    pub fn is_null(self, column: &str) -> Self {
        self.filter(Filter::is_null(column))
    }

    /// Any of `filters`.
    #[must_use]
    pub fn or(self, filters: Vec<Filter>) -> Self {
        self.filter(Filter::Or(filters))
    }

    /// Adds a sort key.
    #[must_use]
    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        self.order.push(Order {
            column: column.to_string(),
            ascending,
        });
        self
    }

    /// Caps the number of rows.
    #[must_use]
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Generic access to the backend's tables, views and procedures.
#[async_trait]
pub trait DataClient: Send + Sync {
    /// Returns rows matching the query.
    async fn select(&self, query: &Query) -> Result<Vec<Row>, DataError>;

    /// Counts rows matching the query's filters (limit is ignored).
    async fn count(&self, query: &Query) -> Result<u64, DataError>;

    /// Inserts a row and returns it as stored.
    async fn insert(&self, table: &str, row: Row) -> Result<Row, DataError>;

    /// Applies `patch` to every row matching `filters` and returns the updated rows.
    async fn update(
        &self,
        table: &str,
        filters: &[Filter],
        patch: Row,
    ) -> Result<Vec<Row>, DataError>;

    /// Deletes every row matching `filters` and returns how many were removed.
    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<u64, DataError>;

    /// Calls a stored procedure.
    async fn call(&self, procedure: &str, args: Value) -> Result<Value, DataError>;
}

/// Serializes a filter value. Values that cannot be represented become `null`.
fn to_value(value: impl Serialize) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// Decodes rows into typed records.
pub fn decode_rows<T: DeserializeOwned>(rows: Vec<Row>) -> Result<Vec<T>, DataError> {
    rows.into_iter().map(decode_row).collect()
}

/// Decodes one row into a typed record.
pub fn decode_row<T: DeserializeOwned>(row: Row) -> Result<T, DataError> {
    Ok(serde_json::from_value(Value::Object(row))?)
}

/// Encodes a typed record into a row.
pub fn encode_row<T: Serialize>(value: &T) -> Result<Row, DataError> {
    match serde_json::to_value(value)? {
        Value::Object(row) => Ok(row),
        other => Err(DataError::Decode(format!("expected an object, got {other}"))),
    }
}
