//! In-memory `DataClient`.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use super::{DataClient, Filter, Op, Query, Row, encode_row};
use crate::error::DataError;

/// Table name to rows.
pub type Tables = HashMap<String, Vec<Row>>;

/// Handler for a stored procedure.
pub type Procedure = Arc<dyn Fn(&mut Tables, Value) -> Result<Value, DataError> + Send + Sync>;

/// Runs after every write to a table, standing in for database triggers.
pub type Trigger = Arc<dyn Fn(&mut Tables) + Send + Sync>;

/// One kind of `DataClient` call, for targeted fault injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `select`
    Select,
    /// `count`
    Count,
    /// `insert`
    Insert,
    /// `update`
    Update,
    /// `delete`
    Delete,
    /// `call`
    Call,
}

#[derive(Default)]
struct State {
    tables: Tables,
    procedures: HashMap<String, Procedure>,
    triggers: HashMap<String, Vec<Trigger>>,
    failures: HashMap<String, DataError>,
    operation_failures: HashMap<(String, Operation), DataError>,
    latency: Option<Duration>,
}

/// Tables held in memory with the same filter, order and limit semantics as
/// the REST backend.
///
/// Inserts fill in the table's key column and `created_at` when missing.
/// Updates refresh `updated_at` on rows that carry one.
#[derive(Clone, Default)]
pub struct InMemoryClient {
    state: Arc<Mutex<State>>,
}

impl std::fmt::Debug for InMemoryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("InMemoryClient")
            .field("tables", &state.tables.keys().collect::<Vec<_>>())
            .field("procedures", &state.procedures.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl InMemoryClient {
    /// Creates an empty client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends typed records to a table.
    pub fn seed<T: Serialize>(&self, table: &str, records: &[T]) -> Result<(), DataError> {
        let rows = records.iter().map(encode_row).collect::<Result<Vec<_>, _>>()?;
        self.lock()
            .tables
            .entry(table.to_string())
            .or_default()
            .extend(rows);
        Ok(())
    }

    /// Current rows of a table.
    #[must_use]
    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.lock().tables.get(table).cloned().unwrap_or_default()
    }

    /// Registers a procedure handler.
    pub fn register_procedure<F>(&self, name: &str, handler: F)
    where
        F: Fn(&mut Tables, Value) -> Result<Value, DataError> + Send + Sync + 'static,
    {
        self.lock()
            .procedures
            .insert(name.to_string(), Arc::new(handler));
    }

    /// Registers a hook run after every write to `table`.
    pub fn register_trigger<F>(&self, table: &str, trigger: F)
    where
        F: Fn(&mut Tables) + Send + Sync + 'static,
    {
        self.lock()
            .triggers
            .entry(table.to_string())
            .or_default()
            .push(Arc::new(trigger));
    }

    /// Makes every operation on `table` fail with `error` until cleared.
    pub fn fail_table(&self, table: &str, error: DataError) {
        self.lock().failures.insert(table.to_string(), error);
    }

    /// Makes only `operation` on `table` fail with `error` until cleared.
    pub fn fail_operation(&self, table: &str, operation: Operation, error: DataError) {
        self.lock()
            .operation_failures
            .insert((table.to_string(), operation), error);
    }

    /// Clears every failure set on `table`.
    pub fn clear_failure(&self, table: &str) {
        let mut state = self.lock();
        state.failures.remove(table);
        state.operation_failures.retain(|(name, _), _| name != table);
    }

    /// Delays every operation by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        self.lock().latency = Some(latency);
    }

    async fn enter(&self, table: &str, operation: Operation) -> Result<(), DataError> {
        let latency = self.lock().latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        let state = self.lock();
        let failure = state.failures.get(table).or_else(|| {
            state
                .operation_failures
                .get(&(table.to_string(), operation))
        });
        match failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn run_triggers(state: &mut State, table: &str) {
        let triggers = state.triggers.get(table).cloned().unwrap_or_default();
        for trigger in triggers {
            trigger(&mut state.tables);
        }
    }
}

#[async_trait]
impl DataClient for InMemoryClient {
    async fn select(&self, query: &Query) -> Result<Vec<Row>, DataError> {
        self.enter(&query.table, Operation::Select).await?;
        let state = self.lock();
        let mut rows: Vec<Row> = state
            .tables
            .get(&query.table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| query.filters.iter().all(|f| matches(f, row)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        rows.sort_by(|a, b| {
            query
                .order
                .iter()
                .map(|order| {
                    let ord = compare_nullable(field(a, &order.column), field(b, &order.column));
                    if order.ascending { ord } else { ord.reverse() }
                })
                .find(|ord| *ord != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });

        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }

        if let Some(columns) = query.columns.as_deref().filter(|c| c.trim() != "*") {
            let keep: Vec<&str> = columns.split(',').map(str::trim).collect();
            for row in &mut rows {
                row.retain(|key, _| keep.contains(&key.as_str()));
            }
        }

        Ok(rows)
    }

    async fn count(&self, query: &Query) -> Result<u64, DataError> {
        self.enter(&query.table, Operation::Count).await?;
        let state = self.lock();
        let count = state.tables.get(&query.table).map_or(0, |rows| {
            rows.iter()
                .filter(|row| query.filters.iter().all(|f| matches(f, row)))
                .count()
        });
        Ok(count as u64)
    }

    async fn insert(&self, table: &str, mut row: Row) -> Result<Row, DataError> {
        self.enter(table, Operation::Insert).await?;
        let key = key_column(table);
        if let Some(key) = key {
            if row.get(key).is_none_or(Value::is_null) {
                row.insert(key.to_string(), Value::String(Uuid::now_v7().to_string()));
            }
        }
        if row.get("created_at").is_none_or(Value::is_null) {
            row.insert("created_at".to_string(), Value::String(now()));
        }

        let mut state = self.lock();
        state
            .tables
            .entry(table.to_string())
            .or_default()
            .push(row.clone());
        Self::run_triggers(&mut state, table);

        let stored = key
            .and_then(|key| {
                let id = row.get(key)?;
                state
                    .tables
                    .get(table)?
                    .iter()
                    .find(|r| r.get(key) == Some(id))
                    .cloned()
            })
            .unwrap_or(row);
        Ok(stored)
    }

    async fn update(
        &self,
        table: &str,
        filters: &[Filter],
        patch: Row,
    ) -> Result<Vec<Row>, DataError> {
        self.enter(table, Operation::Update).await?;
        let mut state = self.lock();
        let mut updated = Vec::new();

        if let Some(rows) = state.tables.get_mut(table) {
            for row in rows
                .iter_mut()
                .filter(|row| filters.iter().all(|f| matches(f, row)))
            {
                for (key, value) in &patch {
                    row.insert(key.clone(), value.clone());
                }
                if row.contains_key("updated_at") && !patch.contains_key("updated_at") {
                    row.insert("updated_at".to_string(), Value::String(now()));
                }
                updated.push(row.clone());
            }
        }

        if !updated.is_empty() {
            Self::run_triggers(&mut state, table);
        }
        Ok(updated)
    }

    async fn delete(&self, table: &str, filters: &[Filter]) -> Result<u64, DataError> {
        self.enter(table, Operation::Delete).await?;
        let mut state = self.lock();
        let removed = state.tables.get_mut(table).map_or(0, |rows| {
            let before = rows.len();
            rows.retain(|row| !filters.iter().all(|f| matches(f, row)));
            before - rows.len()
        });

        if removed > 0 {
            Self::run_triggers(&mut state, table);
        }
        Ok(removed as u64)
    }

    async fn call(&self, procedure: &str, args: Value) -> Result<Value, DataError> {
        self.enter(procedure, Operation::Call).await?;
        let mut state = self.lock();
        let handler = state
            .procedures
            .get(procedure)
            .cloned()
            .ok_or_else(|| DataError::UnknownProcedure(procedure.to_string()))?;
        handler(&mut state.tables, args)
    }
}

/// Key column filled in on insert.
fn key_column(table: &str) -> Option<&'static str> {
    match table {
        "customers" => Some("customer_id"),
        "routes" => Some("route_id"),
        "route_pricing" => Some("pricing_id"),
        "subscriptions" => Some("subscription_id"),
        "invoices" => Some("invoice_id"),
        "invoice_lines" => Some("invoice_line_id"),
        "payments" => Some("payment_id"),
        "payment_allocations" => Some("allocation_id"),
        _ => None,
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn field<'a>(row: &'a Row, column: &str) -> &'a Value {
    row.get(column).unwrap_or(&Value::Null)
}

fn matches(filter: &Filter, row: &Row) -> bool {
    match filter {
        Filter::Compare { column, op, value } => {
            let actual = field(row, column);
            if actual.is_null() || value.is_null() {
                return false;
            }
            match (compare(actual, value), op) {
                (Some(ord), Op::Eq) => ord == Ordering::Equal,
                (Some(ord), Op::Neq) => ord != Ordering::Equal,
                (Some(ord), Op::Gt) => ord == Ordering::Greater,
                (Some(ord), Op::Gte) => ord != Ordering::Less,
                (Some(ord), Op::Lt) => ord == Ordering::Less,
                (Some(ord), Op::Lte) => ord != Ordering::Greater,
                (None, Op::Eq) => actual == value,
                (None, Op::Neq) => actual != value,
                (None, _) => false,
            }
        }
        Filter::In { column, values } => {
            let actual = field(row, column);
            values
                .iter()
                .any(|v| compare(actual, v) == Some(Ordering::Equal))
        }
        Filter::IsNull { column } => field(row, column).is_null(),
        Filter::Or(filters) => filters.iter().any(|f| matches(f, row)),
    }
}

/// Orders two values the way the database would for numeric, timestamp,
/// text and boolean columns. Returns `None` for incomparable values.
fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (as_decimal(a), as_decimal(b)) {
        return Some(x.cmp(&y));
    }
    if let (Some(x), Some(y)) = (as_timestamp(a), as_timestamp(b)) {
        return Some(x.cmp(&y));
    }
    match (a, b) {
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Like [`compare`], with nulls sorting after every value.
fn compare_nullable(a: &Value, b: &Value) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => compare(a, b).unwrap_or(Ordering::Equal),
    }
}

fn as_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        Value::String(s) => Decimal::from_str(s).ok(),
        _ => None,
    }
}

fn as_timestamp(value: &Value) -> Option<DateTime<FixedOffset>> {
    value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
}
