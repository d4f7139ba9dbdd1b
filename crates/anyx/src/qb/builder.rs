//! The chainable request builder.

use crate::client::AnyxClient;
use crate::filter::{Filter, FilterOp, OrderOptions, OrderSpec};
use crate::qb::payload::{Operation, PayloadBody, QueryPayload};
use crate::qb::records::IntoRecords;
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Accumulated state for one logical request.
#[derive(Debug, Clone)]
struct QueryState {
    /// Target table, fixed at construction
    table: String,
    /// SELECT clause, passed through verbatim (default "*")
    select: String,
    /// Filters in append order
    filters: Vec<Filter>,
    /// ORDER BY entries in append order
    order: Vec<OrderSpec>,
    limit: Option<i64>,
    offset: Option<i64>,
    single: bool,
    /// Last terminal operation called, if any
    operation: Option<Operation>,
    insert_values: Option<Vec<Value>>,
    update_values: Option<Value>,
}

impl QueryState {
    fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            select: "*".to_string(),
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
            offset: None,
            single: false,
            operation: None,
            insert_values: None,
            update_values: None,
        }
    }

    fn select_opt(&self) -> Option<String> {
        (!self.select.is_empty()).then(|| self.select.clone())
    }

    fn payload(&self) -> QueryPayload {
        let body = match self.operation.unwrap_or(Operation::Select) {
            Operation::Select => PayloadBody::Select {
                select: if self.select.is_empty() {
                    "*".to_string()
                } else {
                    self.select.clone()
                },
                filters: self.filters.clone(),
                order: self.order.clone(),
                limit: self.limit,
                offset: self.offset,
                single: self.single,
            },
            Operation::Insert => PayloadBody::Insert {
                values: self.insert_values.clone().unwrap_or_default(),
                select: self.select_opt(),
            },
            Operation::Update => PayloadBody::Update {
                values: self.update_values.clone().unwrap_or(Value::Null),
                filters: self.filters.clone(),
                select: self.select_opt(),
            },
            Operation::Delete => PayloadBody::Delete {
                filters: self.filters.clone(),
            },
        };

        QueryPayload {
            table: self.table.clone(),
            body,
        }
    }
}

/// Fluent builder for one request against a table.
///
/// Obtained from [`AnyxClient::from`] or [`crate::from`]. Chain filters, ordering and
/// pagination, pick a terminal operation (`select` / `insert` / `update` / `delete`), then
/// run it by awaiting the builder, calling [`QueryBuilder::execute`], or one of the
/// continuation adapters (`then`, `catch`, `finally`).
///
/// Every chain method mutates the builder's state in place and hands back a handle to
/// the **same** state. Cloning a `QueryBuilder` clones that handle, not the state:
///
/// ```ignore
/// let base = client.from("links").eq("owner_id", 7);
/// let recent = base.clone().order_by_desc("created_at");
/// let popular = base.order_by_desc("clicks");
/// // `recent` and `popular` are the same request, ordered by both columns.
/// ```
///
/// To branch, build a fresh builder for each request.
///
/// Calling more than one terminal method is allowed; the last one decides the operation.
/// Each execution trigger issues a new HTTP request; results are never cached.
#[derive(Clone)]
pub struct QueryBuilder {
    state: Arc<Mutex<QueryState>>,
    client: AnyxClient,
}

impl QueryBuilder {
    pub(crate) fn new(client: AnyxClient, table: &str) -> Self {
        Self {
            state: Arc::new(Mutex::new(QueryState::new(table))),
            client,
        }
    }

    fn state(&self) -> MutexGuard<'_, QueryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update_state(self, f: impl FnOnce(&mut QueryState)) -> Self {
        f(&mut self.state());
        self
    }

    fn push_filter(self, column: &str, operator: FilterOp, value: Value) -> Self {
        self.update_state(|s| s.filters.push(Filter::new(column, operator, value)))
    }

    pub(crate) fn client(&self) -> &AnyxClient {
        &self.client
    }

    /// Table this builder targets.
    pub fn table(&self) -> String {
        self.state().table.clone()
    }

    /// Snapshot of the payload the next execution would send.
    pub fn to_payload(&self) -> QueryPayload {
        self.state().payload()
    }

    // ==================== Terminal operations ====================

    /// Set the SELECT clause (passed through verbatim) and mark the request as a select.
    pub fn select(self, columns: &str) -> Self {
        self.update_state(|s| {
            s.select = columns.to_string();
            s.operation = Some(Operation::Select);
        })
    }

    /// Shorthand for `select("*")`.
    pub fn select_all(self) -> Self {
        self.select("*")
    }

    /// Insert one record or a sequence of records.
    pub fn insert(self, rows: impl IntoRecords) -> Self {
        let rows = rows.into_records();
        self.update_state(|s| {
            s.operation = Some(Operation::Insert);
            s.insert_values = Some(rows);
        })
    }

    /// Update matching rows with the given column values.
    ///
    /// Filters added before or after this call decide which rows change.
    pub fn update(self, record: impl Into<Value>) -> Self {
        let record = record.into();
        self.update_state(|s| {
            s.operation = Some(Operation::Update);
            s.update_values = Some(record);
        })
    }

    /// Delete rows matching the accumulated filters.
    pub fn delete(self) -> Self {
        self.update_state(|s| s.operation = Some(Operation::Delete))
    }

    // ==================== Filters ====================

    /// Add filter: column = value
    pub fn eq(self, column: &str, value: impl Into<Value>) -> Self {
        self.push_filter(column, FilterOp::Eq, value.into())
    }

    /// Add filter: column != value
    pub fn neq(self, column: &str, value: impl Into<Value>) -> Self {
        self.push_filter(column, FilterOp::Neq, value.into())
    }

    /// Add filter: column > value
    pub fn gt(self, column: &str, value: impl Into<Value>) -> Self {
        self.push_filter(column, FilterOp::Gt, value.into())
    }

    /// Add filter: column >= value
    pub fn gte(self, column: &str, value: impl Into<Value>) -> Self {
        self.push_filter(column, FilterOp::Gte, value.into())
    }

    /// Add filter: column < value
    pub fn lt(self, column: &str, value: impl Into<Value>) -> Self {
        self.push_filter(column, FilterOp::Lt, value.into())
    }

    /// Add filter: column <= value
    pub fn lte(self, column: &str, value: impl Into<Value>) -> Self {
        self.push_filter(column, FilterOp::Lte, value.into())
    }

    /// Add filter: column LIKE pattern
    pub fn like(self, column: &str, pattern: &str) -> Self {
        self.push_filter(column, FilterOp::Like, Value::from(pattern))
    }

    /// Add filter: column ILIKE pattern (case-insensitive)
    pub fn ilike(self, column: &str, pattern: &str) -> Self {
        self.push_filter(column, FilterOp::Ilike, Value::from(pattern))
    }

    /// Add filter: column IN (values...)
    ///
    /// An empty list is sent as-is; the backend decides what it means.
    pub fn in_list<I, V>(self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values = Value::Array(values.into_iter().map(Into::into).collect());
        self.push_filter(column, FilterOp::In, values)
    }

    /// Add filter: column IS value
    pub fn is(self, column: &str, value: impl Into<Value>) -> Self {
        self.push_filter(column, FilterOp::Is, value.into())
    }

    /// Add filter: column IS NULL
    pub fn is_null(self, column: &str) -> Self {
        self.is(column, Value::Null)
    }

    // ==================== Ordering / pagination ====================

    /// Append an ORDER BY entry. Direction defaults to ascending.
    pub fn order(self, column: &str, options: OrderOptions) -> Self {
        let spec = OrderSpec {
            column: column.to_string(),
            ascending: options.ascending.unwrap_or(true),
        };
        self.update_state(|s| s.order.push(spec))
    }

    /// Append an ascending ORDER BY entry.
    pub fn order_by(self, column: &str) -> Self {
        self.order(column, OrderOptions::default())
    }

    /// Append a descending ORDER BY entry.
    pub fn order_by_desc(self, column: &str) -> Self {
        self.order(column, OrderOptions::descending())
    }

    /// Set LIMIT. Not range-checked.
    pub fn limit(self, count: i64) -> Self {
        self.update_state(|s| s.limit = Some(count))
    }

    /// Set OFFSET. Not range-checked.
    pub fn offset(self, count: i64) -> Self {
        self.update_state(|s| s.offset = Some(count))
    }

    /// Ask the backend to collapse the result to a single record.
    pub fn single(self) -> Self {
        self.update_state(|s| s.single = true)
    }
}

impl fmt::Debug for QueryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("state", &*self.state())
            .finish_non_exhaustive()
    }
}
