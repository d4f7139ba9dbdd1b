//! JSON payload sent to `/api/projects/{id}/query`.

use crate::filter::{Filter, OrderSpec};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// The kind of request a builder produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Select,
    Insert,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Select => "select",
            Operation::Insert => "insert",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serialized request body.
///
/// The shape depends on the operation:
///
/// ```text
/// select: { table, operation, select, filters, order, limit?, offset?, single }
/// insert: { table, operation, values: [row, ...], select? }
/// update: { table, operation, values: row, filters, select? }
/// delete: { table, operation, filters }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryPayload {
    pub table: String,
    #[serde(flatten)]
    pub body: PayloadBody,
}

/// Operation-specific part of a [`QueryPayload`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "operation", rename_all = "lowercase")]
pub enum PayloadBody {
    Select {
        select: String,
        filters: Vec<Filter>,
        order: Vec<OrderSpec>,
        #[serde(skip_serializing_if = "Option::is_none")]
        limit: Option<i64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        offset: Option<i64>,
        single: bool,
    },
    Insert {
        values: Vec<Value>,
        #[serde(skip_serializing_if = "Option::is_none")]
        select: Option<String>,
    },
    Update {
        values: Value,
        filters: Vec<Filter>,
        #[serde(skip_serializing_if = "Option::is_none")]
        select: Option<String>,
    },
    Delete {
        filters: Vec<Filter>,
    },
}

impl QueryPayload {
    /// Operation carried by this payload.
    pub fn operation(&self) -> Operation {
        match self.body {
            PayloadBody::Select { .. } => Operation::Select,
            PayloadBody::Insert { .. } => Operation::Insert,
            PayloadBody::Update { .. } => Operation::Update,
            PayloadBody::Delete { .. } => Operation::Delete,
        }
    }

    /// Filters sent with this payload (INSERT sends none).
    pub fn filters(&self) -> &[Filter] {
        match &self.body {
            PayloadBody::Select { filters, .. }
            | PayloadBody::Update { filters, .. }
            | PayloadBody::Delete { filters } => filters,
            PayloadBody::Insert { .. } => &[],
        }
    }

    /// Encode as a JSON value.
    pub fn to_json(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}
