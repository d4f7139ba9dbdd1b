//! Filter and ordering primitives carried by the query payload.
//!
//! A [`Filter`] is one `column / operator / value` predicate. The backend receives
//! filters in exactly the order they were appended, duplicates included.

use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Filter operator understood by the backend.
///
/// # Example
/// ```ignore
/// use anyx::FilterOp;
///
/// assert_eq!(FilterOp::Ilike.as_str(), "ilike");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOp {
    /// Equal: column = value
    Eq,
    /// Not equal: column != value
    Neq,
    /// Greater than: column > value
    Gt,
    /// Greater than or equal: column >= value
    Gte,
    /// Less than: column < value
    Lt,
    /// Less than or equal: column <= value
    Lte,
    /// LIKE pattern match
    Like,
    /// Case-insensitive LIKE
    Ilike,
    /// Membership in a list
    In,
    /// IS check, usually against null
    Is,
}

impl FilterOp {
    /// Wire name of the operator.
    pub fn as_str(self) -> &'static str {
        match self {
            FilterOp::Eq => "eq",
            FilterOp::Neq => "neq",
            FilterOp::Gt => "gt",
            FilterOp::Gte => "gte",
            FilterOp::Lt => "lt",
            FilterOp::Lte => "lte",
            FilterOp::Like => "like",
            FilterOp::Ilike => "ilike",
            FilterOp::In => "in",
            FilterOp::Is => "is",
        }
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single predicate restricting which rows a select/update/delete touches.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Filter {
    pub column: String,
    pub operator: FilterOp,
    pub value: Value,
}

impl Filter {
    /// Create a filter. The value is taken as-is; serialization is left to the dispatcher.
    pub fn new(column: impl Into<String>, operator: FilterOp, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            operator,
            value: value.into(),
        }
    }
}

/// One ORDER BY entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderSpec {
    pub column: String,
    pub ascending: bool,
}

impl OrderSpec {
    /// Ascending order on `column`.
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: true,
        }
    }

    /// Descending order on `column`.
    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: false,
        }
    }
}

/// Options accepted by [`QueryBuilder::order`](crate::QueryBuilder::order).
///
/// `ascending` falls back to `true` when left unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderOptions {
    pub ascending: Option<bool>,
}

impl OrderOptions {
    /// Options with an explicit direction.
    pub fn ascending(ascending: bool) -> Self {
        Self {
            ascending: Some(ascending),
        }
    }

    /// Shorthand for `ascending(false)`.
    pub fn descending() -> Self {
        Self::ascending(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn filter_serializes_lowercase_operator() {
        let filter = Filter::new("status", FilterOp::Neq, "archived");
        assert_eq!(
            serde_json::to_value(&filter).unwrap(),
            json!({"column": "status", "operator": "neq", "value": "archived"})
        );
    }

    #[test]
    fn operator_names_match_serde() {
        for op in [
            FilterOp::Eq,
            FilterOp::Neq,
            FilterOp::Gt,
            FilterOp::Gte,
            FilterOp::Lt,
            FilterOp::Lte,
            FilterOp::Like,
            FilterOp::Ilike,
            FilterOp::In,
            FilterOp::Is,
        ] {
            assert_eq!(serde_json::to_value(op).unwrap(), json!(op.as_str()));
        }
    }

    #[test]
    fn order_options_default_is_unset() {
        assert_eq!(OrderOptions::default().ascending, None);
        assert_eq!(OrderOptions::descending().ascending, Some(false));
    }
}
