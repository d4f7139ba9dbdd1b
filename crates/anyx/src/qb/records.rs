//! Row records accepted by `insert` / `update`.

use serde_json::{Map, Value};

/// A single row: column name to value.
pub type Record = Map<String, Value>;

/// Conversion into the row sequence sent with an INSERT.
///
/// A single record becomes a one-element sequence; sequences are kept as-is.
/// For a bare [`Value`], a JSON array is treated as a sequence and anything
/// else as one record.
pub trait IntoRecords {
    fn into_records(self) -> Vec<Value>;
}

impl IntoRecords for Value {
    fn into_records(self) -> Vec<Value> {
        match self {
            Value::Array(rows) => rows,
            other => vec![other],
        }
    }
}

impl IntoRecords for Record {
    fn into_records(self) -> Vec<Value> {
        vec![Value::Object(self)]
    }
}

impl IntoRecords for Vec<Value> {
    fn into_records(self) -> Vec<Value> {
        self
    }
}

impl IntoRecords for Vec<Record> {
    fn into_records(self) -> Vec<Value> {
        self.into_iter().map(Value::Object).collect()
    }
}

impl<const N: usize> IntoRecords for [Value; N] {
    fn into_records(self) -> Vec<Value> {
        self.into()
    }
}
