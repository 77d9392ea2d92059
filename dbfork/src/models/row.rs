//! Query result rows.

use serde_json::{Map, Value};

/// One result row: column name to value, in column order.
pub type Row = Map<String, Value>;

/// Everything a single statement produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOutcome {
    /// Rows returned, in the order the server sent them.
    pub rows: Vec<Row>,
    /// Rows affected, when the statement reports a count.
    pub rows_affected: Option<u64>,
}
