//! Queries against the `test_data` table used to prove fork isolation.

use chrono::Utc;

use super::executor::{Connector, QueryExecutor};
use crate::error::DemoError;
use crate::models::{Row, ServiceId};

/// Table written to by the demo, in both source and fork.
pub const TEST_TABLE: &str = "test_data";

fn create_table_sql() -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {TEST_TABLE} (
            id SERIAL PRIMARY KEY,
            message TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            db_name TEXT NOT NULL
        )"
    )
}

fn insert_sql(message: &str, service: &ServiceId) -> String {
    format!(
        "INSERT INTO {TEST_TABLE} (message, db_name) VALUES ({}, {}) RETURNING *",
        quote_literal(message),
        quote_literal(service.as_str())
    )
}

fn select_sql() -> String {
    format!("SELECT * FROM {TEST_TABLE} ORDER BY created_at DESC")
}

/// Render `value` as a SQL string literal.
fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Make sure `test_data` exists, then insert one row tagged with `service`.
///
/// Returns the inserted row.
pub async fn insert_test_row<C: Connector>(
    executor: &QueryExecutor<C>,
    connection_string: &str,
    service: &ServiceId,
) -> Result<Option<Row>, DemoError> {
    executor
        .run(
            connection_string,
            &create_table_sql(),
            &format!("Ensure {TEST_TABLE} exists on {service}"),
        )
        .await?;

    let message = format!("Written to {service} at {}", Utc::now().to_rfc3339());
    let rows = executor
        .run(
            connection_string,
            &insert_sql(&message, service),
            &format!("Insert test row into {service}"),
        )
        .await?;

    Ok(rows.into_iter().next())
}

/// All `test_data` rows, newest first.
pub async fn query_test_rows<C: Connector>(
    executor: &QueryExecutor<C>,
    connection_string: &str,
    label: &str,
) -> Result<Vec<Row>, DemoError> {
    executor
        .run(
            connection_string,
            &select_sql(),
            &format!("Query {TEST_TABLE} on {label}"),
        )
        .await
}
