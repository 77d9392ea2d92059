//! Postgres implementation of the executor traits, backed by `sqlx`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use futures::TryStreamExt;
use serde_json::Value;
use sqlx::postgres::{PgConnection, PgRow};
use sqlx::{Column, Connection, Either, Executor, Row as _, TypeInfo};

use super::descriptor::ConnectionDescriptor;
use super::executor::{Connector, DbSession};
use crate::models::{QueryOutcome, Row};

/// Opens plain (unpooled) Postgres connections.
#[derive(Debug, Clone, Copy, Default)]
pub struct PgConnector {
    tls_verify: bool,
}

impl PgConnector {
    pub const fn new(tls_verify: bool) -> Self {
        Self { tls_verify }
    }
}

impl Connector for PgConnector {
    type Session = PgSession;

    async fn connect(&self, descriptor: &ConnectionDescriptor) -> Result<PgSession, sqlx::Error> {
        let options = descriptor.to_pg_options(self.tls_verify)?;
        let conn = PgConnection::connect_with(&options).await?;
        Ok(PgSession { conn })
    }
}

pub struct PgSession {
    conn: PgConnection,
}

impl DbSession for PgSession {
    async fn execute(&mut self, sql: &str) -> Result<QueryOutcome, sqlx::Error> {
        let mut outcome = QueryOutcome::default();
        // Unprepared: runs any statement text as-is over the simple protocol.
        let mut results = (&mut self.conn).fetch_many(sql);
        while let Some(step) = results.try_next().await? {
            match step {
                Either::Left(done) => {
                    *outcome.rows_affected.get_or_insert(0) += done.rows_affected();
                }
                Either::Right(row) => outcome.rows.push(row_to_json(&row)),
            }
        }
        Ok(outcome)
    }

    async fn close(self) -> Result<(), sqlx::Error> {
        self.conn.close().await
    }
}

fn row_to_json(row: &PgRow) -> Row {
    row.columns()
        .iter()
        .map(|column| {
            let value = decode_value(row, column.ordinal(), column.type_info().name());
            (column.name().to_string(), value)
        })
        .collect()
}

/// Best-effort conversion of one column to JSON; anything undecodable is `null`.
fn decode_value(row: &PgRow, index: usize, type_name: &str) -> Value {
    let decoded = match type_name {
        "BOOL" => row.try_get::<Option<bool>, _>(index).map(|v| v.map(Value::from)),
        "INT2" => row.try_get::<Option<i16>, _>(index).map(|v| v.map(Value::from)),
        "INT4" => row.try_get::<Option<i32>, _>(index).map(|v| v.map(Value::from)),
        "INT8" => row.try_get::<Option<i64>, _>(index).map(|v| v.map(Value::from)),
        "FLOAT4" => row.try_get::<Option<f32>, _>(index).map(|v| v.map(Value::from)),
        "FLOAT8" => row.try_get::<Option<f64>, _>(index).map(|v| v.map(Value::from)),
        "TIMESTAMPTZ" => row
            .try_get::<Option<DateTime<Utc>>, _>(index)
            .map(|v| v.map(|ts| Value::from(ts.to_rfc3339()))),
        "TIMESTAMP" => row
            .try_get::<Option<NaiveDateTime>, _>(index)
            .map(|v| v.map(|ts| Value::from(ts.to_string()))),
        "DATE" => row
            .try_get::<Option<NaiveDate>, _>(index)
            .map(|v| v.map(|d| Value::from(d.to_string()))),
        _ => row
            .try_get_unchecked::<Option<String>, _>(index)
            .map(|v| v.map(Value::from)),
    };
    decoded.ok().flatten().unwrap_or(Value::Null)
}
