//! Postgres access: connection descriptors, single-statement execution and
//! the `test_data` queries used to prove fork isolation.

mod descriptor;
mod executor;
mod postgres;
mod queries;

pub use descriptor::{redact_passwords, ConnectionDescriptor};
pub use executor::{Connector, DbSession, QueryExecutor};
pub use postgres::PgConnector;
pub use queries::{insert_test_row, query_test_rows};
