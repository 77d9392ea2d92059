//! Data models for the fork demo.

mod fork;
mod row;
mod service;

pub use fork::ForkRecord;
pub use row::{QueryOutcome, Row};
pub use service::ServiceId;
