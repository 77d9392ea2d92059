//! Operations on managed database services, driven through the external CLI.

mod connection;
mod fork;
mod resolver;

pub use connection::{resolve_connection_string, resolve_source_connection};
pub use fork::{create_fork, delete_service};
pub use resolver::resolve_source_service;
