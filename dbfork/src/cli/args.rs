//! CLI argument definitions.

use clap::builder::FalseyValueParser;
use clap::{Parser, Subcommand};

/// dbfork - Demonstrate zero-copy database forks on a managed Postgres service
#[derive(Parser, Debug)]
#[command(name = "dbfork")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Database-service CLI to invoke (may include leading arguments, e.g. "npx tiger")
    #[arg(long = "cli", env = "TIGER_CLI", default_value = "tiger", global = true)]
    pub tiger_cli: String,

    // === Source Service ===
    /// Service to fork
    #[arg(long, env = "MAIN_DB", global = true)]
    pub main_db: Option<String>,

    /// Service to fork (alternate name, used when MAIN_DB is unset)
    #[arg(long = "service-id", env = "TIGER_SERVICE_ID", global = true)]
    pub tiger_service_id: Option<String>,

    /// Service to fork (alternate name, used when MAIN_DB and TIGER_SERVICE_ID are unset)
    #[arg(long = "service", env = "TIGER_SERVICE", global = true)]
    pub tiger_service: Option<String>,

    /// Connection string for the source service, skipping the CLI lookup
    #[arg(long, env = "MAIN_DB_URL", hide_env_values = true, global = true)]
    pub main_db_url: Option<String>,

    // === Fork ===
    /// Name for the fork (default: <service>-fork-<unix millis>)
    #[arg(long, env = "TIGER_FORK_NAME", global = true)]
    pub fork_name: Option<String>,

    /// Delete the fork if a later step fails
    #[arg(long, env = "DBFORK_CLEANUP_ON_ERROR", value_parser = FalseyValueParser::new(), global = true)]
    pub cleanup_on_error: bool,

    // === Fallback Connection Settings ===
    /// Host used when the CLI cannot provide a connection string
    #[arg(long, env = "TD_DB_HOST", default_value = "localhost", global = true)]
    pub db_host: String,

    /// Port used when the CLI cannot provide a connection string
    ///
    /// Kept as text: it only ends up inside a fallback connection string.
    #[arg(long, env = "TD_DB_PORT", default_value = "5432", global = true)]
    pub db_port: String,

    /// User used when the CLI cannot provide a connection string
    #[arg(long, env = "TD_DB_USER", default_value = "postgres", global = true)]
    pub db_user: String,

    /// Password used when the CLI cannot provide a connection string
    #[arg(long, env = "TD_DB_PASSWORD", hide_env_values = true, global = true)]
    pub db_password: Option<String>,

    /// Verify database server certificates
    #[arg(long, env = "DBFORK_TLS_VERIFY", value_parser = FalseyValueParser::new(), global = true)]
    pub tls_verify: bool,

    /// Subcommand to execute (default: run)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Fork the source service, prove isolation, delete the fork
    Run,

    /// Print the service that would be forked
    Resolve,

    /// Print the connection string for a service
    ConnectionString {
        /// Service ID to look up
        service_id: String,

        /// Print the password instead of masking it
        #[arg(long)]
        show_password: bool,
    },

    /// Delete a service, e.g. a fork left behind by a failed run
    Delete {
        /// Service ID to delete
        service_id: String,
    },
}
