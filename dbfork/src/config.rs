//! Runtime configuration, built once at startup.

use crate::cli::Cli;
use crate::models::ServiceId;

/// Default name of the external database-service CLI.
pub const DEFAULT_CLI: &str = "tiger";

/// Connection settings used when the CLI cannot hand out a connection string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbFallback {
    pub host: String,
    /// Taken verbatim; a bad value surfaces as a connection error.
    pub port: String,
    pub user: String,
    pub password: Option<String>,
}

impl Default for DbFallback {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: "5432".to_string(),
            user: "postgres".to_string(),
            password: None,
        }
    }
}

impl DbFallback {
    /// Synthesize a connection string for `service`, using it as the database name.
    ///
    /// Never fails; an unusable result surfaces later as a connection error.
    /// User and password are percent-encoded.
    pub fn connection_string(&self, service: &ServiceId) -> String {
        let user = urlencoding::encode(&self.user);
        let credentials = match self.password.as_deref().filter(|p| !p.is_empty()) {
            Some(password) => format!("{user}:{}", urlencoding::encode(password)),
            None => user.into_owned(),
        };
        format!(
            "postgresql://{credentials}@{}:{}/{service}",
            self.host, self.port
        )
    }
}

/// Configuration for a demo run.
#[derive(Debug, Clone)]
pub struct DemoConfig {
    /// CLI command line, possibly with leading arguments (e.g. `npx tiger`).
    pub cli: String,
    /// `MAIN_DB`: primary source override.
    pub main_db: Option<String>,
    /// `TIGER_SERVICE_ID`: alternate source override.
    pub tiger_service_id: Option<String>,
    /// `TIGER_SERVICE`: alternate source override, lowest precedence.
    pub tiger_service: Option<String>,
    /// `TIGER_FORK_NAME`: explicit fork name.
    pub fork_name: Option<String>,
    /// `MAIN_DB_URL`: connection string for the source, skipping the CLI lookup.
    pub main_db_url: Option<String>,
    pub fallback: DbFallback,
    /// Verify server certificates on database connections.
    pub tls_verify: bool,
    /// Delete the fork when a later step fails.
    pub cleanup_on_error: bool,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            cli: DEFAULT_CLI.to_string(),
            main_db: None,
            tiger_service_id: None,
            tiger_service: None,
            fork_name: None,
            main_db_url: None,
            fallback: DbFallback::default(),
            tls_verify: false,
            cleanup_on_error: false,
        }
    }
}

impl DemoConfig {
    /// First non-blank source override, in precedence order.
    pub fn source_override(&self) -> Option<ServiceId> {
        [&self.main_db, &self.tiger_service_id, &self.tiger_service]
            .into_iter()
            .find_map(|value| ServiceId::from_setting(value.as_deref()))
    }

    /// The configured fork name, if set and non-blank.
    pub fn fork_name(&self) -> Option<&str> {
        non_blank(self.fork_name.as_deref())
    }

    /// The configured source connection string, if set and non-blank.
    pub fn main_db_url(&self) -> Option<&str> {
        non_blank(self.main_db_url.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl From<&Cli> for DemoConfig {
    fn from(cli: &Cli) -> Self {
        let cli_command = non_blank(Some(cli.tiger_cli.as_str())).unwrap_or(DEFAULT_CLI);
        Self {
            cli: cli_command.to_string(),
            main_db: cli.main_db.clone(),
            tiger_service_id: cli.tiger_service_id.clone(),
            tiger_service: cli.tiger_service.clone(),
            fork_name: cli.fork_name.clone(),
            main_db_url: cli.main_db_url.clone(),
            fallback: DbFallback {
                host: cli.db_host.clone(),
                port: cli.db_port.clone(),
                user: cli.db_user.clone(),
                password: cli.db_password.clone().filter(|p| !p.is_empty()),
            },
            tls_verify: cli.tls_verify,
            cleanup_on_error: cli.cleanup_on_error,
        }
    }
}
