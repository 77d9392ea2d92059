//! Parsing connection strings into driver options.

use std::borrow::Cow;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use url::Url;

use crate::error::DemoError;

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 5432;
const DEFAULT_USER: &str = "postgres";
const DEFAULT_DATABASE: &str = "postgres";

static URL_PASSWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(postgres(?:ql)?://[^:/@\s]*:)[^@\s]+@").expect("password pattern is valid")
});

/// Mask passwords inside any Postgres URLs found in `text`.
pub fn redact_passwords(text: &str) -> Cow<'_, str> {
    URL_PASSWORD.replace_all(text, "${1}***@")
}

/// Address and credentials for one database.
///
/// Every component has a default, so a sparse string like
/// `postgresql:///mydb` still yields a complete descriptor.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    pub scheme: String,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<String>,
    pub database: String,
    /// Query parameters, passed through to the driver.
    pub options: Vec<(String, String)>,
    /// The trimmed input, kept for the driver's own parameter handling.
    raw: String,
}

impl ConnectionDescriptor {
    /// Parse a `postgres://` or `postgresql://` connection string.
    pub fn parse(connection_string: &str) -> Result<Self, DemoError> {
        let raw = connection_string.trim();
        let url = Url::parse(raw)
            .map_err(|e| DemoError::InvalidConnectionString(e.to_string()))?;

        if !matches!(url.scheme(), "postgres" | "postgresql") {
            return Err(DemoError::InvalidConnectionString(format!(
                "unsupported scheme `{}`",
                url.scheme()
            )));
        }

        let host = url
            .host_str()
            .map(|h| h.trim_start_matches('[').trim_end_matches(']'))
            .filter(|h| !h.is_empty())
            .unwrap_or(DEFAULT_HOST)
            .to_string();

        Ok(Self {
            scheme: url.scheme().to_string(),
            host,
            port: url.port().unwrap_or(DEFAULT_PORT),
            user: non_empty(decode(url.username())).unwrap_or_else(|| DEFAULT_USER.to_string()),
            password: url.password().and_then(|p| non_empty(decode(p))),
            database: non_empty(decode(url.path().trim_start_matches('/')))
                .unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            options: url
                .query_pairs()
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
            raw: raw.to_string(),
        })
    }

    /// Look up a pass-through option by key.
    pub fn option(&self, key: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Driver options for this descriptor.
    ///
    /// Query parameters go through the driver's own URL handling (`options`,
    /// `application_name`, certificate paths and so on); the defaulted
    /// address fields and the TLS policy are applied on top.
    pub fn to_pg_options(&self, tls_verify: bool) -> Result<PgConnectOptions, sqlx::Error> {
        let mut options = self
            .raw
            .parse::<PgConnectOptions>()?
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .database(&self.database);

        if let Some(password) = &self.password {
            options = options.password(password);
        }

        let requested_ssl = self
            .option("sslmode")
            .and_then(|mode| mode.parse::<PgSslMode>().ok());

        Ok(options.ssl_mode(effective_ssl_mode(requested_ssl, tls_verify)))
    }
}

/// Certificate checks stay off unless verification is enabled: a requested
/// `verify-ca`/`verify-full` is downgraded to plain `require`.
fn effective_ssl_mode(requested: Option<PgSslMode>, tls_verify: bool) -> PgSslMode {
    match (requested, tls_verify) {
        (Some(PgSslMode::VerifyCa | PgSslMode::VerifyFull), false) => PgSslMode::Require,
        (Some(PgSslMode::VerifyCa), true) => PgSslMode::VerifyCa,
        (_, true) => PgSslMode::VerifyFull,
        (Some(mode), false) => mode,
        (None, false) => PgSslMode::Prefer,
    }
}

fn decode(raw: &str) -> String {
    urlencoding::decode(raw).map_or_else(|_| raw.to_string(), Cow::into_owned)
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

impl fmt::Display for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.user)?;
        if self.password.is_some() {
            f.write_str(":***")?;
        }
        write!(f, "@{}:{}/{}", self.host, self.port, self.database)
    }
}

impl fmt::Debug for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionDescriptor")
            .field("scheme", &self.scheme)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("database", &self.database)
            .field("options", &self.options)
            .finish()
    }
}
