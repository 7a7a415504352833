//! Configuration handling for the table data server.
//!
//! This module provides configuration management via CLI arguments and environment variables.

use crate::error::{QueryError, QueryResult};
use clap::Parser;
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_DB_HOST: &str = "localhost";
pub const DEFAULT_DB_PORT: u16 = 5432;
pub const DEFAULT_DB_USER: &str = "root";
pub const DEFAULT_DB_PASSWORD: &str = "password";
pub const DEFAULT_DB_NAME: &str = "mydb";
pub const DEFAULT_SSL_MODE: &str = "disable";

pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Recognized `sslmode` values.
const SSL_MODES: &[&str] = &[
    "disable",
    "allow",
    "prefer",
    "require",
    "verify-ca",
    "verify-full",
];

/// PostgreSQL connection fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    /// Sensitive - never log
    pub password: String,
    pub dbname: String,
    pub sslmode: String,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_DB_HOST.to_string(),
            port: DEFAULT_DB_PORT,
            user: DEFAULT_DB_USER.to_string(),
            password: DEFAULT_DB_PASSWORD.to_string(),
            dbname: DEFAULT_DB_NAME.to_string(),
            sslmode: DEFAULT_SSL_MODE.to_string(),
        }
    }
}

impl ConnectionSettings {
    /// Key/value connection string, e.g. `user=root password=password dbname=mydb sslmode=disable`.
    pub fn connection_string(&self) -> String {
        self.render(&self.password)
    }

    /// Connection string with the password replaced, safe for logs.
    pub fn masked_connection_string(&self) -> String {
        self.render("****")
    }

    fn render(&self, password: &str) -> String {
        let port = self.port.to_string();
        [
            ("host", self.host.as_str()),
            ("port", port.as_str()),
            ("user", self.user.as_str()),
            ("password", password),
            ("dbname", self.dbname.as_str()),
            ("sslmode", self.sslmode.as_str()),
        ]
        .iter()
        .map(|(key, value)| format!("{}={}", key, quote_value(value)))
        .collect::<Vec<_>>()
        .join(" ")
    }

    /// Parse `sslmode` into the driver's representation.
    pub fn ssl_mode(&self) -> QueryResult<PgSslMode> {
        let mode = self.sslmode.trim().to_ascii_lowercase();
        if !SSL_MODES.contains(&mode.as_str()) {
            return Err(QueryError::connection(
                format!("Invalid sslmode '{}'", self.sslmode),
                format!("Use one of: {}", SSL_MODES.join(", ")),
            ));
        }
        PgSslMode::from_str(&mode).map_err(|e| {
            QueryError::connection(
                format!("Invalid sslmode '{}': {}", self.sslmode, e),
                format!("Use one of: {}", SSL_MODES.join(", ")),
            )
        })
    }

    /// Build driver connect options.
    pub fn connect_options(&self) -> QueryResult<PgConnectOptions> {
        Ok(PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.dbname)
            .ssl_mode(self.ssl_mode()?))
    }
}

/// Quote a connection string value when it is empty or contains spaces, quotes or backslashes.
fn quote_value(value: &str) -> String {
    let needs_quotes = value.is_empty()
        || value
            .chars()
            .any(|c| c.is_whitespace() || c == '\'' || c == '\\');
    if !needs_quotes {
        return value.to_string();
    }
    let escaped = value.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{}'", escaped)
}

/// Configuration for the table data server.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "pg-table-mcp",
    about = "MCP server exposing a read-only SELECT tool over a PostgreSQL database",
    version,
    author
)]
pub struct Config {
    /// Database host
    #[arg(long, default_value = DEFAULT_DB_HOST, env = "MCP_DB_HOST")]
    pub host: String,

    /// Database port
    #[arg(long, default_value_t = DEFAULT_DB_PORT, env = "MCP_DB_PORT")]
    pub port: u16,

    /// Database user
    #[arg(long, default_value = DEFAULT_DB_USER, env = "MCP_DB_USER")]
    pub user: String,

    /// Database password
    #[arg(
        long,
        default_value = DEFAULT_DB_PASSWORD,
        env = "MCP_DB_PASSWORD",
        hide_env_values = true,
        hide_default_value = true
    )]
    pub password: String,

    /// Database name
    #[arg(long, default_value = DEFAULT_DB_NAME, env = "MCP_DB_NAME")]
    pub dbname: String,

    /// SSL mode (disable, allow, prefer, require, verify-ca, verify-full)
    #[arg(long, default_value = DEFAULT_SSL_MODE, env = "MCP_DB_SSLMODE")]
    pub sslmode: String,

    /// Maximum connections in the pool
    #[arg(
        long,
        default_value_t = DEFAULT_MAX_CONNECTIONS,
        env = "MCP_MAX_CONNECTIONS"
    )]
    pub max_connections: u32,

    /// Connection timeout in seconds
    #[arg(
        long,
        default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS,
        env = "MCP_CONNECT_TIMEOUT"
    )]
    pub connect_timeout: u64,

    /// Query timeout in seconds
    #[arg(
        long,
        default_value_t = DEFAULT_QUERY_TIMEOUT_SECS,
        env = "MCP_QUERY_TIMEOUT"
    )]
    pub query_timeout: u64,

    /// Parse queries and reject anything that is not a plain SELECT
    /// (multiple statements, SELECT ... INTO). Off by default.
    #[arg(long, env = "MCP_STRICT_SQL")]
    pub strict_sql: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "MCP_LOG_LEVEL")]
    pub log_level: String,

    /// Enable JSON logging format
    #[arg(long, env = "MCP_JSON_LOGS")]
    pub json_logs: bool,

    /// Enable logging output (written to stderr; stdout carries the protocol)
    #[arg(long, env = "MCP_ENABLE_LOGS")]
    pub enable_logs: bool,
}

impl Config {
    /// Parse configuration from command line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Create a default configuration (useful for testing).
    pub fn default_config() -> Self {
        let conn = ConnectionSettings::default();
        Self {
            host: conn.host,
            port: conn.port,
            user: conn.user,
            password: conn.password,
            dbname: conn.dbname,
            sslmode: conn.sslmode,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT_SECS,
            query_timeout: DEFAULT_QUERY_TIMEOUT_SECS,
            strict_sql: false,
            log_level: "info".to_string(),
            json_logs: false,
            enable_logs: false,
        }
    }

    pub fn connection_settings(&self) -> ConnectionSettings {
        ConnectionSettings {
            host: self.host.clone(),
            port: self.port,
            user: self.user.clone(),
            password: self.password.clone(),
            dbname: self.dbname.clone(),
            sslmode: self.sslmode.clone(),
        }
    }

    /// Get the query timeout as a Duration.
    pub fn query_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.query_timeout)
    }

    /// Get the connection timeout as a Duration.
    pub fn connect_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }

    /// Validate values clap cannot check on its own.
    pub fn validate(&self) -> QueryResult<()> {
        if self.max_connections == 0 {
            return Err(QueryError::invalid_input(
                "max_connections must be greater than 0",
            ));
        }
        if self.query_timeout == 0 {
            return Err(QueryError::invalid_input(
                "query_timeout must be greater than 0",
            ));
        }
        if self.connect_timeout == 0 {
            return Err(QueryError::invalid_input(
                "connect_timeout must be greater than 0",
            ));
        }
        self.connection_settings().ssl_mode()?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
