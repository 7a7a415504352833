//! Connection pool bootstrap.
//!
//! The pool is created once at startup and shared by every request for the
//! lifetime of the process. Failing to connect here is fatal to the server.

use crate::config::Config;
use crate::db::cursor::QueryExecutor;
use crate::db::postgres::PgExecutor;
use crate::error::{QueryError, QueryResult};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use std::time::Duration;
use tracing::info;

/// Have the server cancel any statement running longer than `timeout`.
///
/// A cancelled statement fails with the server's own error and leaves its
/// connection idle, so the pool can hand it to the next request.
pub fn with_statement_timeout(
    options: PgConnectOptions,
    timeout: Duration,
) -> PgConnectOptions {
    options.options([("statement_timeout", timeout.as_millis())])
}

/// Create the connection pool described by `config` and verify it with a ping.
pub async fn connect(config: &Config) -> QueryResult<PgExecutor> {
    let settings = config.connection_settings();
    let options =
        with_statement_timeout(settings.connect_options()?, config.query_timeout_duration());

    info!(
        connection = %settings.masked_connection_string(),
        max_connections = config.max_connections,
        query_timeout_secs = config.query_timeout,
        "Connecting to database"
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.connect_timeout_duration())
        .connect_with(options)
        .await
        .map_err(|e| {
            QueryError::connection(
                format!("Cannot connect to DB: {}", e),
                "Check the connection settings and that PostgreSQL is reachable",
            )
        })?;

    let executor = PgExecutor::new(pool, config.query_timeout_duration());
    executor.ping().await?;

    info!(dbname = %settings.dbname, "Database connection verified");
    Ok(executor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_timeout_is_sent_in_milliseconds() {
        let options = with_statement_timeout(PgConnectOptions::new(), Duration::from_secs(30));
        assert!(
            options
                .get_options()
                .unwrap_or_default()
                .contains("-c statement_timeout=30000")
        );
    }
}
