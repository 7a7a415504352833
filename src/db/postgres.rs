//! PostgreSQL query executor.
//!
//! Statements run through sqlx without bound arguments, which uses the simple
//! query protocol: the statement text is sent as-is and rows stream back in text
//! format. Only the first statement's result set is read; the stream is dropped at
//! its completion marker and the rows of any later statements are discarded. The
//! first row is fetched eagerly so that syntax, permission and connectivity errors
//! surface as execution failures instead of cursor errors; server-reported errors
//! keep the server's message verbatim.
//!
//! The query timeout is enforced by the server through `statement_timeout` (see
//! [`crate::db::pool`]). The client-side wait allows a grace period on top of it
//! and only fires when the server does not answer at all.

use crate::db::cursor::{QueryExecutor, RowCursor, ScanValue};
use crate::db::types;
use crate::error::{QueryError, QueryResult};
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use sqlx::postgres::{PgQueryResult, PgRow};
use sqlx::{Column, Connection, Either, Executor, PgPool, Row};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, trace};

/// Extra client-side wait past the server's statement timeout.
const CLIENT_TIMEOUT_GRACE: Duration = Duration::from_secs(5);

type ResultStream<'a> = BoxStream<'a, Result<Either<PgQueryResult, PgRow>, sqlx::Error>>;

/// Query executor backed by a shared connection pool.
#[derive(Debug, Clone)]
pub struct PgExecutor {
    pool: PgPool,
    query_timeout: Duration,
}

impl PgExecutor {
    pub fn new(pool: PgPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    /// Close the connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

impl QueryExecutor for PgExecutor {
    type Cursor<'a> = PgCursor<'a>;

    async fn query<'a>(&'a self, sql: &'a str) -> QueryResult<PgCursor<'a>> {
        debug!(sql = %sql, timeout_secs = self.query_timeout.as_secs(), "Executing query");

        let mut results = self.pool.fetch_many(sql);
        let first = match timeout(self.query_timeout + CLIENT_TIMEOUT_GRACE, results.next()).await {
            Ok(Some(Ok(Either::Right(row)))) => First::Row(row),
            Ok(Some(Ok(Either::Left(_)))) | Ok(None) => First::Done,
            Ok(Some(Err(e))) => return Err(QueryError::from(e)),
            Err(_) => {
                return Err(QueryError::execution(
                    format!(
                        "query execution exceeded {}s",
                        self.query_timeout.as_secs()
                    ),
                    None,
                ));
            }
        };

        Ok(PgCursor::new(results, first))
    }

    async fn ping(&self) -> QueryResult<()> {
        let mut conn = self.pool.acquire().await.map_err(|e| {
            QueryError::connection(
                format!("Cannot connect to DB: {}", driver_message(&e)),
                "Check that PostgreSQL is running and the credentials are correct",
            )
        })?;
        conn.ping().await.map_err(|e| {
            QueryError::connection(
                format!("Cannot connect to DB: {}", driver_message(&e)),
                "Check network connectivity and database server status",
            )
        })
    }
}

/// Outcome of the eager fetch.
enum First {
    Row(PgRow),
    /// The first statement completed without rows.
    Done,
}

/// Cursor over a streaming PostgreSQL result.
///
/// Dropping the cursor drops the row stream, which returns its connection to the pool.
pub struct PgCursor<'a> {
    results: ResultStream<'a>,
    /// Row pulled during execution, not yet handed out.
    pending: Option<PgRow>,
    columns: Vec<String>,
    /// Set once the first statement's result set has ended.
    done: bool,
    deferred: Option<sqlx::Error>,
    fetched: usize,
}

impl<'a> PgCursor<'a> {
    fn new(results: ResultStream<'a>, first: First) -> Self {
        let (pending, done) = match first {
            First::Row(row) => (Some(row), false),
            First::Done => (None, true),
        };
        // An empty result has no rows to take column names from.
        let columns = pending
            .as_ref()
            .map(|row| row.columns().iter().map(|c| c.name().to_string()).collect())
            .unwrap_or_default();
        Self {
            results,
            pending,
            columns,
            done,
            deferred: None,
            fetched: 0,
        }
    }
}

impl RowCursor for PgCursor<'_> {
    fn columns(&self) -> QueryResult<Vec<String>> {
        Ok(self.columns.clone())
    }

    async fn next_row(&mut self) -> Option<QueryResult<Vec<ScanValue>>> {
        let row = match self.pending.take() {
            Some(row) => row,
            None if self.done || self.deferred.is_some() => return None,
            None => match self.results.next().await {
                Some(Ok(Either::Right(row))) => row,
                // End of the first statement; later statements are not read.
                Some(Ok(Either::Left(_))) | None => {
                    self.done = true;
                    return None;
                }
                Some(Err(e)) => {
                    self.deferred = Some(e);
                    return None;
                }
            },
        };
        self.fetched += 1;
        Some(types::scan_row(&row, self.columns.len()))
    }

    fn finish(&mut self) -> QueryResult<()> {
        match self.deferred.take() {
            Some(e) => Err(QueryError::cursor_stream(driver_message(&e))),
            None => Ok(()),
        }
    }
}

impl Drop for PgCursor<'_> {
    fn drop(&mut self) {
        trace!(rows = self.fetched, "Cursor released");
    }
}

/// Human-readable message of a driver error.
fn driver_message(err: &sqlx::Error) -> String {
    match err {
        sqlx::Error::Database(db_err) => db_err.message().to_string(),
        other => other.to_string(),
    }
}
