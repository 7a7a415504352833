//! Executor and cursor abstractions.
//!
//! The query pipeline only talks to the database through these two traits, so the
//! decoder and tool handler can run against any backend (and against in-memory
//! fakes in tests).
//!
//! A cursor is forward-only. It is released when dropped, which covers every exit
//! path of the code holding it.

use crate::error::QueryResult;
use std::future::Future;

/// Raw value of one column slot, as produced by the driver.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Raw binary payload (bytea and friends).
    Bytes(Vec<u8>),
}

/// Forward-only iteration over the rows of one executed query.
pub trait RowCursor: Send {
    /// Column names of the result set, in order.
    fn columns(&self) -> QueryResult<Vec<String>>;

    /// Scan the next row into one slot per column.
    ///
    /// Returns `None` when the cursor is exhausted or the underlying stream failed;
    /// in the latter case the failure is reported by [`RowCursor::finish`].
    /// A row that cannot be scanned yields `Some(Err(_))`.
    fn next_row(&mut self) -> impl Future<Output = Option<QueryResult<Vec<ScanValue>>>> + Send;

    /// Report an error deferred until the end of the stream, if any.
    fn finish(&mut self) -> QueryResult<()>;
}

/// Something that can run SQL and hand back a cursor.
///
/// Implementations are shared across concurrent requests.
pub trait QueryExecutor: Send + Sync {
    type Cursor<'a>: RowCursor + 'a
    where
        Self: 'a;

    /// Execute a statement. Errors here are execution failures.
    fn query<'a>(
        &'a self,
        sql: &'a str,
    ) -> impl Future<Output = QueryResult<Self::Cursor<'a>>> + Send + 'a;

    /// Verify the database is reachable.
    fn ping(&self) -> impl Future<Output = QueryResult<()>> + Send;
}
