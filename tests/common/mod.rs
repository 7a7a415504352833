//! In-memory query executor for pipeline tests.
//!
//! Each query is answered by a [`Script`] chosen from the SQL text. The executor
//! counts how many cursors it opened and how many were dropped.

#![allow(dead_code)]

use pg_table_mcp::db::{QueryExecutor, RowCursor, ScanValue};
use pg_table_mcp::error::{QueryError, QueryResult};
use serde_json::Value as JsonValue;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// How the executor answers one query.
#[derive(Debug, Clone, Default)]
pub struct Script {
    /// Fail at execution with this message.
    pub execution_error: Option<String>,
    pub columns: Vec<String>,
    /// Fail column introspection with this message.
    pub columns_error: Option<String>,
    /// `Err` entries fail that row's scan.
    pub rows: Vec<Result<Vec<ScanValue>, String>>,
    /// Reported once the rows are exhausted.
    pub deferred_error: Option<String>,
}

impl Script {
    pub fn rows(columns: &[&str], rows: Vec<Vec<ScanValue>>) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: rows.into_iter().map(Ok).collect(),
            ..Default::default()
        }
    }

    pub fn execution_error(message: &str) -> Self {
        Self {
            execution_error: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

type ScriptFn = dyn Fn(&str) -> Script + Send + Sync;

pub struct MockExecutor {
    script: Box<ScriptFn>,
    queries: Mutex<Vec<String>>,
    opened: AtomicUsize,
    released: Arc<AtomicUsize>,
}

impl MockExecutor {
    /// Answer every query with the same script.
    pub fn fixed(script: Script) -> Self {
        Self::with(move |_| script.clone())
    }

    pub fn with(script: impl Fn(&str) -> Script + Send + Sync + 'static) -> Self {
        Self {
            script: Box::new(script),
            queries: Mutex::new(Vec::new()),
            opened: AtomicUsize::new(0),
            released: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// SQL received so far, in order.
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

impl QueryExecutor for MockExecutor {
    type Cursor<'a> = MockCursor;

    async fn query<'a>(&'a self, sql: &'a str) -> QueryResult<MockCursor> {
        self.queries.lock().unwrap().push(sql.to_string());
        let script = (self.script)(sql);

        if let Some(message) = script.execution_error {
            return Err(QueryError::execution(message, None));
        }

        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(MockCursor {
            columns: match script.columns_error {
                Some(message) => Err(message),
                None => Ok(script.columns),
            },
            rows: script.rows.into(),
            deferred: script.deferred_error,
            released: self.released.clone(),
        })
    }

    async fn ping(&self) -> QueryResult<()> {
        Ok(())
    }
}

pub struct MockCursor {
    columns: Result<Vec<String>, String>,
    rows: VecDeque<Result<Vec<ScanValue>, String>>,
    deferred: Option<String>,
    released: Arc<AtomicUsize>,
}

impl RowCursor for MockCursor {
    fn columns(&self) -> QueryResult<Vec<String>> {
        self.columns
            .clone()
            .map_err(QueryError::column_introspection)
    }

    async fn next_row(&mut self) -> Option<QueryResult<Vec<ScanValue>>> {
        // Let concurrent requests interleave between rows.
        tokio::task::yield_now().await;
        self.rows
            .pop_front()
            .map(|row| row.map_err(QueryError::row_scan))
    }

    fn finish(&mut self) -> QueryResult<()> {
        match self.deferred.take() {
            Some(message) => Err(QueryError::cursor_stream(message)),
            None => Ok(()),
        }
    }
}

impl Drop for MockCursor {
    fn drop(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// Text of the first content item of a tool result.
pub fn result_text(result: &rmcp::model::CallToolResult) -> String {
    let value = serde_json::to_value(result).unwrap();
    value["content"][0]["text"]
        .as_str()
        .map(str::to_string)
        .unwrap_or_default()
}

/// Whether a tool result is flagged as an error.
pub fn is_error(result: &rmcp::model::CallToolResult) -> bool {
    result.is_error == Some(true)
}

/// Parse serialized rows back into JSON for structural comparison.
pub fn parse_rows(text: &str) -> JsonValue {
    serde_json::from_str(text).unwrap()
}
