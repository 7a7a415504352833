//! Database abstraction layer.
//!
//! This module provides database access functionality:
//! - Executor and cursor traits the query pipeline is written against
//! - PostgreSQL executor and cursor
//! - Column type classification and row scanning
//! - Connection pool bootstrap

pub mod cursor;
pub mod pool;
pub mod postgres;
pub mod types;

pub use cursor::{QueryExecutor, RowCursor, ScanValue};
pub use pool::{connect, with_statement_timeout};
pub use postgres::{PgCursor, PgExecutor};
