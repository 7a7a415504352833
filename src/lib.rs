//! PostgreSQL table data MCP server library.
//!
//! Exposes one MCP tool, `get_table_data`, that runs a read-only SQL query and
//! returns the rows as JSON objects keyed by column name.

pub mod config;
pub mod db;
pub mod error;
pub mod mcp;
pub mod models;
pub mod tools;
pub mod transport;

pub use config::Config;
pub use error::{QueryError, QueryResult};
pub use mcp::TableDataService;
