//! Data models for the table data server.

pub mod row;

pub use row::{ResultSet, Row, RowValue};
