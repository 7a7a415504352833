//! Result serialization.
//!
//! A result set is rendered as an indented JSON array with one object per row.
//! Keys follow the column order of the query.

use crate::error::{QueryError, QueryResult};
use crate::models::Row;

/// Render rows as indented JSON. An empty result renders as `[]`.
pub fn serialize_rows(rows: &[Row]) -> QueryResult<String> {
    serde_json::to_string_pretty(rows).map_err(|e| QueryError::serialization(e.to_string()))
}
