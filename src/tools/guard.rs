//! Read-only guard for submitted queries.
//!
//! The default check is textual: the query, trimmed and lowercased, must start
//! with `select`. It does not parse SQL, so `select 1; drop table t` and
//! `select ... into new_table` both pass. Strict mode adds a parse with
//! [`sql_validator`](crate::tools::sql_validator) that closes those gaps.
//!
//! The query that passes is returned untouched: original casing and surrounding
//! whitespace are what gets executed.

use crate::error::{QueryError, QueryResult};
use crate::tools::sql_validator;

/// Leading keyword every accepted query must have.
const SELECT_PREFIX: &str = "select";

/// Accept a query iff it starts with `select`, ignoring case and surrounding whitespace.
pub fn validate_select(query: &str) -> QueryResult<&str> {
    if query.trim().to_lowercase().starts_with(SELECT_PREFIX) {
        Ok(query)
    } else {
        Err(QueryError::not_select())
    }
}

/// Guard applied by the tool handler before execution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryGuard {
    strict: bool,
}

impl QueryGuard {
    /// Prefix check only.
    pub fn new() -> Self {
        Self { strict: false }
    }

    /// Prefix check followed by a full parse.
    pub fn strict() -> Self {
        Self { strict: true }
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn validate<'q>(&self, query: &'q str) -> QueryResult<&'q str> {
        let query = validate_select(query)?;
        if self.strict {
            sql_validator::validate_plain_select(query)?;
        }
        Ok(query)
    }
}
