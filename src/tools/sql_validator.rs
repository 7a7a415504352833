//! Strict SQL validation for read-only enforcement.
//!
//! Used when the server runs with `--strict-sql`. The query is parsed with
//! [sqlparser](https://docs.rs/sqlparser/) using the PostgreSQL dialect and every
//! statement must be a plain query: no stacked write statements, no
//! `SELECT ... INTO`, no row-locking clauses and no data-modifying set
//! expressions.

use crate::error::{QueryError, QueryResult};
use sqlparser::ast::{Query, SetExpr, Statement};
use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;

const PARSE_ERROR: &str = "Failed to parse SQL statement.";

/// Validate that `sql` consists only of plain SELECT queries.
pub fn validate_plain_select(sql: &str) -> QueryResult<()> {
    let statements = Parser::parse_sql(&PostgreSqlDialect {}, sql)
        .map_err(|e| QueryError::invalid_input(format!("{} Error: {}", PARSE_ERROR, e)))?;

    if statements.is_empty() {
        return Err(QueryError::invalid_input("Empty SQL statement"));
    }

    for stmt in &statements {
        validate_statement(stmt)?;
    }
    Ok(())
}

fn validate_statement(stmt: &Statement) -> QueryResult<()> {
    match stmt {
        Statement::Query(query) => validate_query(query),
        other => Err(QueryError::not_select_statement(statement_name(other))),
    }
}

fn validate_query(query: &Query) -> QueryResult<()> {
    if !query.locks.is_empty() {
        return Err(QueryError::not_select_statement("SELECT FOR UPDATE"));
    }
    if let Some(with) = &query.with {
        for cte in &with.cte_tables {
            validate_query(&cte.query)?;
        }
    }
    validate_set_expr(&query.body)
}

fn validate_set_expr(expr: &SetExpr) -> QueryResult<()> {
    match expr {
        SetExpr::Select(select) => {
            if select.into.is_some() {
                return Err(QueryError::not_select_statement("SELECT INTO"));
            }
            Ok(())
        }
        SetExpr::Query(query) => validate_query(query),
        SetExpr::SetOperation { left, right, .. } => {
            validate_set_expr(left)?;
            validate_set_expr(right)
        }
        SetExpr::Values(_) | SetExpr::Table(_) => Ok(()),
        // INSERT/UPDATE/DELETE used as a query body (data-modifying CTEs)
        _ => Err(QueryError::not_select_statement("data-modifying query")),
    }
}

/// Leading keyword of a statement, for error reporting.
fn statement_name(stmt: &Statement) -> String {
    stmt.to_string()
        .split_whitespace()
        .next()
        .map(str::to_uppercase)
        .unwrap_or_else(|| "Unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejected_statement(sql: &str) -> Option<String> {
        match validate_plain_select(sql) {
            Err(QueryError::NotSelectQuery { statement }) => statement,
            other => panic!("expected NotSelectQuery for {sql:?}, got {other:?}"),
        }
    }

    #[test]
    fn test_plain_select_ok() {
        assert!(validate_plain_select("SELECT * FROM users WHERE id = 1").is_ok());
        assert!(validate_plain_select("select a from t1 union all select b from t2").is_ok());
        assert!(
            validate_plain_select("SELECT u.name, (SELECT count(*) FROM orders o WHERE o.user_id = u.id) FROM users u")
                .is_ok()
        );
    }

    #[test]
    fn test_stacked_write_rejected() {
        assert_eq!(
            rejected_statement("select 1; drop table x").as_deref(),
            Some("DROP")
        );
        assert_eq!(
            rejected_statement("SELECT 1; DELETE FROM users").as_deref(),
            Some("DELETE")
        );
    }

    #[test]
    fn test_select_into_rejected() {
        assert_eq!(
            rejected_statement("select * into backup from users").as_deref(),
            Some("SELECT INTO")
        );
    }

    #[test]
    fn test_locking_select_rejected() {
        assert_eq!(
            rejected_statement("select * from users for update").as_deref(),
            Some("SELECT FOR UPDATE")
        );
    }

    #[test]
    fn test_multiple_selects_allowed() {
        assert!(validate_plain_select("select 1; select 2").is_ok());
    }

    #[test]
    fn test_unparseable_sql_is_invalid_input() {
        let err = validate_plain_select("select * from (").unwrap_err();
        assert!(matches!(err, QueryError::InvalidInput { .. }));
        assert!(err.to_string().contains("Failed to parse"));
    }
}
