//! PostgreSQL column typing.
//!
//! Rows arrive over the simple query protocol, so every value is in the server's
//! text format. Columns are classified by type name into a small set of
//! categories: integers, floats, booleans and binary payloads are decoded into
//! native values, everything else (numeric, dates, json, uuid, arrays, ...) keeps
//! the server's text representation.

use crate::db::cursor::ScanValue;
use crate::error::{QueryError, QueryResult};
use sqlx::postgres::PgRow;
use sqlx::{Column, Decode, Postgres, Row, Type, TypeInfo};

/// Logical category for a PostgreSQL column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCategory {
    Integer,
    Float,
    Boolean,
    Binary,
    Text,
}

/// Classify a PostgreSQL type name into a logical category.
pub fn categorize_type(type_name: &str) -> TypeCategory {
    match type_name.to_ascii_lowercase().as_str() {
        "int2" | "int4" | "int8" | "smallint" | "integer" | "int" | "bigint" | "smallserial"
        | "serial" | "bigserial" => TypeCategory::Integer,
        "float4" | "float8" | "real" | "double precision" => TypeCategory::Float,
        "bool" | "boolean" => TypeCategory::Boolean,
        "bytea" => TypeCategory::Binary,
        _ => TypeCategory::Text,
    }
}

/// Scan every column of a row into slots.
///
/// Fails when the row does not have `expected` columns or any column cannot be
/// decoded; a partially scanned row is never returned.
pub fn scan_row(row: &PgRow, expected: usize) -> QueryResult<Vec<ScanValue>> {
    if row.len() != expected {
        return Err(QueryError::row_scan(format!(
            "expected {} columns, got {}",
            expected,
            row.len()
        )));
    }

    row.columns()
        .iter()
        .enumerate()
        .map(|(idx, col)| {
            let type_name = col.type_info().name();
            scan_column(row, idx, categorize_type(type_name)).map_err(|e| {
                QueryError::row_scan(format!(
                    "column \"{}\" ({}): {}",
                    col.name(),
                    type_name,
                    e
                ))
            })
        })
        .collect()
}

fn scan_column(
    row: &PgRow,
    idx: usize,
    category: TypeCategory,
) -> Result<ScanValue, sqlx::Error> {
    let value = match category {
        TypeCategory::Integer => get(row, idx)?.map(ScanValue::Int),
        TypeCategory::Float => get(row, idx)?.map(ScanValue::Float),
        TypeCategory::Boolean => get(row, idx)?.map(ScanValue::Bool),
        TypeCategory::Binary => get(row, idx)?.map(ScanValue::Bytes),
        TypeCategory::Text => get(row, idx)?.map(ScanValue::Text),
    };
    Ok(value.unwrap_or(ScanValue::Null))
}

/// Decode a column without the driver's declared-type check; the category already
/// picked a Rust type that can read the text format.
fn get<'r, T>(row: &'r PgRow, idx: usize) -> Result<Option<T>, sqlx::Error>
where
    T: Decode<'r, Postgres> + Type<Postgres>,
{
    row.try_get_unchecked::<Option<T>, _>(idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize_type_integer() {
        assert_eq!(categorize_type("INT2"), TypeCategory::Integer);
        assert_eq!(categorize_type("INT4"), TypeCategory::Integer);
        assert_eq!(categorize_type("INT8"), TypeCategory::Integer);
        assert_eq!(categorize_type("bigint"), TypeCategory::Integer);
    }

    #[test]
    fn test_categorize_type_not_fooled_by_substrings() {
        // INTERVAL and POINT contain "int" but are not integers
        assert_eq!(categorize_type("INTERVAL"), TypeCategory::Text);
        assert_eq!(categorize_type("POINT"), TypeCategory::Text);
        assert_eq!(categorize_type("INT4[]"), TypeCategory::Text);
    }

    #[test]
    fn test_categorize_type_float_bool_binary() {
        assert_eq!(categorize_type("FLOAT4"), TypeCategory::Float);
        assert_eq!(categorize_type("FLOAT8"), TypeCategory::Float);
        assert_eq!(categorize_type("BOOL"), TypeCategory::Boolean);
        assert_eq!(categorize_type("BYTEA"), TypeCategory::Binary);
    }

    #[test]
    fn test_categorize_type_text_representations() {
        for name in ["NUMERIC", "TEXT", "VARCHAR", "TIMESTAMPTZ", "DATE", "JSONB", "UUID"] {
            assert_eq!(categorize_type(name), TypeCategory::Text, "{}", name);
        }
    }
}
