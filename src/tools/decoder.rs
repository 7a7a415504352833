//! Row decoding.
//!
//! Walks a cursor and turns every scanned row into a [`Row`] keyed by the result
//! set's column names. Binary payloads become text; every other value keeps the
//! type the driver scanned it as.

use crate::db::{RowCursor, ScanValue};
use crate::error::{QueryError, QueryResult};
use crate::models::{ResultSet, Row, RowValue};

/// Decode every row of `cursor`.
///
/// The cursor is consumed and released on return, whether decoding succeeded or not.
/// A row that fails to scan aborts the whole decode, as does an error the cursor
/// only reports once its stream is exhausted.
pub async fn decode_rows<C: RowCursor>(mut cursor: C) -> QueryResult<ResultSet> {
    let columns = cursor.columns().map_err(|e| match e {
        QueryError::ColumnIntrospection { .. } => e,
        other => QueryError::column_introspection(other.to_string()),
    })?;

    let mut rows = ResultSet::new();
    while let Some(slots) = cursor.next_row().await {
        let slots = slots.map_err(|e| match e {
            QueryError::RowScan { .. } => e,
            other => QueryError::row_scan(other.to_string()),
        })?;
        rows.push(build_row(&columns, slots)?);
    }

    cursor.finish().map_err(|e| match e {
        QueryError::CursorStream { .. } => e,
        other => QueryError::cursor_stream(other.to_string()),
    })?;

    Ok(rows)
}

/// Pair scanned slots with their column names.
pub fn build_row(columns: &[String], slots: Vec<ScanValue>) -> QueryResult<Row> {
    if slots.len() != columns.len() {
        return Err(QueryError::row_scan(format!(
            "expected {} columns, got {}",
            columns.len(),
            slots.len()
        )));
    }

    let mut row = Row::with_capacity(columns.len());
    for (column, slot) in columns.iter().zip(slots) {
        row.insert(column.as_str(), to_row_value(slot));
    }
    Ok(row)
}

/// Normalize a driver value. Bytes are read as UTF-8; invalid sequences are replaced.
pub fn to_row_value(slot: ScanValue) -> RowValue {
    match slot {
        ScanValue::Null => RowValue::Null,
        ScanValue::Bool(v) => RowValue::Bool(v),
        ScanValue::Int(v) => RowValue::Integer(v),
        ScanValue::Float(v) => RowValue::Float(v),
        ScanValue::Text(v) => RowValue::Text(v),
        ScanValue::Bytes(v) => match String::from_utf8(v) {
            Ok(text) => RowValue::Text(text),
            Err(e) => RowValue::Text(String::from_utf8_lossy(e.as_bytes()).into_owned()),
        },
    }
}
