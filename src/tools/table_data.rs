//! The `get_table_data` tool.
//!
//! Each call runs the same pipeline: extract the query, guard it, execute it,
//! decode the cursor, serialize the rows. Any failure ends the call with an
//! error result carrying the failure's message; nothing escapes the handler.

use crate::db::QueryExecutor;
use crate::error::{QueryError, QueryResult};
use crate::tools::decoder::decode_rows;
use crate::tools::format::serialize_rows;
use crate::tools::guard::QueryGuard;
use rmcp::model::{CallToolResult, Content};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Name of the only tool argument.
pub const QUERY_PARAM: &str = "query";

/// Input for the get_table_data tool.
///
/// The argument is kept as raw JSON so that an absent or non-string value is
/// reported to the caller as a tool error rather than rejected by the protocol layer.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct GetTableDataInput {
    /// Postgres SQL query to select data
    #[schemars(with = "String")]
    pub query: Option<JsonValue>,
}

impl GetTableDataInput {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: Some(JsonValue::String(query.into())),
        }
    }

    /// The query string, or a parameter error if it is missing or not a string.
    pub fn require_query(&self) -> QueryResult<&str> {
        match &self.query {
            None | Some(JsonValue::Null) => Err(QueryError::missing_parameter(QUERY_PARAM)),
            Some(JsonValue::String(query)) => Ok(query),
            Some(_) => Err(QueryError::parameter_not_string(QUERY_PARAM)),
        }
    }
}

/// Where a call was in the pipeline when it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Received,
    Validated,
    Executed,
    Decoded,
    Serialized,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Received => "received",
            Self::Validated => "validated",
            Self::Executed => "executed",
            Self::Decoded => "decoded",
            Self::Serialized => "serialized",
        };
        f.write_str(name)
    }
}

/// Successful pipeline output.
#[derive(Debug, Clone)]
pub struct TableData {
    pub text: String,
    pub row_count: usize,
}

/// Handler for the get_table_data tool.
pub struct TableDataToolHandler<E> {
    executor: Arc<E>,
    guard: QueryGuard,
}

impl<E> Clone for TableDataToolHandler<E> {
    fn clone(&self) -> Self {
        Self {
            executor: self.executor.clone(),
            guard: self.guard,
        }
    }
}

impl<E: QueryExecutor> TableDataToolHandler<E> {
    /// Create a handler using the default prefix guard.
    pub fn new(executor: Arc<E>) -> Self {
        Self::with_guard(executor, QueryGuard::new())
    }

    pub fn with_guard(executor: Arc<E>, guard: QueryGuard) -> Self {
        Self { executor, guard }
    }

    pub fn executor(&self) -> &Arc<E> {
        &self.executor
    }

    /// Run the pipeline and return the serialized rows.
    pub async fn get_table_data(&self, input: &GetTableDataInput) -> QueryResult<String> {
        let mut stage = PipelineStage::Received;
        self.run(input, &mut stage).await.map(|data| data.text)
    }

    /// Run the pipeline and wrap the outcome as a tool result.
    ///
    /// Never fails: domain errors become error results.
    pub async fn handle(&self, input: &GetTableDataInput) -> CallToolResult {
        let start = Instant::now();
        let mut stage = PipelineStage::Received;

        match self.run(input, &mut stage).await {
            Ok(data) => {
                info!(
                    rows = data.row_count,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "get_table_data completed"
                );
                CallToolResult::success(vec![Content::text(data.text)])
            }
            Err(e) => {
                warn!(
                    kind = e.kind(),
                    stage = %stage,
                    sql_state = e.sql_state(),
                    error = %e,
                    "get_table_data failed"
                );
                CallToolResult::error(vec![Content::text(e.to_string())])
            }
        }
    }

    /// `stage` is the last stage reached; it is left pointing at the failing stage.
    async fn run(
        &self,
        input: &GetTableDataInput,
        stage: &mut PipelineStage,
    ) -> QueryResult<TableData> {
        let query = input.require_query()?;

        *stage = PipelineStage::Validated;
        let query = self.guard.validate(query)?;

        *stage = PipelineStage::Executed;
        debug!(sql = %query, strict = self.guard.is_strict(), "Running query");
        let cursor = self.executor.query(query).await?;

        *stage = PipelineStage::Decoded;
        let rows = decode_rows(cursor).await?;

        *stage = PipelineStage::Serialized;
        let text = serialize_rows(&rows)?;

        Ok(TableData {
            text,
            row_count: rows.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn input_from(value: JsonValue) -> GetTableDataInput {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_require_query_string() {
        let input = GetTableDataInput::new("SELECT 1");
        assert_eq!(input.require_query().unwrap(), "SELECT 1");
    }

    #[test]
    fn test_missing_query_argument() {
        let input = input_from(json!({}));
        let err = input.require_query().unwrap_err();
        assert!(matches!(err, QueryError::MissingParameter { .. }));
        assert_eq!(err.to_string(), "required argument \"query\" not found");

        let input = input_from(json!({ "query": null }));
        assert!(matches!(
            input.require_query(),
            Err(QueryError::MissingParameter { .. })
        ));
    }

    #[test]
    fn test_non_string_query_argument() {
        for value in [json!(42), json!(true), json!(["select 1"]), json!({"q": 1})] {
            let input = input_from(json!({ "query": value }));
            let err = input.require_query().unwrap_err();
            assert_eq!(err.to_string(), "argument \"query\" is not a string");
        }
    }

    #[test]
    fn test_empty_string_is_still_a_string() {
        let input = input_from(json!({ "query": "" }));
        assert_eq!(input.require_query().unwrap(), "");
    }

    #[test]
    fn test_schema_declares_required_string() {
        let schema = serde_json::to_value(schemars::schema_for!(GetTableDataInput)).unwrap();
        assert_eq!(schema["properties"]["query"]["type"], "string");
        assert_eq!(
            schema["properties"]["query"]["description"],
            "Postgres SQL query to select data"
        );
        assert_eq!(schema["required"], json!(["query"]));
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(PipelineStage::Received.to_string(), "received");
        assert_eq!(PipelineStage::Serialized.to_string(), "serialized");
    }
}
