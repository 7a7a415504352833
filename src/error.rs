//! Error types for the table data server.
//!
//! `Connection` and `Transport` are process-level failures raised during startup
//! and serving. Every other variant is a request-level failure: the tool handler
//! turns it into an error result for the caller instead of propagating it. The
//! `Display` output of each variant is exactly the text the caller sees.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueryError {
    /// The `query` argument is absent or not a string.
    #[error("{message}")]
    MissingParameter { name: String, message: String },

    #[error("Only SELECT queries are allowed")]
    NotSelectQuery {
        /// Statement kind detected by strict validation, if any.
        statement: Option<String>,
    },

    /// Executor rejected or failed the query. Message is kept verbatim.
    #[error("{message}")]
    Execution {
        message: String,
        /// e.g., "42P01" for undefined table
        sql_state: Option<String>,
    },

    #[error("Failed to get columns")]
    ColumnIntrospection { message: String },

    #[error("Failed to scan row: {message}")]
    RowScan { message: String },

    #[error("Row error: {message}")]
    CursorStream { message: String },

    #[error("Failed to marshal result to JSON")]
    Serialization { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Connection failed: {message}")]
    Connection { message: String, suggestion: String },

    #[error("Transport error: {message}")]
    Transport { message: String },
}

impl QueryError {
    /// Parameter absent from the request.
    pub fn missing_parameter(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::MissingParameter {
            message: format!("required argument \"{}\" not found", name),
            name,
        }
    }

    /// Parameter present but not a string.
    pub fn parameter_not_string(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::MissingParameter {
            message: format!("argument \"{}\" is not a string", name),
            name,
        }
    }

    pub fn not_select() -> Self {
        Self::NotSelectQuery { statement: None }
    }

    pub fn not_select_statement(statement: impl Into<String>) -> Self {
        Self::NotSelectQuery {
            statement: Some(statement.into()),
        }
    }

    pub fn execution(message: impl Into<String>, sql_state: Option<String>) -> Self {
        Self::Execution {
            message: message.into(),
            sql_state,
        }
    }

    pub fn column_introspection(message: impl Into<String>) -> Self {
        Self::ColumnIntrospection {
            message: message.into(),
        }
    }

    pub fn row_scan(message: impl Into<String>) -> Self {
        Self::RowScan {
            message: message.into(),
        }
    }

    pub fn cursor_stream(message: impl Into<String>) -> Self {
        Self::CursorStream {
            message: message.into(),
        }
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a connection error with a helpful suggestion.
    pub fn connection(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Short machine-friendly name of the failure, used in log events.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingParameter { .. } => "missing_parameter",
            Self::NotSelectQuery { .. } => "not_select_query",
            Self::Execution { .. } => "execution_failure",
            Self::ColumnIntrospection { .. } => "column_introspection_failure",
            Self::RowScan { .. } => "row_scan_failure",
            Self::CursorStream { .. } => "cursor_stream_failure",
            Self::Serialization { .. } => "serialization_failure",
            Self::InvalidInput { .. } => "invalid_input",
            Self::Connection { .. } => "connection_failure",
            Self::Transport { .. } => "transport_failure",
        }
    }

    /// SQLSTATE code reported by the server, if any.
    pub fn sql_state(&self) -> Option<&str> {
        match self {
            Self::Execution { sql_state, .. } => sql_state.as_deref(),
            _ => None,
        }
    }

    /// Get the suggestion for this error, if available.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Connection { suggestion, .. } => Some(suggestion),
            _ => None,
        }
    }
}

/// Convert sqlx errors raised while executing a statement.
///
/// Server-reported errors keep the server's own message; everything else uses
/// the driver's description.
impl From<sqlx::Error> for QueryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().map(|c| c.to_string());
                QueryError::execution(db_err.message(), code)
            }
            sqlx::Error::ColumnDecode { index, source } => {
                QueryError::row_scan(format!("column {}: {}", index, source))
            }
            sqlx::Error::Decode(source) => QueryError::row_scan(source.to_string()),
            sqlx::Error::ColumnIndexOutOfBounds { index, len } => QueryError::row_scan(format!(
                "column index {} out of bounds (len: {})",
                index, len
            )),
            sqlx::Error::ColumnNotFound(col) => {
                QueryError::column_introspection(format!("column not found: {}", col))
            }
            other => QueryError::execution(other.to_string(), None),
        }
    }
}

/// Result type alias for query pipeline operations.
pub type QueryResult<T> = Result<T, QueryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_select_message() {
        assert_eq!(
            QueryError::not_select().to_string(),
            "Only SELECT queries are allowed"
        );
        assert_eq!(
            QueryError::not_select_statement("INSERT").to_string(),
            "Only SELECT queries are allowed"
        );
    }

    #[test]
    fn test_missing_parameter_messages() {
        assert_eq!(
            QueryError::missing_parameter("query").to_string(),
            "required argument \"query\" not found"
        );
        assert_eq!(
            QueryError::parameter_not_string("query").to_string(),
            "argument \"query\" is not a string"
        );
    }

    #[test]
    fn test_execution_message_is_verbatim() {
        let err = QueryError::execution(
            "relation \"nosuchtable\" does not exist",
            Some("42P01".to_string()),
        );
        assert_eq!(err.to_string(), "relation \"nosuchtable\" does not exist");
    }

    #[test]
    fn test_scan_and_stream_messages_keep_cause() {
        assert_eq!(
            QueryError::row_scan("bad utf-8").to_string(),
            "Failed to scan row: bad utf-8"
        );
        assert_eq!(
            QueryError::cursor_stream("connection reset").to_string(),
            "Row error: connection reset"
        );
    }

    #[test]
    fn test_fixed_messages() {
        assert_eq!(
            QueryError::column_introspection("x").to_string(),
            "Failed to get columns"
        );
        assert_eq!(
            QueryError::serialization("NaN").to_string(),
            "Failed to marshal result to JSON"
        );
    }

    #[test]
    fn test_sql_state_only_on_execution_errors() {
        let err = QueryError::execution("division by zero", Some("22012".to_string()));
        assert_eq!(err.sql_state(), Some("22012"));
        assert_eq!(QueryError::execution("timed out", None).sql_state(), None);
        assert_eq!(QueryError::row_scan("bad").sql_state(), None);
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(QueryError::not_select().kind(), "not_select_query");
        assert_eq!(
            QueryError::execution("boom", None).kind(),
            "execution_failure"
        );
        assert_eq!(
            QueryError::connection("down", "retry").suggestion(),
            Some("retry")
        );
    }

    #[test]
    fn test_from_sqlx_non_database_error() {
        let err: QueryError = sqlx::Error::PoolClosed.into();
        assert!(matches!(err, QueryError::Execution { .. }));
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn test_from_sqlx_column_index_is_scan_error() {
        let err: QueryError = sqlx::Error::ColumnIndexOutOfBounds { index: 3, len: 2 }.into();
        assert!(matches!(err, QueryError::RowScan { .. }));
    }
}
