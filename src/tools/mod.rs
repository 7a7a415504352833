//! MCP tool implementation.
//!
//! - `guard`: read-only check applied before execution
//! - `sql_validator`: parser-backed validation used in strict mode
//! - `decoder`: cursor rows to ordered value maps
//! - `format`: result set to indented JSON
//! - `table_data`: the `get_table_data` tool handler

pub mod decoder;
pub mod format;
pub mod guard;
pub mod sql_validator;
pub mod table_data;

pub use decoder::decode_rows;
pub use format::serialize_rows;
pub use guard::{QueryGuard, validate_select};
pub use table_data::{GetTableDataInput, PipelineStage, TableDataToolHandler};
