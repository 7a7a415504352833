//! MCP service implementation using rmcp.
//!
//! Registers the single `get_table_data` tool. Domain failures are returned as
//! error tool results, so the tool method itself never produces a protocol error.

use crate::db::PgExecutor;
use crate::tools::{GetTableDataInput, TableDataToolHandler};
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};
use std::sync::Arc;

pub const SERVER_NAME: &str = "pg-table-mcp";

#[derive(Clone)]
pub struct TableDataService {
    handler: Arc<TableDataToolHandler<PgExecutor>>,
    /// Tool router for MCP tool dispatch (auto-generated)
    tool_router: ToolRouter<Self>,
}

impl TableDataService {
    pub fn new(handler: TableDataToolHandler<PgExecutor>) -> Self {
        Self {
            handler: Arc::new(handler),
            tool_router: Self::tool_router(),
        }
    }

    /// Executor shared with the tool handler.
    pub fn executor(&self) -> &Arc<PgExecutor> {
        self.handler.executor()
    }
}

#[tool_router]
impl TableDataService {
    #[tool(description = "Get the table contents from the db")]
    async fn get_table_data(
        &self,
        Parameters(input): Parameters<GetTableDataInput>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self.handler.handle(&input).await)
    }
}

#[tool_handler]
impl ServerHandler for TableDataService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_owned(),
                title: Some("Postgres Table Data".to_owned()),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Read-only access to a PostgreSQL database.\n\
                Call `get_table_data` with a `query` that starts with SELECT; \
                rows come back as a JSON array of objects keyed by column name."
                    .to_string(),
            ),
        }
    }
}
