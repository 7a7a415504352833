//! PostgreSQL table data MCP server - main entry point.
//!
//! Serves the `get_table_data` tool over stdio.

use pg_table_mcp::config::Config;
use pg_table_mcp::db;
use pg_table_mcp::mcp::TableDataService;
use pg_table_mcp::tools::{QueryGuard, TableDataToolHandler};
use pg_table_mcp::transport::{StdioTransport, Transport};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
///
/// Output goes to stderr; stdout carries the protocol.
fn init_tracing(config: &Config) {
    if !config.enable_logs {
        return;
    }

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(false)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse_args();

    init_tracing(&config);

    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(2);
    }

    info!(
        strict_sql = config.strict_sql,
        "Starting pg-table-mcp v{}",
        env!("CARGO_PKG_VERSION")
    );

    let executor = match db::connect(&config).await {
        Ok(executor) => Arc::new(executor),
        Err(e) => {
            error!(error = %e, "Database connection failed");
            eprintln!("Error: {}", e);
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Hint: {}", suggestion);
            }
            std::process::exit(1);
        }
    };

    let guard = if config.strict_sql {
        QueryGuard::strict()
    } else {
        QueryGuard::new()
    };
    let service = TableDataService::new(TableDataToolHandler::with_guard(executor, guard));

    let transport = StdioTransport::new(service);
    info!(transport = transport.name(), "Serving");

    if let Err(e) = transport.run().await {
        error!(error = %e, "Server error");
        return Err(e.into());
    }

    info!("Server shutdown complete");
    Ok(())
}
