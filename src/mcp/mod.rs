//! MCP server integration module.
//!
//! Connects the rmcp framework to the table data tool handler.

pub mod service;

pub use service::TableDataService;
