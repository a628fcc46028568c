//! MCP (Model Context Protocol) transport
//!
//! Uses the official rmcp SDK to run tool servers as child processes.
//!
//! # Example
//!
//! ```rust,ignore
//! use contextloader_core::mcp::McpConnector;
//! use contextloader_core::providers::SessionManager;
//!
//! let connector = Arc::new(McpConnector::new(logger.clone()));
//! let manager = SessionManager::new(connector, registry, logger);
//! let report = manager.start_all(config.enabled_servers().await).await;
//! ```

mod client;

pub use client::{call_outcome, tool_definition, McpConnector, McpSession};
