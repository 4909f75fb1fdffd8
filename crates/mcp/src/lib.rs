//! Tool servers reached over the Model Context Protocol.
//!
//! A tool server is described by a shell command and an environment map
//! (`ToolServerSpec`). `McpToolClient` spawns it as a child process, speaks
//! MCP over its stdio and exposes the server's tools through the
//! `ToolProvider` trait that agents consume.
//!
//! ```text
//! ResearchAgent ──► ToolProvider ──► McpToolClient
//!                                        │ stdio (JSON-RPC)
//!                                        ▼
//!                         npx -y @modelcontextprotocol/server-brave-search
//! ```

pub mod client;
pub mod spec;

use async_trait::async_trait;
use curie_common::Result;
use curie_llm::ToolDefinition;

pub use client::McpToolClient;
pub use spec::{BRAVE_SEARCH_COMMAND, ToolServerSpec};

/// A source of tools an agent can offer to its model.
#[async_trait]
pub trait ToolProvider: Send + Sync {
    /// Describe the available tools.
    async fn tools(&self) -> Result<Vec<ToolDefinition>>;

    /// Run tool `name` with a JSON object of arguments and return its text
    /// output.
    async fn call(&self, name: &str, arguments: serde_json::Value) -> Result<String>;

    /// Release whatever the provider holds open.
    async fn shutdown(&self) {}
}
