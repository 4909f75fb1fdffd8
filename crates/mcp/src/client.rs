//! MCP client for tool servers spawned as subprocesses.
//!
//! The client spawns the server lazily on first use, keeps the connection
//! for the lifetime of the client, and caches the server's tool list. A
//! server that fails to start is not spawned again until the respawn
//! cooldown has passed.

use std::borrow::Cow;
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use curie_common::{CurieError, Result};
use curie_llm::ToolDefinition;
use rmcp::ServiceExt;
use rmcp::model::{CallToolRequestParam, CallToolResult, Content, RawContent};
use rmcp::service::{Peer, RoleClient};
use rmcp::transport::child_process::TokioChildProcess;
use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::ToolProvider;
use crate::spec::ToolServerSpec;

/// How long a failed start is remembered before the next spawn attempt.
pub const DEFAULT_RESPAWN_COOLDOWN: Duration = Duration::from_secs(60);

struct Connection {
    peer: Peer<RoleClient>,
    /// Task that keeps the MCP service running.
    handle: tokio::task::JoinHandle<()>,
}

/// MCP client for one tool server.
pub struct McpToolClient {
    spec: ToolServerSpec,
    connection: Mutex<Option<Connection>>,
    tools: Mutex<Option<Vec<ToolDefinition>>>,
    last_failure: Mutex<Option<(Instant, String)>>,
    respawn_cooldown: Duration,
}

impl McpToolClient {
    pub fn new(spec: ToolServerSpec) -> Self {
        Self {
            spec,
            connection: Mutex::new(None),
            tools: Mutex::new(None),
            last_failure: Mutex::new(None),
            respawn_cooldown: DEFAULT_RESPAWN_COOLDOWN,
        }
    }

    pub fn with_respawn_cooldown(mut self, cooldown: Duration) -> Self {
        self.respawn_cooldown = cooldown;
        self
    }

    pub fn spec(&self) -> &ToolServerSpec {
        &self.spec
    }

    /// Check if the server process is connected.
    pub async fn is_connected(&self) -> bool {
        self.connection
            .lock()
            .await
            .as_ref()
            .is_some_and(|c| !c.handle.is_finished())
    }

    /// Get the peer, spawning the server if there is no live connection.
    async fn peer(&self) -> Result<Peer<RoleClient>> {
        let mut guard = self.connection.lock().await;
        if let Some(ref conn) = *guard {
            if !conn.handle.is_finished() {
                return Ok(conn.peer.clone());
            }
            warn!(command = %self.spec.command, "MCP server exited; reconnecting");
        }

        let mut last_failure = self.last_failure.lock().await;
        if let Some((at, ref reason)) = *last_failure {
            if at.elapsed() < self.respawn_cooldown {
                return Err(CurieError::Mcp(format!(
                    "Tool server unavailable (last start failed: {reason})"
                )));
            }
        }

        match self.connect().await {
            Ok(conn) => {
                *last_failure = None;
                let peer = conn.peer.clone();
                *guard = Some(conn);
                Ok(peer)
            }
            Err(e) => {
                warn!(
                    command = %self.spec.command,
                    error = %e,
                    cooldown_secs = self.respawn_cooldown.as_secs(),
                    "Tool server failed to start"
                );
                *last_failure = Some((Instant::now(), e.to_string()));
                Err(e)
            }
        }
    }

    async fn connect(&self) -> Result<Connection> {
        let (program, args) = self.spec.program_and_args()?;
        info!(program = %program, args = ?args, "Spawning MCP tool server");

        for key in self.spec.missing_env() {
            warn!(command = %self.spec.command, env = %key, "Tool server env var is empty");
        }

        let mut cmd = Command::new(&program);
        cmd.args(&args)
            .envs(&self.spec.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);

        let transport = TokioChildProcess::new(&mut cmd).map_err(|e| {
            CurieError::Mcp(format!("Failed to spawn tool server '{program}': {e}"))
        })?;

        // The () handler means we don't handle any server->client requests
        let running = ().serve(transport).await.map_err(|e| {
            CurieError::Mcp(format!("Failed to establish MCP connection: {e}"))
        })?;

        let peer = running.peer().clone();
        let handle = tokio::spawn(async move {
            let _ = running.waiting().await;
        });

        info!(program = %program, "Connected to MCP tool server");
        Ok(Connection { peer, handle })
    }

    /// Terminate the server process. A later call reconnects.
    pub async fn shutdown(&self) {
        if let Some(conn) = self.connection.lock().await.take() {
            info!(command = %self.spec.command, "Stopping MCP tool server");
            conn.handle.abort();
        }
        *self.tools.lock().await = None;
        *self.last_failure.lock().await = None;
    }

    /// Convert an rmcp tool into the definition handed to models.
    ///
    /// Goes through JSON so optional fields are read the same way whatever
    /// shape the server reports them in.
    fn to_definition(tool: &rmcp::model::Tool) -> Result<ToolDefinition> {
        let value = serde_json::to_value(tool)?;
        let name = value["name"]
            .as_str()
            .ok_or_else(|| CurieError::Mcp("Tool without a name".into()))?
            .to_string();
        let description = value["description"].as_str().unwrap_or_default().to_string();
        let parameters = match value.get("inputSchema") {
            Some(schema) if schema.is_object() => schema.clone(),
            _ => serde_json::json!({ "type": "object", "properties": {} }),
        };
        Ok(ToolDefinition {
            name,
            description,
            parameters,
        })
    }

    /// Extract text content from an MCP content array.
    fn extract_text(content: &[Content]) -> String {
        content
            .iter()
            .filter_map(|c| match &c.raw {
                RawContent::Text(text) => Some(text.text.clone()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn into_output(name: &str, result: CallToolResult) -> Result<String> {
        let text = Self::extract_text(&result.content);
        if result.is_error.unwrap_or(false) {
            return Err(CurieError::Mcp(format!("Tool '{name}' failed: {text}")));
        }
        Ok(text)
    }
}

#[async_trait]
impl ToolProvider for McpToolClient {
    async fn tools(&self) -> Result<Vec<ToolDefinition>> {
        if let Some(ref cached) = *self.tools.lock().await {
            return Ok(cached.clone());
        }

        let peer = self.peer().await?;
        let listed = peer
            .list_all_tools()
            .await
            .map_err(|e| CurieError::Mcp(format!("Failed to list tools: {e}")))?;
        let definitions = listed
            .iter()
            .map(Self::to_definition)
            .collect::<Result<Vec<_>>>()?;

        debug!(
            tools = ?definitions.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
            "Available MCP tools"
        );

        *self.tools.lock().await = Some(definitions.clone());
        Ok(definitions)
    }

    async fn call(&self, name: &str, arguments: serde_json::Value) -> Result<String> {
        let arguments = match arguments {
            serde_json::Value::Object(map) => Some(map),
            serde_json::Value::Null => None,
            other => {
                return Err(CurieError::Mcp(format!(
                    "Tool arguments must be a JSON object, got {other}"
                )));
            }
        };

        debug!(tool = %name, "Calling MCP tool");
        let peer = self.peer().await?;
        let result = peer
            .call_tool(CallToolRequestParam {
                name: Cow::Owned(name.to_string()),
                arguments,
            })
            .await
            .map_err(|e| CurieError::Mcp(format!("Tool call failed: {e}")))?;

        Self::into_output(name, result)
    }

    async fn shutdown(&self) {
        McpToolClient::shutdown(self).await;
    }
}

impl Drop for McpToolClient {
    fn drop(&mut self) {
        if let Some(conn) = self.connection.get_mut().take() {
            conn.handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::Tool;
    use serde_json::json;
    use std::sync::Arc;

    const MISSING_BINARY: &str = "curie-test-no-such-binary-7f3a";

    fn search_tool(schema: serde_json::Value) -> Tool {
        let schema = match schema {
            serde_json::Value::Object(map) => map,
            _ => panic!("schema must be an object"),
        };
        Tool::new("brave_web_search", "Search the web with Brave", Arc::new(schema))
    }

    #[test]
    fn tool_is_converted_to_definition() {
        let tool = search_tool(json!({
            "type": "object",
            "properties": {"query": {"type": "string"}, "count": {"type": "number"}},
            "required": ["query"]
        }));

        let definition = McpToolClient::to_definition(&tool).unwrap();
        assert_eq!(definition.name, "brave_web_search");
        assert_eq!(definition.description, "Search the web with Brave");
        assert_eq!(definition.parameters["type"], "object");
        assert_eq!(definition.parameters["properties"]["query"]["type"], "string");
        assert_eq!(definition.parameters["required"][0], "query");
    }

    #[test]
    fn text_content_is_joined_by_newlines() {
        let content = vec![
            Content::text("Title: Base editing trial"),
            Content::text("URL: https://example.org/trial"),
        ];
        assert_eq!(
            McpToolClient::extract_text(&content),
            "Title: Base editing trial\nURL: https://example.org/trial"
        );
        assert_eq!(McpToolClient::extract_text(&[]), "");
    }

    #[test]
    fn successful_result_is_its_text() {
        let result = CallToolResult::success(vec![Content::text("3 results")]);
        let output = McpToolClient::into_output("brave_web_search", result).unwrap();
        assert_eq!(output, "3 results");
    }

    #[test]
    fn error_result_is_an_mcp_error() {
        let result = CallToolResult::error(vec![Content::text("quota exceeded")]);
        let err = McpToolClient::into_output("brave_web_search", result).unwrap_err();
        assert!(matches!(err, CurieError::Mcp(_)));
        assert_eq!(
            err.to_string(),
            "MCP error: Tool 'brave_web_search' failed: quota exceeded"
        );
    }

    #[tokio::test]
    async fn shutdown_without_connection_is_a_no_op() {
        let client = McpToolClient::new(ToolServerSpec::brave_search());
        client.shutdown().await;
        ToolProvider::shutdown(&client).await;
        assert!(!client.is_connected().await);
    }

    #[tokio::test]
    async fn failed_start_is_not_retried_during_cooldown() {
        let client = McpToolClient::new(ToolServerSpec::new(MISSING_BINARY));

        let first = client.tools().await.unwrap_err();
        assert!(first.to_string().contains("Failed to spawn"));

        let second = client.tools().await.unwrap_err();
        assert!(matches!(second, CurieError::Mcp(_)));
        assert!(second.to_string().contains("Tool server unavailable"));
        assert!(second.to_string().contains(MISSING_BINARY));
    }

    #[tokio::test]
    async fn failed_start_is_retried_after_cooldown() {
        let client = McpToolClient::new(ToolServerSpec::new(MISSING_BINARY))
            .with_respawn_cooldown(Duration::ZERO);

        client.tools().await.unwrap_err();
        let second = client.tools().await.unwrap_err();
        assert!(second.to_string().contains("Failed to spawn"));
    }

    #[tokio::test]
    async fn shutdown_clears_a_remembered_failure() {
        let client = McpToolClient::new(ToolServerSpec::new(MISSING_BINARY));
        client.tools().await.unwrap_err();

        client.shutdown().await;
        let err = client.tools().await.unwrap_err();
        assert!(err.to_string().contains("Failed to spawn"));
    }

    #[tokio::test]
    async fn new_client_is_not_connected() {
        let client = McpToolClient::new(ToolServerSpec::brave_search());
        assert!(!client.is_connected().await);
        assert_eq!(client.spec().command, crate::BRAVE_SEARCH_COMMAND);
    }

    #[tokio::test]
    async fn spawn_failure_is_an_mcp_error() {
        let client = McpToolClient::new(ToolServerSpec::new(format!("{MISSING_BINARY} --stdio")));
        let err = client.tools().await.unwrap_err();
        assert!(matches!(err, CurieError::Mcp(_)));
        assert!(err.to_string().contains(MISSING_BINARY));
        assert!(!client.is_connected().await);
    }

    #[tokio::test]
    async fn empty_command_is_a_config_error() {
        let client = McpToolClient::new(ToolServerSpec::new(""));
        let err = client.call("brave_web_search", json!({})).await.unwrap_err();
        assert!(matches!(err, CurieError::Config(_)));
    }

    #[tokio::test]
    async fn non_object_arguments_are_rejected_before_spawning() {
        let client = McpToolClient::new(ToolServerSpec::new(MISSING_BINARY));
        let err = client.call("brave_web_search", json!("CRISPR")).await.unwrap_err();
        assert!(err.to_string().contains("JSON object"));
    }
}
