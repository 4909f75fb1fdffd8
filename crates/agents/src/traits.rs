//! Core agent trait and the configuration record agents are built from.

use async_trait::async_trait;
use curie_common::{AgentMessage, Result, Task};
use curie_mcp::ToolServerSpec;
use serde::{Deserialize, Serialize};

/// The trait every agent in a team implements.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Get the agent's unique identifier.
    fn id(&self) -> &str;

    /// Get the agent's human-readable name.
    fn name(&self) -> &str;

    /// Get the role instructions the agent works under.
    fn instructions(&self) -> &str;

    /// Process a task assigned to this agent.
    async fn process_task(&self, task: &Task) -> Result<AgentMessage>;

    /// Check if the agent can take work.
    fn is_available(&self) -> bool {
        true
    }
}

/// Configuration for one agent: role instructions, the model that runs
/// them, and the tool server it may call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentProfile {
    /// Agent ID
    pub id: String,

    /// Human-readable name
    pub name: String,

    /// Role instructions, used as the system prompt
    pub instructions: String,

    /// Provider-qualified model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Tool server this agent may call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<ToolServerSpec>,

    /// Temperature for LLM responses
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Max tokens for responses
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Upper bound on model turns that request tools
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: usize,
}

pub const DEFAULT_MODEL: &str = "groq/meta-llama/llama-4-scout-17b-16e-instruct";

fn default_model() -> String {
    DEFAULT_MODEL.into()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_max_tool_rounds() -> usize {
    5
}

impl AgentProfile {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        instructions: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            instructions: instructions.into(),
            model: default_model(),
            tool: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            max_tool_rounds: default_max_tool_rounds(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_tool(mut self, tool: ToolServerSpec) -> Self {
        self.tool = Some(tool);
        self
    }
}
