//! Research agent - an LLM working under role instructions, with optional
//! access to a tool server.

use std::sync::Arc;

use async_trait::async_trait;
use curie_common::{AgentMessage, Result, Task};
use curie_llm::{ChatMessage, LlmClient, LlmRequest, ToolCall, ToolDefinition};
use curie_mcp::ToolProvider;
use tracing::{debug, info, warn};

use crate::traits::{Agent, AgentProfile};

/// An agent that answers a task with its model, calling tools when the
/// model asks for them.
pub struct ResearchAgent {
    profile: AgentProfile,
    llm: Arc<dyn LlmClient>,
    tools: Option<Arc<dyn ToolProvider>>,
}

impl ResearchAgent {
    pub fn new(profile: AgentProfile, llm: Arc<dyn LlmClient>) -> Self {
        Self {
            profile,
            llm,
            tools: None,
        }
    }

    pub fn with_tools(mut self, tools: Arc<dyn ToolProvider>) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn profile(&self) -> &AgentProfile {
        &self.profile
    }

    fn system_prompt(&self, has_tools: bool) -> String {
        let mut prompt = format!(
            "You are the {}.\n\n{}.",
            self.profile.name,
            self.profile.instructions.trim_end_matches('.')
        );
        if has_tools {
            prompt.push_str(
                "\n\nUse the available search tools to find current, citable sources \
                 before answering.",
            );
        }
        prompt
    }

    fn user_prompt(task: &Task) -> String {
        match task.context {
            Some(ref context) => format!(
                "{}\n\nContext from previous agents:\n{}",
                task.description, context
            ),
            None => task.description.clone(),
        }
    }

    fn request(
        &self,
        system: &str,
        messages: &[ChatMessage],
        tools: Vec<ToolDefinition>,
    ) -> LlmRequest {
        LlmRequest {
            system_prompt: Some(system.to_string()),
            messages: messages.to_vec(),
            tools,
            temperature: Some(self.profile.temperature),
            max_tokens: Some(self.profile.max_tokens),
        }
    }

    /// Tool definitions to offer. A tool server that cannot be reached
    /// leaves the agent working from the model alone.
    async fn available_tools(&self) -> Vec<ToolDefinition> {
        let Some(ref provider) = self.tools else {
            return Vec::new();
        };
        match provider.tools().await {
            Ok(tools) => tools,
            Err(e) => {
                warn!(
                    agent = %self.profile.id,
                    error = %e,
                    "Tools unavailable; continuing without them"
                );
                Vec::new()
            }
        }
    }

    /// Run one tool call. Failures become the tool's output so the model
    /// can react to them.
    async fn run_tool(&self, call: &ToolCall) -> String {
        let Some(ref provider) = self.tools else {
            return format!("Error: tool '{}' is not available", call.name);
        };

        let arguments = if call.arguments.trim().is_empty() {
            serde_json::Value::Object(Default::default())
        } else {
            match serde_json::from_str(&call.arguments) {
                Ok(value) => value,
                Err(e) => {
                    return format!("Error: invalid JSON arguments for '{}': {e}", call.name);
                }
            }
        };

        info!(agent = %self.profile.id, tool = %call.name, "Calling tool");
        match provider.call(&call.name, arguments).await {
            Ok(output) => output,
            Err(e) => {
                warn!(
                    agent = %self.profile.id,
                    tool = %call.name,
                    error = %e,
                    "Tool call failed"
                );
                format!("Error: {e}")
            }
        }
    }
}

#[async_trait]
impl Agent for ResearchAgent {
    fn id(&self) -> &str {
        &self.profile.id
    }

    fn name(&self) -> &str {
        &self.profile.name
    }

    fn instructions(&self) -> &str {
        &self.profile.instructions
    }

    async fn process_task(&self, task: &Task) -> Result<AgentMessage> {
        info!(
            agent = %self.id(),
            task_id = %task.id,
            model = %self.llm.model_name(),
            "Processing research task"
        );

        let tools = self.available_tools().await;
        let system = self.system_prompt(!tools.is_empty());
        let mut messages = vec![ChatMessage::user(Self::user_prompt(task))];

        for round in 0..self.profile.max_tool_rounds {
            let response = self
                .llm
                .complete(self.request(&system, &messages, tools.clone()))
                .await?;

            if !response.wants_tools() {
                return Ok(AgentMessage::from_agent(self.id(), response.content));
            }

            debug!(
                agent = %self.id(),
                round = round + 1,
                calls = response.tool_calls.len(),
                "Model requested tools"
            );

            messages.push(ChatMessage::assistant(
                response.content,
                response.tool_calls.clone(),
            ));
            for call in &response.tool_calls {
                let output = self.run_tool(call).await;
                messages.push(ChatMessage::tool_result(call.id.clone(), output));
            }
        }

        // Out of tool rounds: ask for an answer with no tools on offer.
        if self.profile.max_tool_rounds > 0 {
            warn!(
                agent = %self.id(),
                max_tool_rounds = self.profile.max_tool_rounds,
                "Tool round budget exhausted; requesting final answer"
            );
        }
        let response = self
            .llm
            .complete(self.request(&system, &messages, Vec::new()))
            .await?;
        Ok(AgentMessage::from_agent(self.id(), response.content))
    }
}
