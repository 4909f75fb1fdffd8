//! The orchestration entry point: a list of agents and how to run them.

use std::sync::Arc;

use async_trait::async_trait;
use curie_common::{CurieError, Result, Task};
use curie_mcp::ToolProvider;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::traits::Agent;
use crate::workflow::{ConcurrentWorkflow, SequentialWorkflow, Workflow};

/// How a team runs its agents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessMode {
    /// One after another; the last agent's output is the answer.
    #[default]
    Sequential,
    /// All at once on the same query; the answer has one section per agent.
    Parallel,
}

/// Runs a query through agents and returns the combined text.
#[async_trait]
pub trait Orchestrator: Send + Sync {
    async fn start(&self, query: &str) -> Result<String>;

    fn agent_count(&self) -> usize;

    /// Stop any tool servers the agents started.
    async fn shutdown(&self) {}
}

/// A configured list of agents.
pub struct AgentTeam {
    agents: Vec<Arc<dyn Agent>>,
    process: ProcessMode,
    /// Tool servers shared by the agents, stopped on shutdown.
    tool_servers: Vec<Arc<dyn ToolProvider>>,
}

impl AgentTeam {
    pub fn new(agents: Vec<Arc<dyn Agent>>) -> Self {
        Self {
            agents,
            process: ProcessMode::default(),
            tool_servers: Vec::new(),
        }
    }

    pub fn with_process(mut self, process: ProcessMode) -> Self {
        self.process = process;
        self
    }

    pub fn with_tool_servers(mut self, servers: Vec<Arc<dyn ToolProvider>>) -> Self {
        self.tool_servers = servers;
        self
    }

    pub fn tool_server_count(&self) -> usize {
        self.tool_servers.len()
    }

    pub fn agents(&self) -> &[Arc<dyn Agent>] {
        &self.agents
    }

    pub fn process(&self) -> ProcessMode {
        self.process
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    fn workflow(&self) -> Box<dyn Workflow> {
        let agents = self.agents.iter().cloned();
        match self.process {
            ProcessMode::Sequential => {
                Box::new(SequentialWorkflow::new("research").with_agents(agents))
            }
            ProcessMode::Parallel => {
                Box::new(ConcurrentWorkflow::new("research").with_agents(agents))
            }
        }
    }
}

#[async_trait]
impl Orchestrator for AgentTeam {
    async fn start(&self, query: &str) -> Result<String> {
        if self.agents.is_empty() {
            return Err(CurieError::Config("Agent team has no agents".into()));
        }

        let result = self.workflow().run(Task::new(query)).await?;

        if let Some(failed) = result.first_failure() {
            return Err(CurieError::Agent(failed.output.content.clone()));
        }

        info!(
            process = ?self.process,
            agents = self.agents.len(),
            duration_ms = result.duration_ms,
            "Research run finished"
        );
        Ok(result.final_output.content)
    }

    fn agent_count(&self) -> usize {
        self.agents.len()
    }

    async fn shutdown(&self) {
        for server in &self.tool_servers {
            server.shutdown().await;
        }
        info!(tool_servers = self.tool_servers.len(), "Agent team shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curie_common::AgentMessage;
    use curie_llm::ToolDefinition;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct EchoAgent {
        id: &'static str,
        fail: bool,
    }

    #[async_trait]
    impl Agent for EchoAgent {
        fn id(&self) -> &str {
            self.id
        }
        fn name(&self) -> &str {
            self.id
        }
        fn instructions(&self) -> &str {
            "Echo"
        }
        async fn process_task(&self, task: &Task) -> Result<AgentMessage> {
            if self.fail {
                return Err(CurieError::Llm("provider unreachable".into()));
            }
            let seen = task.context.as_deref().unwrap_or("none");
            Ok(AgentMessage::from_agent(
                self.id,
                format!("{} saw [{}]", self.id, seen),
            ))
        }
    }

    fn agent(id: &'static str) -> Arc<dyn Agent> {
        Arc::new(EchoAgent { id, fail: false })
    }

    #[derive(Default)]
    struct CountingTools {
        shutdowns: AtomicUsize,
    }

    #[async_trait]
    impl ToolProvider for CountingTools {
        async fn tools(&self) -> Result<Vec<ToolDefinition>> {
            Ok(Vec::new())
        }
        async fn call(&self, _name: &str, _arguments: serde_json::Value) -> Result<String> {
            Ok(String::new())
        }
        async fn shutdown(&self) {
            self.shutdowns.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn empty_team_is_an_error() {
        let team = AgentTeam::new(Vec::new());
        assert!(team.is_empty());
        let err = team.start("query").await.unwrap_err();
        assert!(matches!(err, CurieError::Config(_)));
    }

    #[tokio::test]
    async fn sequential_returns_last_output() {
        let team = AgentTeam::new(vec![agent("first"), agent("second")]);
        assert_eq!(team.process(), ProcessMode::Sequential);

        let output = team.start("query").await.unwrap();
        assert!(output.starts_with("second saw"));
        assert!(output.contains("first saw [none]"));
    }

    #[tokio::test]
    async fn parallel_returns_every_section() {
        let team = AgentTeam::new(vec![agent("first"), agent("second")])
            .with_process(ProcessMode::Parallel);

        let output = team.start("query").await.unwrap();
        assert!(output.contains("--- first ---\nfirst saw [none]"));
        assert!(output.contains("--- second ---\nsecond saw [none]"));
    }

    #[tokio::test]
    async fn failed_step_names_the_agent() {
        let team = AgentTeam::new(vec![
            agent("first"),
            Arc::new(EchoAgent {
                id: "broken",
                fail: true,
            }),
        ]);
        let err = team.start("query").await.unwrap_err();
        assert!(matches!(err, CurieError::Agent(_)));
        assert_eq!(
            err.to_string(),
            "Agent error: broken failed: LLM error: provider unreachable"
        );
    }

    #[tokio::test]
    async fn shutdown_stops_every_tool_server() {
        let search = Arc::new(CountingTools::default());
        let fetch = Arc::new(CountingTools::default());
        let team = AgentTeam::new(vec![agent("first")])
            .with_tool_servers(vec![search.clone(), fetch.clone()]);
        assert_eq!(team.tool_server_count(), 2);

        team.shutdown().await;
        assert_eq!(search.shutdowns.load(Ordering::SeqCst), 1);
        assert_eq!(fetch.shutdowns.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn process_mode_parses_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            process: ProcessMode,
        }
        let w: Wrapper = toml::from_str("process = \"parallel\"").unwrap();
        assert_eq!(w.process, ProcessMode::Parallel);
    }
}
