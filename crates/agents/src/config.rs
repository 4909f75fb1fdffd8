//! Building an `AgentTeam` from configuration.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use curie_common::{CurieError, Result};
use curie_llm::{LlmConfig, RetryConfig, build_llm_client_with};
use curie_mcp::{McpToolClient, ToolProvider, ToolServerSpec};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::presets;
use crate::research::ResearchAgent;
use crate::team::{AgentTeam, ProcessMode};
use crate::traits::{Agent, AgentProfile};

/// Client settings shared by every agent's LLM stack.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// In-flight request cap per agent.
    pub max_concurrent_requests: usize,
    pub retry: RetryConfig,
    /// Replaces the provider endpoint for every agent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            max_concurrent_requests: 2,
            retry: RetryConfig::default(),
            api_url: None,
        }
    }
}

impl LlmSettings {
    fn for_model(&self, model: &str) -> LlmConfig {
        LlmConfig {
            api_url: self.api_url.clone(),
            max_concurrent_requests: self.max_concurrent_requests,
            retry: self.retry.clone(),
            ..LlmConfig::new(model)
        }
    }
}

/// Everything needed to assemble a team.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamConfig {
    #[serde(default)]
    pub process: ProcessMode,
    #[serde(default)]
    pub llm: LlmSettings,
    #[serde(default = "presets::default_profiles")]
    pub agents: Vec<AgentProfile>,
}

impl Default for TeamConfig {
    fn default() -> Self {
        Self {
            process: ProcessMode::default(),
            llm: LlmSettings::default(),
            agents: presets::default_profiles(),
        }
    }
}

impl TeamConfig {
    /// Reject configurations no team can be built from.
    pub fn validate(&self) -> Result<()> {
        if self.agents.is_empty() {
            return Err(CurieError::Config("No agents configured".into()));
        }
        let mut seen = HashSet::new();
        for profile in &self.agents {
            if profile.id.trim().is_empty() {
                return Err(CurieError::Config("Agent id must not be empty".into()));
            }
            if !seen.insert(profile.id.as_str()) {
                return Err(CurieError::Config(format!(
                    "Duplicate agent id '{}'",
                    profile.id
                )));
            }
        }
        Ok(())
    }
}

/// One MCP client per distinct tool server, shared by the agents that use it.
#[derive(Default)]
struct ToolClients {
    clients: HashMap<ToolServerSpec, Arc<McpToolClient>>,
}

impl ToolClients {
    fn get_or_create(&mut self, spec: ToolServerSpec) -> Arc<McpToolClient> {
        self.clients
            .entry(spec)
            .or_insert_with_key(|spec| Arc::new(McpToolClient::new(spec.clone())))
            .clone()
    }

    fn len(&self) -> usize {
        self.clients.len()
    }

    fn into_providers(self) -> Vec<Arc<dyn ToolProvider>> {
        self.clients
            .into_values()
            .map(|client| client as Arc<dyn ToolProvider>)
            .collect()
    }
}

/// Build a team, reading API keys from the process environment.
pub fn build_team(config: &TeamConfig) -> Result<AgentTeam> {
    build_team_with(config, |name| std::env::var(name).ok())
}

/// Build a team, reading API keys through `lookup`.
///
/// Tool servers are not spawned here; each connects on first use.
pub fn build_team_with<F>(config: &TeamConfig, lookup: F) -> Result<AgentTeam>
where
    F: Fn(&str) -> Option<String>,
{
    config.validate()?;

    let mut tool_clients = ToolClients::default();
    let mut agents: Vec<Arc<dyn Agent>> = Vec::with_capacity(config.agents.len());

    for profile in &config.agents {
        let llm = build_llm_client_with(&config.llm.for_model(&profile.model), &lookup)
            .map_err(|e| CurieError::Config(format!("Agent '{}': {e}", profile.id)))?;

        let mut agent = ResearchAgent::new(profile.clone(), llm);
        if let Some(ref spec) = profile.tool {
            let client = tool_clients.get_or_create(spec.resolve_env(&lookup));
            agent = agent.with_tools(client);
        }

        debug!(
            agent = %profile.id,
            model = %profile.model,
            tool = profile.tool.as_ref().map(|t| t.command.as_str()),
            "Configured agent"
        );
        agents.push(Arc::new(agent));
    }

    info!(
        agents = agents.len(),
        tool_servers = tool_clients.len(),
        process = ?config.process,
        "Agent team ready"
    );

    Ok(AgentTeam::new(agents)
        .with_process(config.process)
        .with_tool_servers(tool_clients.into_providers()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::team::Orchestrator;

    fn keys(name: &str) -> Option<String> {
        match name {
            "GROQ_API_KEY" => Some("gsk-test".into()),
            "BRAVE_API_KEY" => Some("bsa-test".into()),
            _ => None,
        }
    }

    #[test]
    fn default_config_builds_the_four_presets() {
        let team = build_team_with(&TeamConfig::default(), keys).unwrap();
        assert_eq!(team.agent_count(), 4);
        assert_eq!(team.tool_server_count(), 1);
        let names: Vec<_> = team.agents().iter().map(|a| a.name().to_string()).collect();
        assert_eq!(
            names,
            vec![
                "Literature Research Agent",
                "Methodology Agent",
                "Data Analysis Agent",
                "Summary & Implications Agent"
            ]
        );
    }

    #[test]
    fn missing_provider_key_names_the_agent() {
        let err = build_team_with(&TeamConfig::default(), |_| None)
            .err()
            .unwrap();
        let message = err.to_string();
        assert!(message.contains("literature"));
        assert!(message.contains("GROQ_API_KEY"));
    }

    #[test]
    fn empty_and_duplicate_agent_lists_are_rejected() {
        let empty = TeamConfig {
            agents: Vec::new(),
            ..TeamConfig::default()
        };
        assert!(build_team_with(&empty, keys).is_err());

        let duplicate = TeamConfig {
            agents: vec![presets::summary(), presets::summary()],
            ..TeamConfig::default()
        };
        let err = duplicate.validate().unwrap_err();
        assert!(err.to_string().contains("Duplicate agent id 'summary'"));
    }

    #[test]
    fn identical_tool_servers_share_one_client() {
        let mut clients = ToolClients::default();
        let a = clients.get_or_create(ToolServerSpec::brave_search().resolve_env(keys));
        let b = clients.get_or_create(ToolServerSpec::brave_search().resolve_env(keys));
        let other = clients.get_or_create(ToolServerSpec::new("uvx mcp-server-fetch"));

        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &other));
        assert_eq!(clients.len(), 2);
        assert_eq!(a.spec().env["BRAVE_API_KEY"], "bsa-test");
    }

    #[test]
    fn ollama_agents_need_no_key() {
        let config = TeamConfig {
            agents: vec![presets::summary().with_model("ollama/llama3.2")],
            ..TeamConfig::default()
        };
        let team = build_team_with(&config, |_| None).unwrap();
        assert_eq!(team.len(), 1);
    }

    #[test]
    fn team_config_from_toml() {
        let config: TeamConfig = toml::from_str(
            r#"
process = "parallel"

[llm]
max_concurrent_requests = 8

[llm.retry]
max_retries = 1

[[agents]]
id = "ethics"
name = "Ethics Agent"
instructions = "Assess ethical considerations"
model = "openai/gpt-4o-mini"
"#,
        )
        .unwrap();
        assert_eq!(config.process, ProcessMode::Parallel);
        assert_eq!(config.llm.max_concurrent_requests, 8);
        assert_eq!(config.llm.retry.max_retries, 1);
        assert_eq!(config.llm.retry.initial_delay_ms, 500);
        assert_eq!(config.agents.len(), 1);
        assert_eq!(config.agents[0].id, "ethics");
    }

    #[test]
    fn omitted_agents_default_to_presets() {
        let config: TeamConfig = toml::from_str("process = \"sequential\"").unwrap();
        assert_eq!(config.agents, presets::default_profiles());
    }
}
