//! Tool server descriptors.

use std::collections::BTreeMap;

use curie_common::{CurieError, Result};
use serde::{Deserialize, Serialize};

/// Command that launches the Brave web search MCP server.
pub const BRAVE_SEARCH_COMMAND: &str = "npx -y @modelcontextprotocol/server-brave-search";

/// How to launch a tool server: a shell-style command line plus extra
/// environment variables for the child.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToolServerSpec {
    pub command: String,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl ToolServerSpec {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            env: BTreeMap::new(),
        }
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// The Brave search server, taking its key from `$BRAVE_API_KEY`.
    pub fn brave_search() -> Self {
        Self::new(BRAVE_SEARCH_COMMAND).with_env("BRAVE_API_KEY", "$BRAVE_API_KEY")
    }

    /// Replace env values of the form `$NAME` with `lookup(NAME)`.
    ///
    /// Unset variables become empty strings; the server reports the problem
    /// on first use.
    pub fn resolve_env<F>(&self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = self
            .env
            .iter()
            .map(|(key, value)| {
                let resolved = match value.strip_prefix('$') {
                    Some(name) if !name.is_empty() => lookup(name).unwrap_or_default(),
                    _ => value.clone(),
                };
                (key.clone(), resolved)
            })
            .collect();
        Self {
            command: self.command.clone(),
            env,
        }
    }

    /// Split `command` with POSIX shell word rules.
    pub fn program_and_args(&self) -> Result<(String, Vec<String>)> {
        let mut words = shlex::split(&self.command).ok_or_else(|| {
            CurieError::Config(format!("Unbalanced quotes in command '{}'", self.command))
        })?;
        if words.is_empty() {
            return Err(CurieError::Config("Tool server command is empty".into()));
        }
        let program = words.remove(0);
        Ok((program, words))
    }

    /// Env keys whose value is empty.
    pub fn missing_env(&self) -> Vec<&str> {
        self.env
            .iter()
            .filter(|(_, v)| v.trim().is_empty())
            .map(|(k, _)| k.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brave_command_splits_into_npx_call() {
        let spec = ToolServerSpec::brave_search();
        let (program, args) = spec.program_and_args().unwrap();
        assert_eq!(program, "npx");
        assert_eq!(args, vec!["-y", "@modelcontextprotocol/server-brave-search"]);
    }

    #[test]
    fn env_placeholders_resolve_through_lookup() {
        let spec = ToolServerSpec::brave_search()
            .with_env("LOG_LEVEL", "debug")
            .resolve_env(|name| (name == "BRAVE_API_KEY").then(|| "bsa-key".to_string()));
        assert_eq!(spec.env["BRAVE_API_KEY"], "bsa-key");
        assert_eq!(spec.env["LOG_LEVEL"], "debug");
        assert!(spec.missing_env().is_empty());
    }

    #[test]
    fn unset_placeholder_is_reported_missing() {
        let spec = ToolServerSpec::brave_search().resolve_env(|_| None);
        assert_eq!(spec.missing_env(), vec!["BRAVE_API_KEY"]);
    }

    #[test]
    fn quoted_arguments_stay_together() {
        let spec = ToolServerSpec::new(r#"uvx mcp-search --label "web search""#);
        let (_, args) = spec.program_and_args().unwrap();
        assert_eq!(args, vec!["mcp-search", "--label", "web search"]);
    }

    #[test]
    fn empty_and_unbalanced_commands_are_rejected() {
        assert!(ToolServerSpec::new("   ").program_and_args().is_err());
        assert!(ToolServerSpec::new("npx \"open").program_and_args().is_err());
    }

    #[test]
    fn deserializes_from_toml() {
        let spec: ToolServerSpec = toml::from_str(
            r#"
command = "npx -y @modelcontextprotocol/server-brave-search"
env = { BRAVE_API_KEY = "$BRAVE_API_KEY" }
"#,
        )
        .unwrap();
        assert_eq!(spec, ToolServerSpec::brave_search());
    }
}
