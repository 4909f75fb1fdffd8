//! Server configuration file.

use std::path::Path;

use curie_agents::{AgentProfile, LlmSettings, ProcessMode, TeamConfig, presets};
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 7860;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    /// Per-report time limit; unset means no limit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_timeout_secs: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            port: DEFAULT_PORT,
            report_timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamSection {
    pub process: ProcessMode,
}

/// Top-level configuration.
///
/// ```toml
/// [server]
/// port = 7860
///
/// [team]
/// process = "sequential"
///
/// [llm]
/// max_concurrent_requests = 2
///
/// [[agents]]
/// id = "literature"
/// name = "Literature Research Agent"
/// instructions = "..."
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub team: TeamSection,
    pub llm: LlmSettings,
    pub agents: Vec<AgentProfile>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            team: TeamSection::default(),
            llm: LlmSettings::default(),
            agents: presets::default_profiles(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// On Unix the file must be a regular file that is not world-writable.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();

        #[cfg(unix)]
        validate_config_file_permissions(path)?;

        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e))?;
        let config = Self::from_toml(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config file '{}': {}", path.display(), e))?;

        if contains_api_key(&content) {
            warn!(
                "API key found in config file '{}'. For better security, \
                 use environment variables instead (OPENAI_API_KEY, GROQ_API_KEY, BRAVE_API_KEY).",
                path.display()
            );
        }

        Ok(config)
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn team_config(&self) -> TeamConfig {
        TeamConfig {
            process: self.team.process,
            llm: self.llm.clone(),
            agents: self.agents.clone(),
        }
    }
}

/// True when the file holds a literal key rather than a `$VAR` placeholder.
fn contains_api_key(content: &str) -> bool {
    fn walk(value: &toml::Value) -> bool {
        match value {
            toml::Value::Table(table) => table.iter().any(|(key, value)| match value {
                toml::Value::String(s) if key == "api_key" || key.ends_with("_API_KEY") => {
                    !s.is_empty() && !s.starts_with('$')
                }
                other => walk(other),
            }),
            toml::Value::Array(items) => items.iter().any(walk),
            _ => false,
        }
    }

    content
        .parse::<toml::Table>()
        .is_ok_and(|table| walk(&toml::Value::Table(table)))
}

/// Reject config files that other users could modify.
#[cfg(unix)]
fn validate_config_file_permissions(path: &Path) -> anyhow::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = std::fs::symlink_metadata(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e))?;

    if !metadata.is_file() {
        anyhow::bail!(
            "Config path '{}' is not a regular file. Symlinks and directories are not allowed.",
            path.display()
        );
    }

    let permission_bits = metadata.permissions().mode() & 0o777;

    if permission_bits & 0o002 != 0 {
        anyhow::bail!(
            "Config file '{}' is world-writable (mode {:04o}). Fix with: chmod o-w {}",
            path.display(),
            permission_bits,
            path.display()
        );
    }

    Ok(())
}
