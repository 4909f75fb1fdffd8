//! Provider-qualified model identifiers such as
//! `groq/meta-llama/llama-4-scout-17b-16e-instruct`.

use std::fmt;
use std::str::FromStr;

use curie_common::CurieError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    Groq,
    Ollama,
}

impl Provider {
    pub fn default_base_url(self) -> &'static str {
        match self {
            Provider::OpenAi => "https://api.openai.com/v1",
            Provider::Groq => "https://api.groq.com/openai/v1",
            Provider::Ollama => "http://localhost:11434/v1",
        }
    }

    /// Environment variable holding this provider's key, if it needs one.
    pub fn api_key_env(self) -> Option<&'static str> {
        match self {
            Provider::OpenAi => Some("OPENAI_API_KEY"),
            Provider::Groq => Some("GROQ_API_KEY"),
            Provider::Ollama => None,
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "openai" => Some(Provider::OpenAi),
            "groq" => Some(Provider::Groq),
            "ollama" => Some(Provider::Ollama),
            _ => None,
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Groq => "groq",
            Provider::Ollama => "ollama",
        }
    }
}

/// A model name paired with the provider that serves it.
///
/// Identifiers without a known provider prefix are OpenAI models, so
/// `gpt-4o-mini` and `openai/gpt-4o-mini` parse to the same value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelId {
    pub provider: Provider,
    pub model: String,
}

impl FromStr for ModelId {
    type Err = CurieError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(CurieError::Config("Model identifier is empty".into()));
        }

        let parsed = match s.split_once('/') {
            Some((prefix, rest)) => match Provider::from_prefix(prefix) {
                Some(provider) => ModelId {
                    provider,
                    model: rest.to_string(),
                },
                None => ModelId {
                    provider: Provider::OpenAi,
                    model: s.to_string(),
                },
            },
            None => ModelId {
                provider: Provider::OpenAi,
                model: s.to_string(),
            },
        };

        if parsed.model.is_empty() {
            return Err(CurieError::Config(format!(
                "Model identifier '{s}' has no model name"
            )));
        }
        Ok(parsed)
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.provider.prefix(), self.model)
    }
}
