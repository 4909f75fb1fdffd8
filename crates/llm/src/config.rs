use std::sync::Arc;

use async_trait::async_trait;
use curie_common::{CurieError, Result};
use serde::{Deserialize, Serialize};

use crate::client::{LlmClient, LlmRequest, LlmResponse};
use crate::model::{ModelId, Provider};
use crate::openai::OpenAiClient;
use crate::retry::{RetryConfig, RetryingClient};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider-qualified model identifier, e.g. `groq/llama-3.3-70b-versatile`.
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Overrides the provider's default endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_requests: usize,
    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_max_concurrent() -> usize {
    2
}

impl LlmConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            api_key: None,
            api_url: None,
            max_concurrent_requests: default_max_concurrent(),
            retry: RetryConfig::default(),
        }
    }

    /// Resolve the API key for `provider`.
    ///
    /// Priority:
    /// 1. Explicit, non-empty `api_key` in config
    /// 2. The provider's environment variable, read through `lookup`
    pub fn resolve_api_key<F>(&self, provider: Provider, lookup: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(ref key) = self.api_key {
            if !key.is_empty() {
                return Some(key.clone());
            }
        }
        provider
            .api_key_env()
            .and_then(lookup)
            .filter(|key| !key.trim().is_empty())
    }
}

pub struct SemaphoredClient {
    inner: Arc<dyn LlmClient>,
    semaphore: Arc<tokio::sync::Semaphore>,
}

impl SemaphoredClient {
    pub fn new(inner: Arc<dyn LlmClient>, max_concurrent: usize) -> Self {
        Self {
            inner,
            semaphore: Arc::new(tokio::sync::Semaphore::new(max_concurrent.max(1))),
        }
    }
}

#[async_trait]
impl LlmClient for SemaphoredClient {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|e| CurieError::Llm(format!("Semaphore acquire failed: {e}")))?;
        self.inner.complete(request).await
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}

/// Build the client stack for `config`, reading keys through `lookup`.
///
/// The stack is `OpenAiClient` → `RetryingClient` → `SemaphoredClient`.
pub fn build_llm_client_with<F>(config: &LlmConfig, lookup: F) -> Result<Arc<dyn LlmClient>>
where
    F: Fn(&str) -> Option<String>,
{
    let model: ModelId = config.model.parse()?;
    let api_key = config.resolve_api_key(model.provider, lookup);

    if api_key.is_none() {
        if let Some(env) = model.provider.api_key_env() {
            return Err(CurieError::Config(format!(
                "Model '{model}' requires an API key; set {env} or api_key in config"
            )));
        }
    }

    let base_client: Box<dyn LlmClient> = Box::new(match config.api_url {
        Some(ref url) => OpenAiClient::new(url.clone(), model.model.clone(), api_key),
        None => OpenAiClient::for_provider(model.provider, model.model.clone(), api_key),
    });

    let retrying: Box<dyn LlmClient> =
        Box::new(RetryingClient::new(base_client, config.retry.clone()));

    let semaphored = SemaphoredClient::new(Arc::from(retrying), config.max_concurrent_requests);

    Ok(Arc::new(semaphored))
}
