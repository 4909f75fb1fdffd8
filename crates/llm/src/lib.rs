pub mod client;
pub mod config;
pub mod model;
pub mod openai;
pub mod retry;

pub use client::{
    ChatMessage, LlmClient, LlmRequest, LlmResponse, Role, TokenUsage, ToolCall, ToolDefinition,
};
pub use config::{LlmConfig, SemaphoredClient, build_llm_client_with};
pub use model::{ModelId, Provider};
pub use openai::OpenAiClient;
pub use retry::{RetryConfig, RetryingClient};
