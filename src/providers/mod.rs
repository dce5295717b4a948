//! AI provider integrations

mod gemini;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::conversation::Turn;
use crate::tools::ToolDefinition;

pub use gemini::GeminiProvider;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("API key not configured (env: {0})")]
    MissingApiKey(&'static str),

    #[error("request timed out")]
    Timeout,

    #[error("request failed: {0}")]
    RequestFailed(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// What the model chose to return: a structured tool call or plain text.
/// Exactly one tool call at most; when the model proposes several, only
/// the first is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelReply {
    ToolCall { name: String, args: Value },
    Text(String),
}

/// One generation call against the external model. Implementations must
/// be substitutable so the engine can be tested without a network.
#[async_trait]
pub trait AiProvider: Send + Sync {
    async fn generate(
        &self,
        system_instruction: &str,
        history: &[Turn],
        tools: &[ToolDefinition],
        user_text: &str,
    ) -> Result<ModelReply, ProviderError>;
}
