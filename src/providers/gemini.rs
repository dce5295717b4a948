//! Gemini provider implementation
//!
//! Calls `models/{model}:generateContent` once per chat turn with the
//! system instruction, the windowed history, and the declared function
//! schemas. The response is either a `functionCall` part or text; both
//! shapes must be handled on every call.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::Config;
use crate::conversation::{Role, Turn};
use crate::tools::ToolDefinition;

use super::{AiProvider, ModelReply, ProviderError};

pub struct GeminiProvider {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<TextPart>,
}

#[derive(Debug, Serialize)]
struct TextPart {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(rename = "functionCall", default)]
    function_call: Option<FunctionCall>,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    args: Value,
}

impl GeminiProvider {
    pub fn new(base_url: String, api_key: String, model: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url,
            api_key,
            model,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, ProviderError> {
        let api_key = config
            .gemini_api_key
            .clone()
            .ok_or(ProviderError::MissingApiKey("GEMINI_API_KEY"))?;

        Ok(Self::new(
            config.gemini_base_url.clone(),
            api_key,
            config.gemini_model.clone(),
            Duration::from_secs(config.gemini_timeout_secs),
        ))
    }

    fn request_body(
        system_instruction: &str,
        history: &[Turn],
        tools: &[ToolDefinition],
        user_text: &str,
    ) -> Value {
        let mut contents: Vec<Content> = history
            .iter()
            .map(|t| Content {
                role: match t.role {
                    Role::User => "user".to_string(),
                    Role::Model => "model".to_string(),
                },
                parts: vec![TextPart {
                    text: t.text.clone(),
                }],
            })
            .collect();

        contents.push(Content {
            role: "user".to_string(),
            parts: vec![TextPart {
                text: user_text.to_string(),
            }],
        });

        let declarations: Vec<Value> = tools
            .iter()
            .map(|t| {
                json!({
                    "name": t.name,
                    "description": t.description,
                    "parameters": t.parameters,
                })
            })
            .collect();

        json!({
            "system_instruction": { "parts": [{ "text": system_instruction }] },
            "contents": contents,
            "tools": [{ "function_declarations": declarations }],
        })
    }
}

/// Pick the reply out of a parsed response: the first `functionCall` part
/// wins; any later proposals in the same response are ignored. With no
/// function call, the text parts are joined verbatim.
fn extract_reply(response: GenerateContentResponse) -> Result<ModelReply, ProviderError> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::InvalidResponse("no candidates in response".to_string()))?;

    for part in &candidate.content.parts {
        if let Some(call) = &part.function_call {
            return Ok(ModelReply::ToolCall {
                name: call.name.clone(),
                args: call.args.clone(),
            });
        }
    }

    let text: String = candidate
        .content
        .parts
        .into_iter()
        .filter_map(|p| p.text)
        .collect::<Vec<_>>()
        .join("");

    if text.is_empty() {
        return Err(ProviderError::InvalidResponse(
            "no text or function call in response".to_string(),
        ));
    }

    Ok(ModelReply::Text(text))
}

#[async_trait]
impl AiProvider for GeminiProvider {
    async fn generate(
        &self,
        system_instruction: &str,
        history: &[Turn],
        tools: &[ToolDefinition],
        user_text: &str,
    ) -> Result<ModelReply, ProviderError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );

        let body = Self::request_body(system_instruction, history, tools, user_text);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout
                } else {
                    ProviderError::RequestFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ProviderError::RequestFailed(format!(
                "HTTP {status}: {text}"
            )));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        extract_reply(parsed)
    }
}
