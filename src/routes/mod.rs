//! API routes
//!
//! The chat endpoint accepts the Gemini-shaped history the web client
//! already produces. Classified engine failures degrade to a 500 with the
//! generic apology reply in the normal response shape; no internal error
//! text leaks to the end user.

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};

use crate::config::Persona;
use crate::conversation::{Role, Turn};
use crate::core::reply::APOLOGY_REPLY;
use crate::core::ChatRequest;
use crate::AppState;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// One history entry in Gemini wire form: `{ role, parts: [{ text }] }`.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    #[serde(default)]
    pub parts: Vec<HistoryPart>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryPart {
    pub text: String,
}

impl From<HistoryEntry> for Turn {
    fn from(entry: HistoryEntry) -> Self {
        let text = entry
            .parts
            .into_iter()
            .map(|p| p.text)
            .collect::<Vec<_>>()
            .join("");
        Turn {
            role: entry.role,
            text,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatTurnRequest {
    pub message: String,
    pub persona: Persona,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Serialize)]
pub struct ChatTurnResponse {
    pub reply: String,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatTurnRequest>,
) -> (StatusCode, Json<ChatTurnResponse>) {
    let persona = request.persona;
    let preview: String = request.message.chars().take(80).collect();

    let engine_request = ChatRequest {
        message: request.message,
        persona,
        history: request.history.into_iter().map(Turn::from).collect(),
    };

    match state.engine.chat(engine_request).await {
        Ok(reply) => (StatusCode::OK, Json(ChatTurnResponse { reply })),
        Err(e) => {
            tracing::error!(persona = %persona, message = %preview, error = %e,
                "chat turn failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ChatTurnResponse {
                    reply: APOLOGY_REPLY.to_string(),
                }),
            )
        }
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/ai/chat", post(chat))
}
