//! Conversation turns and the context window
//!
//! The engine holds no session memory: the caller supplies the full prior
//! message list per request and gets back a bounded, role-tagged window.

use serde::{Deserialize, Serialize};

/// Who authored a turn, in the Gemini role vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// One prior turn of the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}

/// A raw chat message as the transport layer stores it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender_id: String,
    pub text: String,
}

/// Map a chat log to role-tagged turns: messages authored by the current
/// user become `user`, everything else becomes `model`.
pub fn attribute(messages: &[ChatMessage], current_user_id: &str) -> Vec<Turn> {
    messages
        .iter()
        .map(|m| {
            let role = if m.sender_id == current_user_id {
                Role::User
            } else {
                Role::Model
            };
            Turn {
                role,
                text: m.text.clone(),
            }
        })
        .collect()
}

/// Keep the most recent `k` turns, oldest to newest.
pub fn window(turns: &[Turn], k: usize) -> Vec<Turn> {
    let start = turns.len().saturating_sub(k);
    turns[start..].to_vec()
}
