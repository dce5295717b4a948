//! Application configuration

pub mod prompts;

use std::env;

use serde::{Deserialize, Serialize};

pub use prompts::{compose_system_instruction, InvalidPersonaError, Persona};

/// Default number of prior turns forwarded to the model per request.
pub const DEFAULT_HISTORY_WINDOW: usize = 5;

/// Default timeout for a single Gemini call, in seconds.
pub const DEFAULT_GEMINI_TIMEOUT_SECS: u64 = 20;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub gemini_model: String,
    pub gemini_timeout_secs: u64,
    /// Base URL of the external Sweetnotes resource catalogue.
    pub sweetnotes_url: String,
    /// Maximum prior turns sent to the model (K).
    pub history_window: usize,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".into()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            gemini_api_key: env::var("GEMINI_API_KEY").ok(),
            gemini_base_url: env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta".into()),
            gemini_model: env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.5-flash".into()),
            gemini_timeout_secs: env::var("GEMINI_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_GEMINI_TIMEOUT_SECS),
            sweetnotes_url: env::var("SWEETNOTES_URL")
                .unwrap_or_else(|_| "https://sweetnotes-t7kw.onrender.com".into()),
            history_window: env::var("HISTORY_WINDOW")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_HISTORY_WINDOW),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(DEFAULT_HISTORY_WINDOW, 5);
        assert_eq!(DEFAULT_GEMINI_TIMEOUT_SECS, 20);
    }
}
