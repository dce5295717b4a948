//! Chat engine with tool dispatch
//!
//! One model call per user turn. The model either answers in free text
//! (passed through verbatim) or proposes a single tool call, which is
//! validated and executed locally before the reply is synthesized. Tool
//! results are never fed back for a second model call; that keeps latency
//! and reply shape predictable.

use std::sync::Arc;

use serde_json::Value;

use crate::config::{compose_system_instruction, Config, Persona};
use crate::conversation::{self, Turn};
use crate::providers::{AiProvider, ModelReply};
use crate::tools::{self, FindNoteArgs, SaveNoteArgs, ToolArgumentError, ToolDefinition};

use super::notes::{NewNote, NoteStore};
use super::reply::{self, FALLBACK_REPLY};

/// One inbound chat turn.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub message: String,
    pub persona: Persona,
    /// Full prior history as supplied by the caller; the engine windows it.
    pub history: Vec<Turn>,
}

/// Errors the dispatch can fail with. Every variant degrades to the
/// generic apology reply at the HTTP boundary; none reach the end user.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("tool call rejected: {0}")]
    ToolArguments(#[from] ToolArgumentError),

    #[error("note store write failed: {0}")]
    StoreWrite(#[source] sqlx::Error),

    #[error("note store read failed: {0}")]
    StoreRead(#[source] sqlx::Error),
}

/// The core orchestration engine. Stateless across turns: everything it
/// needs arrives in the request or was injected at construction.
pub struct ChatEngine {
    config: Config,
    provider: Arc<dyn AiProvider>,
    notes: Arc<NoteStore>,
    tools: Vec<ToolDefinition>,
}

impl ChatEngine {
    pub fn new(config: Config, provider: Arc<dyn AiProvider>, notes: Arc<NoteStore>) -> Self {
        Self {
            config,
            provider,
            notes,
            tools: tools::declarations(),
        }
    }

    /// Process one chat turn and produce the reply text.
    ///
    /// Model transport failures are absorbed here: the turn completes with
    /// the fixed fallback reply and the store is never touched.
    pub async fn chat(&self, request: ChatRequest) -> Result<String, ChatError> {
        let windowed = conversation::window(&request.history, self.config.history_window);
        let system_instruction = compose_system_instruction(request.persona);
        let annotated = format!("[Persona: {}]: {}", request.persona.key(), request.message);

        let model_reply = match self
            .provider
            .generate(&system_instruction, &windowed, &self.tools, &annotated)
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(persona = %request.persona, error = %e,
                    "model call failed, degrading to fallback reply");
                return Ok(FALLBACK_REPLY.to_string());
            }
        };

        match model_reply {
            ModelReply::Text(text) => Ok(text),
            ModelReply::ToolCall { name, args } => self.dispatch_tool(&name, &args).await,
        }
    }

    async fn dispatch_tool(&self, name: &str, args: &Value) -> Result<String, ChatError> {
        match name {
            tools::SAVE_NOTE => {
                let args = SaveNoteArgs::parse(args)?;
                tracing::info!(tool = tools::SAVE_NOTE, subject = %args.subject,
                    "dispatching tool call");

                self.notes
                    .insert(&NewNote {
                        subject: args.subject.clone(),
                        link: args.link,
                        semester: args.semester,
                        contributed_by: None,
                    })
                    .await
                    .map_err(ChatError::StoreWrite)?;

                Ok(reply::save_ack(&args.subject))
            }
            tools::FIND_NOTE => {
                let args = FindNoteArgs::parse(args)?;
                tracing::info!(tool = tools::FIND_NOTE, subject = %args.subject,
                    "dispatching tool call");

                let note = self
                    .notes
                    .find_verified(&args.subject)
                    .await
                    .map_err(ChatError::StoreRead)?;

                let link =
                    reply::catalogue_link(&self.config.sweetnotes_url, args.semester.as_deref());

                Ok(reply::find_reply(
                    &args.subject,
                    args.semester.as_deref(),
                    &link,
                    note.as_ref(),
                ))
            }
            other => Err(ChatError::ToolArguments(ToolArgumentError::UnknownTool(
                other.to_string(),
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ProviderError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// What the scripted model should answer with.
    enum Script {
        Text(String),
        ToolCall(&'static str, Value),
        Timeout,
    }

    /// Arguments of the last `generate` call, for assertions.
    #[derive(Default)]
    struct Seen {
        system: String,
        history_len: usize,
        user_text: String,
    }

    struct ScriptedProvider {
        script: Script,
        seen: Mutex<Seen>,
    }

    impl ScriptedProvider {
        fn new(script: Script) -> Arc<Self> {
            Arc::new(Self {
                script,
                seen: Mutex::new(Seen::default()),
            })
        }
    }

    #[async_trait]
    impl AiProvider for ScriptedProvider {
        async fn generate(
            &self,
            system_instruction: &str,
            history: &[Turn],
            _tools: &[ToolDefinition],
            user_text: &str,
        ) -> Result<ModelReply, ProviderError> {
            *self.seen.lock().unwrap() = Seen {
                system: system_instruction.to_string(),
                history_len: history.len(),
                user_text: user_text.to_string(),
            };

            match &self.script {
                Script::Text(t) => Ok(ModelReply::Text(t.clone())),
                Script::ToolCall(name, args) => Ok(ModelReply::ToolCall {
                    name: name.to_string(),
                    args: args.clone(),
                }),
                Script::Timeout => Err(ProviderError::Timeout),
            }
        }
    }

    fn test_config() -> Config {
        Config {
            host: "127.0.0.1".into(),
            port: 3000,
            gemini_api_key: None,
            gemini_base_url: "http://localhost:1234".into(),
            gemini_model: "gemini-test".into(),
            gemini_timeout_secs: 20,
            sweetnotes_url: "https://sweetnotes.example".into(),
            history_window: 5,
        }
    }

    async fn engine_with(
        script: Script,
    ) -> (ChatEngine, Arc<ScriptedProvider>, Arc<NoteStore>) {
        let provider = ScriptedProvider::new(script);
        let notes = Arc::new(NoteStore::new_in_memory_async().await.unwrap());
        let engine = ChatEngine::new(test_config(), provider.clone(), notes.clone());
        (engine, provider, notes)
    }

    fn request(message: &str) -> ChatRequest {
        ChatRequest {
            message: message.to_string(),
            persona: Persona::Exam,
            history: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_free_text_passes_through_verbatim() {
        let (engine, provider, _) = engine_with(Script::Text("Grace marks are 6-10.".into())).await;
        let reply = engine.chat(request("grace marks?")).await.unwrap();
        assert_eq!(reply, "Grace marks are 6-10.");

        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen.user_text, "[Persona: exam]: grace marks?");
        assert!(seen.system.contains("RTU KNOWLEDGE BASE"));
    }

    #[tokio::test]
    async fn test_history_is_windowed_before_the_call() {
        let (engine, provider, _) = engine_with(Script::Text("ok".into())).await;
        let mut req = request("latest");
        req.history = (0..9).map(|i| Turn::user(format!("m{i}"))).collect();
        engine.chat(req).await.unwrap();

        assert_eq!(provider.seen.lock().unwrap().history_len, 5);
    }

    #[tokio::test]
    async fn test_save_note_inserts_unverified_and_acks() {
        let (engine, _, notes) = engine_with(Script::ToolCall(
            tools::SAVE_NOTE,
            json!({ "subject": "DBMS", "link": " http://x ", "semester": "3" }),
        ))
        .await;

        let reply = engine.chat(request("save these dbms notes")).await.unwrap();
        assert!(reply.contains("DBMS"));
        assert!(reply.contains("verification"));

        // Stored, trimmed, but not yet visible to lookups.
        assert_eq!(notes.count().await.unwrap(), 1);
        assert!(notes.find_verified("dbms").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_note_before_verification_gives_catalogue_only() {
        let (engine, _, notes) = engine_with(Script::ToolCall(
            tools::FIND_NOTE,
            json!({ "subject": "dbms" }),
        ))
        .await;

        notes
            .insert(&NewNote {
                subject: "DBMS".into(),
                link: "http://x".into(),
                semester: Some("3".into()),
                contributed_by: None,
            })
            .await
            .unwrap();

        let reply = engine.chat(request("dbms notes?")).await.unwrap();
        assert!(reply.contains("https://sweetnotes.example/"));
        assert!(!reply.contains("http://x"));
        assert!(reply.contains("Do you have a link to contribute?"));
    }

    #[tokio::test]
    async fn test_find_note_after_verification_combines_both_links() {
        let (engine, _, notes) = engine_with(Script::ToolCall(
            tools::FIND_NOTE,
            json!({ "subject": "DBMS", "semester": "3" }),
        ))
        .await;

        let id = notes
            .insert(&NewNote {
                subject: "DBMS".into(),
                link: "http://x".into(),
                semester: Some("3".into()),
                contributed_by: None,
            })
            .await
            .unwrap();
        notes.mark_verified(id).await.unwrap();

        let reply = engine.chat(request("dbms notes?")).await.unwrap();
        assert!(reply.contains("https://sweetnotes.example/3sem"));
        assert!(reply.contains("http://x"));
    }

    #[tokio::test]
    async fn test_find_note_no_match_never_empty() {
        let (engine, _, _) = engine_with(Script::ToolCall(
            tools::FIND_NOTE,
            json!({ "subject": "Quantum Foo" }),
        ))
        .await;

        let reply = engine.chat(request("quantum foo notes?")).await.unwrap();
        assert!(!reply.is_empty());
        assert!(reply.contains("https://sweetnotes.example/"));
        assert!(reply.contains("Do you have a link to contribute?"));
    }

    #[tokio::test]
    async fn test_model_timeout_degrades_to_fallback_without_store_writes() {
        let (engine, _, notes) = engine_with(Script::Timeout).await;

        let reply = engine.chat(request("anything")).await.unwrap();
        assert_eq!(reply, FALLBACK_REPLY);
        assert_eq!(notes.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_save_note_missing_link_writes_nothing() {
        let (engine, _, notes) = engine_with(Script::ToolCall(
            tools::SAVE_NOTE,
            json!({ "subject": "DBMS" }),
        ))
        .await;

        let err = engine.chat(request("save my notes")).await.unwrap_err();
        assert!(matches!(
            err,
            ChatError::ToolArguments(ToolArgumentError::MissingField { field: "link", .. })
        ));
        assert_eq!(notes.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_rejected() {
        let (engine, _, _) =
            engine_with(Script::ToolCall("drop_tables", json!({}))).await;

        let err = engine.chat(request("hi")).await.unwrap_err();
        assert!(matches!(
            err,
            ChatError::ToolArguments(ToolArgumentError::UnknownTool(_))
        ));
    }
}
