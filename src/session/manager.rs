//! Session manager: composition root wiring configuration into one live
//! conversation session.

use std::sync::Arc;

use crate::capabilities::clock::CheckSystemTime;
use crate::capabilities::todo::{JsonFileTodoStore, TodoStore, UpdateTodoList};
use crate::capabilities::CapabilityRegistry;
use crate::checkpoint::CheckpointStore;
use crate::config::AppConfig;
use crate::engine::StepEngine;
use crate::metrics::MetricsLogger;
use crate::models::turn::{Language, Sender, TurnReply};
use crate::reasoning::openai::OpenAiReasoner;
use crate::reasoning::ReasoningEngine;
use crate::speech::{DisabledSpeech, HttpSpeech, SpeechSynthesizer};
use crate::Result;

use super::conversation::ConversationSession;

/// Owns the single live session and hands turns to it.
pub struct SessionManager {
    session: ConversationSession,
}

impl SessionManager {
    /// Build the full collaborator stack from configuration and start a
    /// session.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the store cannot be opened or the initial
    /// checkpoint fails, `AppError::Io` if the log directory cannot be
    /// created.
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let store = CheckpointStore::connect(config.db_path()).await?;
        let reasoning: Arc<dyn ReasoningEngine> =
            Arc::new(OpenAiReasoner::from_config(&config.model));
        let speech: Arc<dyn SpeechSynthesizer> = if config.speech.endpoint.is_empty() {
            Arc::new(DisabledSpeech)
        } else {
            Arc::new(HttpSpeech::from_config(&config.speech))
        };

        let todo_path = config
            .db_path()
            .parent()
            .map_or_else(|| "todo_list.json".into(), |dir| dir.join("todo_list.json"));
        let todo_store: Arc<dyn TodoStore> = Arc::new(JsonFileTodoStore::new(todo_path));

        Self::assemble(config, store, reasoning, speech, todo_store).await
    }

    /// Assemble a manager over explicit collaborators (used by tests to
    /// inject the in-memory store and the scripted reasoner).
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the initial checkpoint fails and
    /// `AppError::Io` if the log directory cannot be created.
    pub async fn assemble(
        config: &AppConfig,
        store: CheckpointStore,
        reasoning: Arc<dyn ReasoningEngine>,
        speech: Arc<dyn SpeechSynthesizer>,
        todo_store: Arc<dyn TodoStore>,
    ) -> Result<Self> {
        let mut registry = CapabilityRegistry::new();
        registry.register(Arc::new(CheckSystemTime));
        registry.register(Arc::new(UpdateTodoList::new(todo_store)));

        let engine = StepEngine::new(reasoning, registry, store.clone());

        let metrics = if config.logging {
            Some(MetricsLogger::new(config.log_dir.clone())?)
        } else {
            None
        };

        let session =
            ConversationSession::start(engine, store, speech, metrics, config.verbose_llm).await?;

        Ok(Self { session })
    }

    /// Run one turn against the live session.
    ///
    /// # Errors
    ///
    /// Propagates fatal turn errors (persistence, reasoning transport); all
    /// other failure modes are already degraded into conversational text by
    /// the session.
    pub async fn process_message(
        &self,
        message: &str,
        language: Language,
        sender: Sender,
    ) -> Result<TurnReply> {
        self.session.turn(message, language, sender).await
    }

    /// The live session (tests inspect its thread handle).
    #[must_use]
    pub fn session(&self) -> &ConversationSession {
        &self.session
    }
}
