//! Per-conversation session: single-flight turn execution, reset handling,
//! and turn-result assembly.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, info_span, warn, Instrument};

use crate::checkpoint::CheckpointStore;
use crate::engine::StepEngine;
use crate::metrics::MetricsLogger;
use crate::models::entry::{Entry, Role};
use crate::models::state::{ConversationState, StatePatch};
use crate::models::thread::ThreadHandle;
use crate::models::turn::{Language, Sender, TurnReply};
use crate::speech::SpeechSynthesizer;
use crate::Result;

use super::render;

/// Literal input that resets the session instead of running the engine.
pub const RESET_KEYWORD: &str = "exit";

/// Checkpoint node label for the initial snapshot of a fresh thread.
const INITIAL_NODE: &str = "session";

/// State guarded by the session lock.
struct SessionInner {
    thread: ThreadHandle,
    state: ConversationState,
    /// How many transcript entries have already been surfaced to the caller.
    surfaced_count: usize,
    /// Whether the engine is suspended awaiting a confirmation value.
    interrupted: bool,
}

/// One logical conversation.
///
/// All turns are serialized through an async mutex: a second concurrent
/// `turn` call blocks until the first completes, so no two turns ever
/// interleave state mutation.
///
/// Sender routing: human input is appended and the engine runs from its
/// start node (or resumes a pending interrupt); alert input is injected as a
/// synthetic human-labeled entry and always reaches a decision cycle
/// immediately, either directly when the engine is idle or through the
/// resume path, where the alert marker cancels the pending capability and
/// dispatch routes straight back to the decision node.
pub struct ConversationSession {
    engine: StepEngine,
    store: CheckpointStore,
    speech: Arc<dyn SpeechSynthesizer>,
    metrics: Option<MetricsLogger>,
    verbose_llm: bool,
    inner: Mutex<SessionInner>,
}

impl ConversationSession {
    /// Start a session: mint a thread, write its initial checkpoint, and
    /// export the step-graph diagram.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the initial checkpoint cannot be written.
    pub async fn start(
        engine: StepEngine,
        store: CheckpointStore,
        speech: Arc<dyn SpeechSynthesizer>,
        metrics: Option<MetricsLogger>,
        verbose_llm: bool,
    ) -> Result<Self> {
        let thread = ThreadHandle::mint();
        let state = ConversationState::default();
        store.save(&thread, INITIAL_NODE, &state, None).await?;

        if let Some(ref metrics) = metrics {
            if let Err(err) = metrics.write_diagram(&StepEngine::mermaid_diagram()) {
                warn!(%err, "failed to export step-graph diagram");
            }
        }

        info!(%thread, "session started");

        Ok(Self {
            engine,
            store,
            speech,
            metrics,
            verbose_llm,
            inner: Mutex::new(SessionInner {
                thread,
                state,
                surfaced_count: 0,
                interrupted: false,
            }),
        })
    }

    /// The current thread handle (for recovery inspection and tests).
    pub async fn thread(&self) -> ThreadHandle {
        self.inner.lock().await.thread.clone()
    }

    /// Execute one turn to completion or suspension.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if checkpoint persistence fails and
    /// `AppError::Reasoning` if the reasoning collaborator fails; every
    /// other failure mode degrades into ordinary conversational text.
    pub async fn turn(
        &self,
        input: &str,
        language: Language,
        sender: Sender,
    ) -> Result<TurnReply> {
        let mut inner = self.inner.lock().await;
        let span = info_span!("turn", thread = %inner.thread, ?sender);
        self.turn_locked(&mut inner, input, language)
            .instrument(span)
            .await
    }

    async fn turn_locked(
        &self,
        inner: &mut SessionInner,
        input: &str,
        language: Language,
    ) -> Result<TurnReply> {
        // ── Session reset ───────────────────────────────────
        if input.trim().eq_ignore_ascii_case(RESET_KEYWORD) {
            self.reset(inner).await?;
            return Ok(TurnReply {
                assistant_text: "Session reset.".into(),
                ..TurnReply::default()
            });
        }

        // ── Resume or append ────────────────────────────────
        let resume = inner.interrupted.then(|| input.to_owned());
        if resume.is_none() {
            // Alert input is injected as a human-labeled entry; the engine
            // always starts at its decision node.
            inner
                .state
                .apply(StatePatch::message(Entry::human(input)));
        }

        let timeline_before = inner.state.timeline.len();
        let SessionInner { thread, state, .. } = &mut *inner;
        let interrupt = self
            .engine
            .run(thread, state, language, resume.as_deref())
            .await?;
        inner.interrupted = interrupt.is_some();

        // ── Extract entries appended since the last turn ────
        let new_entries: Vec<Entry> = inner.state.messages[inner.surfaced_count..].to_vec();
        inner.surfaced_count = inner.state.messages.len();

        let (mut assistant_text, tool_text, system_text) = classify(&new_entries);

        // ── Surface the interrupt prompt ────────────────────
        let mut spoken_text = String::new();
        if let Some(ref prompt) = interrupt {
            if assistant_text.is_empty() {
                assistant_text = prompt.clone();
            } else {
                assistant_text = format!("{assistant_text}\n{prompt}");
            }
            spoken_text = render::speech_text(prompt);
        }
        if spoken_text.is_empty() {
            spoken_text = render::speech_text(&inner.state.pending_spoken_text);
        }

        // ── Speech and metrics must never fail the turn ─────
        let spoken_audio = match self.speech.synthesize(&spoken_text, language).await {
            Ok(audio) => audio,
            Err(err) => {
                warn!(%err, "speech synthesis failed");
                String::new()
            }
        };

        self.log_turn(inner, &new_entries, timeline_before);

        Ok(TurnReply {
            assistant_text: render::display_text(&assistant_text, self.verbose_llm),
            tool_text,
            system_text,
            used_capabilities: inner.state.tools_used.clone(),
            spoken_text,
            spoken_audio,
        })
    }

    /// Discard the current lineage and start a fresh one. The old thread's
    /// checkpoints remain untouched; any pending interrupt is abandoned
    /// implicitly.
    async fn reset(&self, inner: &mut SessionInner) -> Result<()> {
        if let Some(ref metrics) = self.metrics {
            if let Err(err) = metrics.purge_artifacts() {
                warn!(%err, "failed to purge session artifacts");
            }
        }

        inner.thread = ThreadHandle::mint();
        inner.state = ConversationState::default();
        inner.surfaced_count = 0;
        inner.interrupted = false;

        self.store
            .save(&inner.thread, INITIAL_NODE, &inner.state, None)
            .await?;

        info!(thread = %inner.thread, "session reset");
        Ok(())
    }

    fn log_turn(&self, inner: &SessionInner, new_entries: &[Entry], timeline_before: usize) {
        let Some(ref metrics) = self.metrics else {
            return;
        };

        if let Some(usage) = inner.state.token_usage {
            if let Err(err) = metrics.log_token_usage(usage) {
                warn!(%err, "token usage logging failed");
            }
        }
        if let Err(err) = metrics.log_state(&inner.state) {
            warn!(%err, "state logging failed");
        }
        if let Err(err) = metrics.log_entries(new_entries) {
            warn!(%err, "message logging failed");
        }
        if let Err(err) = metrics.log_timeline(&inner.state.timeline[timeline_before..]) {
            warn!(%err, "timeline logging failed");
        }
    }
}

/// Split new entries into assistant / tool / system text blocks; entries
/// with blank content are skipped, human entries are never surfaced back.
fn classify(entries: &[Entry]) -> (String, String, String) {
    let mut assistant = String::new();
    let mut tool = String::new();
    let mut system = String::new();

    for entry in entries {
        let content = entry.content.trim();
        if content.is_empty() {
            continue;
        }
        let block = match entry.role {
            Role::Assistant => &mut assistant,
            Role::Tool => &mut tool,
            Role::System => &mut system,
            Role::Human => continue,
        };
        if !block.is_empty() {
            block.push('\n');
        }
        block.push_str(content);
    }

    (assistant, tool, system)
}
