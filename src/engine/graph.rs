//! The step engine: executes the fixed node graph one node at a time,
//! checkpointing after every applied command.
//!
//! Graph: `decide → (dispatch | respond)`, `dispatch → decide`,
//! `respond → terminate`. A run starts at `decide`, or re-enters `dispatch`
//! when resuming a suspended confirmation.

use std::fmt::Write as _;
use std::sync::Arc;

use tracing::{info_span, warn, Instrument};

use crate::capabilities::CapabilityRegistry;
use crate::checkpoint::CheckpointStore;
use crate::models::entry::{Entry, Role};
use crate::models::state::{ConversationState, StatePatch, TimelineRecorder};
use crate::models::thread::ThreadHandle;
use crate::models::turn::Language;
use crate::reasoning::{prompts, ReasoningEngine};
use crate::Result;

use super::node::{NodeId, StepCommand};

/// Literal token that confirms a gated capability (compared
/// case-insensitively against the whole resume value).
pub const CONFIRMATION_TOKEN: &str = "yes";

/// Marker that short-circuits a pending confirmation: a resume value
/// containing it cancels the capability regardless of any other text.
pub const ALERT_MARKER: &str = "[alert]";

/// Executes nodes against a conversation state and persists a checkpoint
/// after every applied transition command.
pub struct StepEngine {
    reasoning: Arc<dyn ReasoningEngine>,
    capabilities: CapabilityRegistry,
    store: CheckpointStore,
}

impl StepEngine {
    /// Assemble an engine over its collaborators.
    #[must_use]
    pub fn new(
        reasoning: Arc<dyn ReasoningEngine>,
        capabilities: CapabilityRegistry,
        store: CheckpointStore,
    ) -> Self {
        Self {
            reasoning,
            capabilities,
            store,
        }
    }

    /// Drive the graph until it terminates or suspends.
    ///
    /// With `resume` present the run re-enters `dispatch` (exactly where a
    /// prior run suspended), substituting the value for the confirmation
    /// flow; otherwise it starts at `decide`. Returns the confirmation
    /// prompt when the run suspended.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if a checkpoint write fails (fatal for the
    /// turn: continuing would desynchronize durable and in-memory state) and
    /// `AppError::Reasoning` if the reasoning collaborator fails.
    pub async fn run(
        &self,
        thread: &ThreadHandle,
        state: &mut ConversationState,
        language: Language,
        resume: Option<&str>,
    ) -> Result<Option<String>> {
        let span = info_span!("engine_run", thread = %thread, resuming = resume.is_some());
        self.run_inner(thread, state, language, resume)
            .instrument(span)
            .await
    }

    async fn run_inner(
        &self,
        thread: &ThreadHandle,
        state: &mut ConversationState,
        language: Language,
        resume: Option<&str>,
    ) -> Result<Option<String>> {
        let mut resume = resume.map(str::to_owned);
        let mut node = if resume.is_some() {
            NodeId::Dispatch
        } else {
            NodeId::Decide
        };

        loop {
            let command = match node {
                NodeId::Decide => self.decide(state, language).await?,
                NodeId::Dispatch => {
                    let value = resume.take();
                    self.dispatch(state, language, value.as_deref()).await
                }
                NodeId::Respond => self.respond(state, language).await,
            };

            // The checkpoint must be durable before the next node executes,
            // so a crash leaves the last completed step as the recovery
            // point.
            match command {
                StepCommand::Advance { next, patch } => {
                    state.apply(patch);
                    self.store.save(thread, node.label(), state, None).await?;
                    node = next;
                }
                StepCommand::Suspend { prompt } => {
                    self.store
                        .save(thread, node.label(), state, Some(&prompt))
                        .await?;
                    return Ok(Some(prompt));
                }
                StepCommand::Terminate { patch } => {
                    state.apply(patch);
                    self.store.save(thread, node.label(), state, None).await?;
                    return Ok(None);
                }
            }
        }
    }

    /// Reasoning step: build the bounded context window, invoke the
    /// reasoning engine once, and route on whether it requested
    /// capabilities.
    async fn decide(
        &self,
        state: &ConversationState,
        language: Language,
    ) -> Result<StepCommand> {
        let mut recorder = TimelineRecorder::resume_from(&state.timeline);

        let mut context = Vec::with_capacity(state.messages.len() + 1);
        context.push(Entry::system(prompts::system_prompt(language)));
        context.extend(bounded_context_window(&state.messages));

        recorder.mark("LLM Start");
        let decision = self
            .reasoning
            .decide(&context, &self.capabilities.manifest())
            .await?;
        recorder.mark("LLM End");

        let next = if decision.entry.has_capability_requests() {
            NodeId::Dispatch
        } else {
            NodeId::Respond
        };

        Ok(StepCommand::Advance {
            next,
            patch: StatePatch {
                messages: vec![decision.entry],
                token_usage: Some(decision.usage),
                timeline: recorder.into_marks(),
                ..StatePatch::default()
            },
        })
    }

    /// Capability step: gate, execute, or reject the requests attached to
    /// the latest assistant entry, then route back to `decide`.
    ///
    /// Only the last request's resulting command is kept, so at most one
    /// externally visible effect lands per step even when several requests
    /// are nominally attached.
    async fn dispatch(
        &self,
        state: &ConversationState,
        language: Language,
        resume: Option<&str>,
    ) -> StepCommand {
        let requests = state
            .messages
            .last()
            .filter(|entry| entry.role == Role::Assistant)
            .map(|entry| entry.capability_requests.clone())
            .unwrap_or_default();

        if requests.is_empty() {
            return advance_to_decide(StatePatch::default());
        }

        let mut recorder = TimelineRecorder::resume_from(&state.timeline);
        let confirmation = resume.unwrap_or("");
        let mut command = advance_to_decide(StatePatch::default());

        for request in &requests {
            let Some(capability) = self.capabilities.resolve(&request.name) else {
                warn!(name = %request.name, "invalid capability requested");
                command = advance_to_decide(StatePatch::message(Entry::tool(
                    format!(
                        "{} is not a valid capability. Do not expect a response from it.",
                        request.name
                    ),
                    request.call_id.as_str(),
                )));
                continue;
            };

            // A sensitive capability without a confirmation value suspends
            // the whole node; the resume value re-enters here.
            if capability.sensitive() && resume.is_none() {
                return StepCommand::Suspend {
                    prompt: prompts::confirmation_prompt(language).to_owned(),
                };
            }

            // Alert override wins over both the confirmed and declined
            // paths.
            if confirmation.to_lowercase().contains(ALERT_MARKER) {
                command = advance_to_decide(StatePatch::message(Entry::tool(
                    "An alert interrupted the tool calling.",
                    request.call_id.as_str(),
                )));
                continue;
            }

            if !capability.sensitive() || confirmation.eq_ignore_ascii_case(CONFIRMATION_TOKEN) {
                recorder.mark(format!("Tool Invoke Start: {}", request.name));
                let invoked = capability.invoke(request, &state.scratch).await;
                recorder.mark(format!("Tool Invoke End: {}", request.name));

                command = match invoked {
                    Ok(patch) => advance_to_decide(patch),
                    Err(err) => {
                        warn!(name = %request.name, %err, "capability invocation failed");
                        advance_to_decide(StatePatch::message(Entry::tool(
                            "The capability execution failed.",
                            request.call_id.as_str(),
                        )))
                    }
                };
            } else {
                command = advance_to_decide(StatePatch::message(Entry::tool(
                    "The user cancelled the execution.",
                    request.call_id.as_str(),
                )));
            }
        }

        attach_marks(command, recorder)
    }

    /// Terminal step: condense the latest assistant entry into speech-ready
    /// text. Every failure here is local; the turn still terminates
    /// normally with empty speech text.
    async fn respond(&self, state: &ConversationState, language: Language) -> StepCommand {
        let spoken = match state.messages.last() {
            Some(entry) if entry.role == Role::Assistant && !entry.content.trim().is_empty() => {
                match self.reasoning.condense(&entry.content, language).await {
                    Ok(text) => text,
                    Err(err) => {
                        warn!(%err, "condensation failed; speech text left empty");
                        String::new()
                    }
                }
            }
            Some(entry) => {
                warn!(role = ?entry.role, "terminal entry unusable for speech");
                String::new()
            }
            None => {
                warn!("terminal step reached with an empty transcript");
                String::new()
            }
        };

        StepCommand::Terminate {
            patch: StatePatch {
                pending_spoken_text: Some(spoken),
                ..StatePatch::default()
            },
        }
    }

    /// Mermaid rendering of the node graph, derived from the static
    /// transition table.
    #[must_use]
    pub fn mermaid_diagram() -> String {
        let mut out = String::from("graph TD\n");
        for node in [NodeId::Decide, NodeId::Dispatch, NodeId::Respond] {
            for next in node.successors() {
                let _ = writeln!(out, "    {} --> {}", node.label(), next.label());
            }
        }
        let _ = writeln!(out, "    {} --> __end__", NodeId::Respond.label());
        out
    }
}

/// The bounded context window over the transcript.
///
/// The last 3 entries are always retained regardless of what the relevance
/// filter decides; with fewer than 3 entries the entire history is included.
#[must_use]
pub fn bounded_context_window(messages: &[Entry]) -> Vec<Entry> {
    let floor = messages.len().saturating_sub(3);
    messages
        .iter()
        .enumerate()
        .filter(|&(index, entry)| index >= floor || is_relevant(entry))
        .map(|(_, entry)| entry.clone())
        .collect()
}

/// Relevance filter applied to entries older than the floor. Currently keeps
/// everything; tightening it must not touch the last-3 guarantee above.
fn is_relevant(_entry: &Entry) -> bool {
    true
}

fn advance_to_decide(patch: StatePatch) -> StepCommand {
    StepCommand::Advance {
        next: NodeId::Decide,
        patch,
    }
}

/// Fold the recorded timing marks into the surviving command's patch.
fn attach_marks(command: StepCommand, recorder: TimelineRecorder) -> StepCommand {
    match command {
        StepCommand::Advance { next, mut patch } => {
            let mut timeline = recorder.into_marks();
            timeline.append(&mut patch.timeline);
            patch.timeline = timeline;
            StepCommand::Advance { next, patch }
        }
        other => other,
    }
}
