//! Conversation state: the unit of persistence, and the patch/merge rules
//! through which the step engine mutates it.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entry::Entry;

/// Token counts for the most recent reasoning invocation.
///
/// Replaced (not accumulated) on every decide step; accumulation across
/// steps is the caller's concern.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct TokenUsage {
    /// Tokens consumed by the request context.
    pub input_tokens: u32,
    /// Tokens produced by the response.
    pub output_tokens: u32,
}

/// One step-timing mark on the conversation timeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct TimelineMark {
    /// What was timed (e.g. `LLM Start`).
    pub label: String,
    /// Wall-clock timestamp of the mark.
    pub at: DateTime<Utc>,
    /// Seconds elapsed since the previous mark (0 for the first).
    pub delta_seconds: f64,
}

/// One slot of the used-capability history.
///
/// `None` is the repeat sentinel: it is appended instead of a name when the
/// same capability is recorded twice in a row, preserving a "repeat" signal
/// without collapsing history.
pub type CapabilityUse = Option<String>;

/// The full mutable state of one conversation.
///
/// Mutated only through [`StatePatch`] merges; `messages` and `timeline` are
/// strictly append-only.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct ConversationState {
    /// Ordered, append-only transcript.
    pub messages: Vec<Entry>,
    /// Last-step token usage; `None` until the first decide step.
    pub token_usage: Option<TokenUsage>,
    /// Capability-use history under the sentinel merge rule.
    pub tools_used: Vec<CapabilityUse>,
    /// Append-only step-timing marks; never truncated.
    pub timeline: Vec<TimelineMark>,
    /// Speech-ready rendering of the latest substantive assistant entry.
    pub pending_spoken_text: String,
    /// Named scratch slots owned by the capability layer; opaque to the
    /// engine.
    pub scratch: BTreeMap<String, serde_json::Value>,
}

impl ConversationState {
    /// Merge a patch into this state using the per-field rules: append for
    /// `messages` and `timeline`, sentinel-append for `tools_used`, replace
    /// for scalars and scratch slots.
    pub fn apply(&mut self, patch: StatePatch) {
        self.messages.extend(patch.messages);
        self.timeline.extend(patch.timeline);

        for name in patch.tools_used {
            let repeat = self
                .tools_used
                .last()
                .is_some_and(|last| last.as_deref() == Some(name.as_str()));
            self.tools_used.push(if repeat { None } else { Some(name) });
        }

        if let Some(usage) = patch.token_usage {
            self.token_usage = Some(usage);
        }
        if let Some(text) = patch.pending_spoken_text {
            self.pending_spoken_text = text;
        }
        for (key, value) in patch.scratch {
            self.scratch.insert(key, value);
        }
    }
}

/// A partial state produced by one node or capability, merged into
/// [`ConversationState`] by [`ConversationState::apply`].
#[derive(Debug, Clone, Default)]
pub struct StatePatch {
    /// Entries to append to the transcript.
    pub messages: Vec<Entry>,
    /// Replacement token usage, when the step invoked the reasoning engine.
    pub token_usage: Option<TokenUsage>,
    /// Capability names to record under the sentinel rule.
    pub tools_used: Vec<String>,
    /// Timing marks to append.
    pub timeline: Vec<TimelineMark>,
    /// Replacement speech-ready text, when the step produced one.
    pub pending_spoken_text: Option<String>,
    /// Scratch slots to set.
    pub scratch: BTreeMap<String, serde_json::Value>,
}

impl StatePatch {
    /// A patch appending a single entry.
    #[must_use]
    pub fn message(entry: Entry) -> Self {
        Self {
            messages: vec![entry],
            ..Self::default()
        }
    }

    /// Append one more entry to this patch.
    #[must_use]
    pub fn with_message(mut self, entry: Entry) -> Self {
        self.messages.push(entry);
        self
    }

    /// Record a capability name under the sentinel rule.
    #[must_use]
    pub fn with_tool_used(mut self, name: impl Into<String>) -> Self {
        self.tools_used.push(name.into());
        self
    }

    /// Set a scratch slot.
    #[must_use]
    pub fn with_scratch(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.scratch.insert(key.into(), value);
        self
    }
}

/// Records timing marks relative to the last mark already on the timeline,
/// so deltas stay continuous across steps and turns.
#[derive(Debug)]
pub struct TimelineRecorder {
    last_at: Option<DateTime<Utc>>,
    marks: Vec<TimelineMark>,
}

impl TimelineRecorder {
    /// Start a recorder continuing from the state's existing timeline.
    #[must_use]
    pub fn resume_from(timeline: &[TimelineMark]) -> Self {
        Self {
            last_at: timeline.last().map(|mark| mark.at),
            marks: Vec::new(),
        }
    }

    /// Record a mark now.
    pub fn mark(&mut self, label: impl Into<String>) {
        let now = Utc::now();
        #[allow(clippy::cast_precision_loss)]
        let delta_seconds = self
            .last_at
            .map_or(0.0, |prev| (now - prev).num_milliseconds() as f64 / 1000.0);
        self.last_at = Some(now);
        self.marks.push(TimelineMark {
            label: label.into(),
            at: now,
            delta_seconds,
        });
    }

    /// Consume the recorder, returning the marks taken.
    #[must_use]
    pub fn into_marks(self) -> Vec<TimelineMark> {
        self.marks
    }
}
