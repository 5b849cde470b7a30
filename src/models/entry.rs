//! Conversation entry model: typed messages and capability requests.

use serde::{Deserialize, Serialize};

/// Author role of a conversation entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Synthesized instruction entry.
    System,
    /// End-user (or alert-injected) input.
    Human,
    /// Reasoning-engine output.
    Assistant,
    /// Capability result addressed to a prior request.
    Tool,
}

/// A capability invocation requested by an assistant entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct CapabilityRequest {
    /// Requested capability name.
    pub name: String,
    /// JSON arguments supplied by the reasoning engine.
    pub arguments: serde_json::Value,
    /// Correlation identifier echoed back on the tool entry.
    pub call_id: String,
}

/// One immutable entry of the conversation transcript.
///
/// Entries are append-only: once pushed onto `ConversationState::messages`
/// they are never mutated or removed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct Entry {
    /// Author role.
    pub role: Role,
    /// Textual content; may be empty for assistant entries that only carry
    /// capability requests.
    pub content: String,
    /// For tool entries, the `call_id` of the request being answered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// For assistant entries, the capability requests to dispatch.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capability_requests: Vec<CapabilityRequest>,
}

impl Entry {
    /// Construct a system entry.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
            tool_call_id: None,
            capability_requests: Vec::new(),
        }
    }

    /// Construct a human entry.
    #[must_use]
    pub fn human(content: impl Into<String>) -> Self {
        Self {
            role: Role::Human,
            content: content.into(),
            tool_call_id: None,
            capability_requests: Vec::new(),
        }
    }

    /// Construct an assistant entry without capability requests.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tool_call_id: None,
            capability_requests: Vec::new(),
        }
    }

    /// Construct an assistant entry carrying capability requests.
    #[must_use]
    pub fn assistant_with_requests(
        content: impl Into<String>,
        requests: Vec<CapabilityRequest>,
    ) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            tool_call_id: None,
            capability_requests: requests,
        }
    }

    /// Construct a tool entry answering the given request.
    #[must_use]
    pub fn tool(content: impl Into<String>, call_id: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
            tool_call_id: Some(call_id.into()),
            capability_requests: Vec::new(),
        }
    }

    /// Whether this entry requests at least one capability.
    #[must_use]
    pub fn has_capability_requests(&self) -> bool {
        !self.capability_requests.is_empty()
    }
}
