//! Turn request/response wire shapes and the sender taxonomy.

use serde::{Deserialize, Serialize};

use super::state::CapabilityUse;

/// Conversation language.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum Language {
    /// English.
    #[default]
    #[serde(rename = "EN")]
    En,
    /// Spanish.
    #[serde(rename = "ES")]
    Es,
}

impl Language {
    /// Full language name as used in prompt instructions.
    #[must_use]
    pub fn full_name(self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Es => "Spanish",
        }
    }
}

/// Origin of a turn input.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    /// End-user input.
    #[default]
    Human,
    /// External alert system; always triggers an immediate decision cycle.
    AlertManager,
}

/// Request body of the turn endpoint.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct TurnRequest {
    /// Raw user input for this turn.
    pub message: String,
    /// Conversation language for this turn.
    #[serde(default)]
    pub language: Language,
}

/// Result of one completed turn.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct TurnReply {
    /// Assistant entries appended this turn (plus any active interrupt
    /// prompt), display-cleaned.
    pub assistant_text: String,
    /// Tool entries appended this turn.
    pub tool_text: String,
    /// System entries appended this turn.
    pub system_text: String,
    /// Full capability-use history (repeat sentinel serialized as `null`).
    pub used_capabilities: Vec<CapabilityUse>,
    /// Speech-ready text for this turn.
    pub spoken_text: String,
    /// Base64-encoded WAV payload; empty when synthesis is disabled or
    /// failed.
    pub spoken_audio: String,
}
