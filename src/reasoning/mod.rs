//! Reasoning-collaborator boundary: the engine that decides what to say or
//! which capability to request, and the condensation pass that produces
//! speech-ready text.

pub mod openai;
pub mod prompts;
pub mod scripted;

use async_trait::async_trait;

use crate::capabilities::ManifestEntry;
use crate::models::entry::Entry;
use crate::models::state::TokenUsage;
use crate::models::turn::Language;
use crate::Result;

/// Outcome of one decide-step invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    /// The assistant entry to append, optionally carrying capability
    /// requests.
    pub entry: Entry,
    /// Token usage of this invocation.
    pub usage: TokenUsage,
}

/// The reasoning engine.
///
/// `decide` is invoked at most once per decide step; `condense` failures are
/// caught locally by the respond node and never propagate.
#[async_trait]
pub trait ReasoningEngine: Send + Sync {
    /// Produce the next assistant entry from the context window and the
    /// capability manifest.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Reasoning` on transport or decoding failure.
    async fn decide(&self, entries: &[Entry], manifest: &[ManifestEntry]) -> Result<Decision>;

    /// Condense raw assistant text into a speech-ready rendering of at most
    /// roughly one hundred words, stripped of markup.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Reasoning` on transport or decoding failure.
    async fn condense(&self, text: &str, language: Language) -> Result<String>;
}
