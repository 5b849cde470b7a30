//! Scripted reasoning engine for tests: replays a fixed sequence of
//! decisions without any network access, and records the context it was
//! handed so tests can assert on the window the engine built.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::capabilities::ManifestEntry;
use crate::models::entry::Entry;
use crate::models::turn::Language;
use crate::{AppError, Result};

use super::{Decision, ReasoningEngine};

/// Replays queued [`Decision`]s in order.
///
/// `condense` echoes its input truncated to one hundred words, mimicking the
/// shape (not the quality) of the real condensation pass.
#[derive(Default)]
pub struct ScriptedReasoner {
    script: Mutex<VecDeque<Decision>>,
    seen_contexts: Mutex<Vec<Vec<Entry>>>,
}

impl ScriptedReasoner {
    /// Build a reasoner that replays `decisions` in order.
    #[must_use]
    pub fn with_script(decisions: Vec<Decision>) -> Self {
        Self {
            script: Mutex::new(decisions.into()),
            seen_contexts: Mutex::new(Vec::new()),
        }
    }

    /// Queue one more decision.
    pub fn push(&self, decision: Decision) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(decision);
        }
    }

    /// Context windows handed to `decide`, in call order.
    #[must_use]
    pub fn seen_contexts(&self) -> Vec<Vec<Entry>> {
        self.seen_contexts
            .lock()
            .map(|seen| seen.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ReasoningEngine for ScriptedReasoner {
    async fn decide(&self, entries: &[Entry], _manifest: &[ManifestEntry]) -> Result<Decision> {
        if let Ok(mut seen) = self.seen_contexts.lock() {
            seen.push(entries.to_vec());
        }

        self.script
            .lock()
            .map_err(|_| AppError::Reasoning("script mutex poisoned".into()))?
            .pop_front()
            .ok_or_else(|| AppError::Reasoning("script exhausted".into()))
    }

    async fn condense(&self, text: &str, _language: Language) -> Result<String> {
        let words: Vec<&str> = text.split_whitespace().take(100).collect();
        Ok(words.join(" "))
    }
}
