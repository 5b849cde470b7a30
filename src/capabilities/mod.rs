//! Capability layer: the named, invocable actions the reasoning engine may
//! request, and the registry that resolves them.
//!
//! Capabilities are pure with respect to the orchestration loop: they receive
//! the request arguments plus a read-only view of the conversation's scratch
//! slots, and return a state patch. They must not suspend and must not touch
//! the checkpoint store.

pub mod clock;
pub mod todo;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::models::entry::CapabilityRequest;
use crate::models::state::StatePatch;
use crate::Result;

/// Read-only view of the conversation's scratch slots, passed to every
/// invocation as auxiliary context.
pub type ScratchContext = BTreeMap<String, serde_json::Value>;

/// An invocable action.
#[async_trait]
pub trait Capability: Send + Sync {
    /// Capability name as requested by the reasoning engine.
    fn name(&self) -> &str;

    /// Description shown to the reasoning engine.
    fn description(&self) -> &str;

    /// JSON Schema of the accepted arguments.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Whether execution requires explicit human confirmation.
    fn sensitive(&self) -> bool {
        false
    }

    /// Execute the capability and return the state patch to merge.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Capability` on any execution failure; the dispatch
    /// node converts this into a generic failure tool entry.
    async fn invoke(
        &self,
        request: &CapabilityRequest,
        context: &ScratchContext,
    ) -> Result<StatePatch>;
}

/// Shared, boxed capability handle.
pub type BoxedCapability = Arc<dyn Capability>;

/// One capability description in the manifest handed to the reasoning
/// engine.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct ManifestEntry {
    /// Capability name.
    pub name: String,
    /// Capability description.
    pub description: String,
    /// JSON Schema of the accepted arguments.
    pub parameters: serde_json::Value,
}

/// Fixed name-to-capability mapping used by the dispatch node.
#[derive(Clone, Default)]
pub struct CapabilityRegistry {
    map: BTreeMap<String, BoxedCapability>,
}

impl CapabilityRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a capability, replacing any previous one with the same name.
    pub fn register(&mut self, capability: BoxedCapability) {
        self.map.insert(capability.name().to_owned(), capability);
    }

    /// Resolve a requested name to a capability.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<BoxedCapability> {
        self.map.get(name).cloned()
    }

    /// Whether the named capability requires confirmation before execution.
    /// Unknown names are not sensitive (they never execute at all).
    #[must_use]
    pub fn is_sensitive(&self, name: &str) -> bool {
        self.map.get(name).is_some_and(|cap| cap.sensitive())
    }

    /// Manifest of all registered capabilities for the reasoning engine.
    #[must_use]
    pub fn manifest(&self) -> Vec<ManifestEntry> {
        self.map
            .values()
            .map(|cap| ManifestEntry {
                name: cap.name().to_owned(),
                description: cap.description().to_owned(),
                parameters: cap.parameters_schema(),
            })
            .collect()
    }

    /// Registered capability names, in manifest order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.map.keys().cloned().collect()
    }
}
