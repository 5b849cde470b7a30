//! Node identifiers and the typed transition commands they return.

use crate::models::state::StatePatch;

/// One node of the fixed step graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeId {
    /// Reasoning step: produce the next assistant entry.
    Decide,
    /// Capability step: execute (or gate) the requested action.
    Dispatch,
    /// Terminal step: produce the speech-ready rendering.
    Respond,
}

impl NodeId {
    /// Stable label used in checkpoint records and diagrams.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Decide => "decide",
            Self::Dispatch => "dispatch",
            Self::Respond => "respond",
        }
    }

    /// Static transition table: the nodes this node may advance to.
    /// `Respond` has no successors; it always terminates.
    #[must_use]
    pub const fn successors(self) -> &'static [Self] {
        match self {
            Self::Decide => &[Self::Dispatch, Self::Respond],
            Self::Dispatch => &[Self::Decide],
            Self::Respond => &[],
        }
    }
}

/// The explicit result of executing one node.
///
/// Suspension is an ordinary value here, not exception-like control flow:
/// a node that needs external confirmation returns `Suspend` and the engine
/// yields to the caller with the prompt.
#[derive(Debug)]
pub enum StepCommand {
    /// Merge the patch and continue at `next`.
    Advance {
        /// Destination node.
        next: NodeId,
        /// Partial state to merge before the next step.
        patch: StatePatch,
    },
    /// Yield to the caller awaiting a confirmation value; no patch is
    /// merged.
    Suspend {
        /// Prompt surfaced to the caller.
        prompt: String,
    },
    /// Merge the patch and finish the run.
    Terminate {
        /// Partial state to merge before finishing.
        patch: StatePatch,
    },
}
