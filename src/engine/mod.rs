//! Step engine: the fixed node graph that drives one conversation.

pub mod graph;
pub mod node;

pub use graph::{bounded_context_window, StepEngine, ALERT_MARKER, CONFIRMATION_TOKEN};
pub use node::{NodeId, StepCommand};
