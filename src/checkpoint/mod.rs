//! Durable checkpoint persistence keyed by conversation thread.

pub mod schema;
pub mod store;

pub use store::{CheckpointRecord, CheckpointStore};
