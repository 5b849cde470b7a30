#![forbid(unsafe_code)]

//! `agent-parley` — conversational agent orchestrator.
//!
//! Drives a multi-step reasoning/tool-use loop for a single logical
//! conversation: a fixed step graph with typed transition commands, an
//! interrupt/resume protocol that pauses sensitive actions for explicit
//! confirmation, an append-only checkpoint store keyed by conversation
//! thread, and a session wrapper enforcing single-flight turn execution.

pub mod capabilities;
pub mod checkpoint;
pub mod config;
pub mod engine;
pub mod errors;
pub mod http;
pub mod metrics;
pub mod models;
pub mod reasoning;
pub mod session;
pub mod speech;

pub use config::AppConfig;
pub use errors::{AppError, Result};
