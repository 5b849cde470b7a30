//! To-do-list capability and its persistence collaborator.
//!
//! The list format lives behind [`TodoStore`] so the backing store can be
//! swapped without touching the engine; the default implementation appends
//! to a JSON document on disk.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::models::entry::{CapabilityRequest, Entry};
use crate::models::state::StatePatch;
use crate::{AppError, Result};

use super::{Capability, ScratchContext};

/// Scratch slot holding the most recently recorded task.
pub const LAST_TASK_SLOT: &str = "last_task";

/// One persisted to-do item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct TodoItem {
    /// Task text as dictated.
    pub task: String,
    /// When the task was recorded.
    pub added_at: DateTime<Utc>,
}

/// Persistence boundary for the to-do list.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Append a task to the list.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if the list cannot be persisted.
    async fn append(&self, task: &str) -> Result<()>;

    /// All recorded tasks, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if the list cannot be read.
    async fn tasks(&self) -> Result<Vec<TodoItem>>;
}

/// JSON-document store: the whole list lives in one file, rewritten on each
/// append.
pub struct JsonFileTodoStore {
    path: PathBuf,
}

impl JsonFileTodoStore {
    /// Create a store backed by the given file path.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    async fn read_items(&self) -> Result<Vec<TodoItem>> {
        match fs::read_to_string(&self.path).await {
            Ok(raw) => serde_json::from_str(&raw)
                .map_err(|err| AppError::Io(format!("corrupt to-do list: {err}"))),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(AppError::Io(format!("failed to read to-do list: {err}"))),
        }
    }
}

#[async_trait]
impl TodoStore for JsonFileTodoStore {
    async fn append(&self, task: &str) -> Result<()> {
        let mut items = self.read_items().await?;
        items.push(TodoItem {
            task: task.to_owned(),
            added_at: Utc::now(),
        });

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|err| AppError::Io(format!("failed to create to-do dir: {err}")))?;
        }

        let raw = serde_json::to_string_pretty(&items)
            .map_err(|err| AppError::Io(format!("failed to encode to-do list: {err}")))?;
        fs::write(&self.path, raw)
            .await
            .map_err(|err| AppError::Io(format!("failed to write to-do list: {err}")))
    }

    async fn tasks(&self) -> Result<Vec<TodoItem>> {
        self.read_items().await
    }
}

/// Records a task on the to-do list. Sensitive: execution pauses for
/// explicit confirmation.
pub struct UpdateTodoList {
    store: std::sync::Arc<dyn TodoStore>,
}

impl UpdateTodoList {
    /// Create the capability over the given store.
    #[must_use]
    pub fn new(store: std::sync::Arc<dyn TodoStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Capability for UpdateTodoList {
    fn name(&self) -> &str {
        "update_to_do_list"
    }

    fn description(&self) -> &str {
        "Use this capability to update the to-do list with a new task. Arguments: task (for example 'Buy milk'). Output: confirmation of the task saved."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "task": {
                    "type": "string",
                    "description": "Task to record, e.g. 'Buy milk'"
                }
            },
            "required": ["task"]
        })
    }

    fn sensitive(&self) -> bool {
        true
    }

    async fn invoke(
        &self,
        request: &CapabilityRequest,
        _context: &ScratchContext,
    ) -> Result<StatePatch> {
        let task = request
            .arguments
            .get("task")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| AppError::Capability("missing 'task' argument".into()))?;

        self.store
            .append(task)
            .await
            .map_err(|err| AppError::Capability(format!("to-do store append failed: {err}")))?;

        let content = format!("To-do list updated with task {task}");

        Ok(StatePatch::message(Entry::tool(content, request.call_id.as_str()))
            .with_scratch(LAST_TASK_SLOT, serde_json::Value::String(task.to_owned()))
            .with_tool_used(self.name()))
    }
}
