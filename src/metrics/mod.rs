//! Per-turn metrics files: token-usage CSV, step-timing CSV, and JSONL
//! state/message logs.
//!
//! All writers are append-oriented with a header written on file creation.
//! The session swallows every error from this module; metrics must never
//! affect a turn result.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::models::entry::Entry;
use crate::models::state::{ConversationState, TimelineMark, TokenUsage};
use crate::{AppError, Result};

/// Appends turn metrics under a log directory.
pub struct MetricsLogger {
    log_dir: PathBuf,
}

impl MetricsLogger {
    /// Construct a logger that stores files in `log_dir`.
    ///
    /// Creates the directory and all parents if they do not exist.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if the directory cannot be created.
    pub fn new(log_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&log_dir).map_err(|err| {
            AppError::Io(format!(
                "failed to create log directory {}: {err}",
                log_dir.display()
            ))
        })?;
        Ok(Self { log_dir })
    }

    /// Append the turn's token usage to `token_usage_log.csv`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if the append fails.
    pub fn log_token_usage(&self, usage: TokenUsage) -> Result<()> {
        let path = self.log_dir.join("token_usage_log.csv");
        let mut file = open_with_header(
            &path,
            "timestamp,input_tokens,output_tokens,total_tokens\n",
        )?;
        let total = usage.input_tokens + usage.output_tokens;
        writeln!(
            file,
            "{},{},{},{total}",
            Utc::now().format("%Y-%m-%d %H:%M:%S"),
            usage.input_tokens,
            usage.output_tokens,
        )
        .map_err(|err| AppError::Io(format!("token usage append failed: {err}")))
    }

    /// Append new timing marks to `time_log.csv`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if the append fails.
    pub fn log_timeline(&self, marks: &[TimelineMark]) -> Result<()> {
        if marks.is_empty() {
            return Ok(());
        }

        let path = self.log_dir.join("time_log.csv");
        let mut file = open_with_header(&path, "timestamp,label,delta_seconds\n")?;
        for mark in marks {
            writeln!(
                file,
                "{},{},{:.3}",
                mark.at.format("%Y-%m-%d %H:%M:%S"),
                mark.label.replace(',', ";"),
                mark.delta_seconds,
            )
            .map_err(|err| AppError::Io(format!("time log append failed: {err}")))?;
        }
        Ok(())
    }

    /// Append a state snapshot (without the transcript) to
    /// `agent_state_log.jsonl`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if serialization or the append fails.
    pub fn log_state(&self, state: &ConversationState) -> Result<()> {
        let mut value = serde_json::to_value(state)
            .map_err(|err| AppError::Io(format!("failed to encode state: {err}")))?;
        if let Some(map) = value.as_object_mut() {
            // The transcript goes to its own log; keep the state log small.
            map.remove("messages");
            map.insert(
                "timestamp".into(),
                serde_json::Value::String(Utc::now().to_rfc3339()),
            );
        }
        self.append_jsonl("agent_state_log.jsonl", &value)
    }

    /// Append this turn's new entries to `agent_messages_log.jsonl`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if serialization or the append fails.
    pub fn log_entries(&self, entries: &[Entry]) -> Result<()> {
        for entry in entries {
            let value = serde_json::json!({
                "timestamp": Utc::now().to_rfc3339(),
                "entry": entry,
            });
            self.append_jsonl("agent_messages_log.jsonl", &value)?;
        }
        Ok(())
    }

    /// Write the step-graph diagram next to the metrics files.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if the write fails.
    pub fn write_diagram(&self, mermaid: &str) -> Result<()> {
        fs::write(self.log_dir.join("step_graph.mmd"), mermaid)
            .map_err(|err| AppError::Io(format!("diagram write failed: {err}")))
    }

    /// Delete artifact files from previous sessions (logs, diagrams, audio).
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if the directory cannot be scanned.
    pub fn purge_artifacts(&self) -> Result<()> {
        let patterns = ["log", "graph", ".wav"];
        let entries = match fs::read_dir(&self.log_dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(err) => return Err(AppError::Io(format!("failed to scan log dir: {err}"))),
        };

        for entry in entries.flatten() {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().to_string();
            if path.is_file() && patterns.iter().any(|pattern| name.contains(pattern)) {
                if let Err(err) = fs::remove_file(&path) {
                    tracing::warn!(file = %path.display(), %err, "failed to delete artifact");
                }
            }
        }
        Ok(())
    }

    fn append_jsonl(&self, file_name: &str, value: &serde_json::Value) -> Result<()> {
        let path = self.log_dir.join(file_name);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|err| AppError::Io(format!("failed to open {}: {err}", path.display())))?;
        writeln!(file, "{value}")
            .map_err(|err| AppError::Io(format!("jsonl append failed: {err}")))
    }
}

/// Open a file for append, writing `header` first when the file is new.
fn open_with_header(path: &Path, header: &str) -> Result<fs::File> {
    let exists = path.exists();
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|err| AppError::Io(format!("failed to open {}: {err}", path.display())))?;
    if !exists {
        file.write_all(header.as_bytes())
            .map_err(|err| AppError::Io(format!("header write failed: {err}")))?;
    }
    Ok(file)
}
