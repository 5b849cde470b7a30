//! Unit tests for the metrics file writers.

use std::fs;

use chrono::Utc;

use agent_parley::metrics::MetricsLogger;
use agent_parley::models::entry::Entry;
use agent_parley::models::state::{ConversationState, TimelineMark, TokenUsage};

fn usage(input: u32, output: u32) -> TokenUsage {
    TokenUsage {
        input_tokens: input,
        output_tokens: output,
    }
}

#[test]
fn token_usage_csv_gets_header_and_rows() {
    let temp = tempfile::tempdir().expect("tempdir");
    let logger = MetricsLogger::new(temp.path().to_path_buf()).expect("logger");

    logger.log_token_usage(usage(10, 5)).expect("log");
    logger.log_token_usage(usage(20, 7)).expect("log");

    let raw = fs::read_to_string(temp.path().join("token_usage_log.csv")).expect("read");
    let lines: Vec<&str> = raw.lines().collect();
    assert_eq!(
        lines[0],
        "timestamp,input_tokens,output_tokens,total_tokens"
    );
    assert_eq!(lines.len(), 3);
    assert!(lines[1].ends_with(",10,5,15"));
    assert!(lines[2].ends_with(",20,7,27"));
}

#[test]
fn timeline_csv_escapes_commas_in_labels() {
    let temp = tempfile::tempdir().expect("tempdir");
    let logger = MetricsLogger::new(temp.path().to_path_buf()).expect("logger");

    logger
        .log_timeline(&[TimelineMark {
            label: "Tool Invoke Start: a,b".into(),
            at: Utc::now(),
            delta_seconds: 0.25,
        }])
        .expect("log");

    let raw = fs::read_to_string(temp.path().join("time_log.csv")).expect("read");
    assert!(raw.contains("Tool Invoke Start: a;b,0.250"));
}

#[test]
fn empty_timeline_writes_nothing() {
    let temp = tempfile::tempdir().expect("tempdir");
    let logger = MetricsLogger::new(temp.path().to_path_buf()).expect("logger");

    logger.log_timeline(&[]).expect("log");
    assert!(!temp.path().join("time_log.csv").exists());
}

#[test]
fn state_log_drops_the_transcript() {
    let temp = tempfile::tempdir().expect("tempdir");
    let logger = MetricsLogger::new(temp.path().to_path_buf()).expect("logger");

    let mut state = ConversationState::default();
    state.messages.push(Entry::human("secret transcript line"));
    state.pending_spoken_text = "spoken".into();
    logger.log_state(&state).expect("log");

    let raw = fs::read_to_string(temp.path().join("agent_state_log.jsonl")).expect("read");
    assert!(!raw.contains("secret transcript line"));
    assert!(raw.contains("spoken"));
}

#[test]
fn entries_log_one_line_per_entry() {
    let temp = tempfile::tempdir().expect("tempdir");
    let logger = MetricsLogger::new(temp.path().to_path_buf()).expect("logger");

    logger
        .log_entries(&[Entry::human("one"), Entry::assistant("two")])
        .expect("log");

    let raw = fs::read_to_string(temp.path().join("agent_messages_log.jsonl")).expect("read");
    assert_eq!(raw.lines().count(), 2);
}

#[test]
fn purge_removes_artifacts_and_keeps_the_rest() {
    let temp = tempfile::tempdir().expect("tempdir");
    let logger = MetricsLogger::new(temp.path().to_path_buf()).expect("logger");

    fs::write(temp.path().join("token_usage_log.csv"), "x").expect("write");
    fs::write(temp.path().join("step_graph.mmd"), "x").expect("write");
    fs::write(temp.path().join("turn_0.wav"), "x").expect("write");
    fs::write(temp.path().join("notes.txt"), "keep me").expect("write");

    logger.purge_artifacts().expect("purge");

    assert!(!temp.path().join("token_usage_log.csv").exists());
    assert!(!temp.path().join("step_graph.mmd").exists());
    assert!(!temp.path().join("turn_0.wav").exists());
    assert!(temp.path().join("notes.txt").exists());
}

#[test]
fn diagram_is_written() {
    let temp = tempfile::tempdir().expect("tempdir");
    let logger = MetricsLogger::new(temp.path().to_path_buf()).expect("logger");

    logger.write_diagram("graph TD\n").expect("write");
    let raw = fs::read_to_string(temp.path().join("step_graph.mmd")).expect("read");
    assert!(raw.starts_with("graph TD"));
}
