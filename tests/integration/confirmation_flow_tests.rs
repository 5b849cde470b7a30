//! Integration tests for the confirmation interrupt/resume protocol.
//!
//! Validates the end-to-end flow:
//! 1. Sensitive request → engine suspends with the localized prompt
//! 2. Resume `yes` → exactly the pending capability executes
//! 3. Decline / alert override → capability skipped
//! 4. No timeout: a suspended thread stays resumable indefinitely

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use agent_parley::capabilities::todo::{TodoItem, TodoStore};
use agent_parley::checkpoint::CheckpointStore;
use agent_parley::config::AppConfig;
use agent_parley::models::entry::{CapabilityRequest, Entry};
use agent_parley::models::state::TokenUsage;
use agent_parley::models::thread::ThreadHandle;
use agent_parley::models::turn::{Language, Sender};
use agent_parley::reasoning::scripted::ScriptedReasoner;
use agent_parley::reasoning::{Decision, ReasoningEngine};
use agent_parley::session::SessionManager;
use agent_parley::speech::DisabledSpeech;

#[derive(Default)]
struct RecordingTodoStore {
    tasks: Mutex<Vec<String>>,
}

impl RecordingTodoStore {
    fn recorded(&self) -> Vec<String> {
        self.tasks.lock().map(|tasks| tasks.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl TodoStore for RecordingTodoStore {
    async fn append(&self, task: &str) -> agent_parley::Result<()> {
        if let Ok(mut tasks) = self.tasks.lock() {
            tasks.push(task.to_owned());
        }
        Ok(())
    }

    async fn tasks(&self) -> agent_parley::Result<Vec<TodoItem>> {
        Ok(self
            .recorded()
            .into_iter()
            .map(|task| TodoItem {
                task,
                added_at: Utc::now(),
            })
            .collect())
    }
}

fn test_config() -> AppConfig {
    AppConfig::from_toml_str(
        r#"
logging = false

[model]
name = "scripted"
"#,
    )
    .expect("valid config")
}

struct Harness {
    manager: SessionManager,
    store: CheckpointStore,
    reasoner: Arc<ScriptedReasoner>,
    todos: Arc<RecordingTodoStore>,
}

async fn harness(decisions: Vec<Decision>) -> Harness {
    let store = CheckpointStore::connect_memory().await.expect("store");
    let reasoner = Arc::new(ScriptedReasoner::with_script(decisions));
    let todos = Arc::new(RecordingTodoStore::default());
    let manager = SessionManager::assemble(
        &test_config(),
        store.clone(),
        Arc::clone(&reasoner) as Arc<dyn ReasoningEngine>,
        Arc::new(DisabledSpeech),
        Arc::clone(&todos) as Arc<dyn TodoStore>,
    )
    .await
    .expect("manager");

    Harness {
        manager,
        store,
        reasoner,
        todos,
    }
}

fn usage() -> TokenUsage {
    TokenUsage {
        input_tokens: 12,
        output_tokens: 4,
    }
}

fn say(text: &str) -> Decision {
    Decision {
        entry: Entry::assistant(text),
        usage: usage(),
    }
}

fn todo_request(task: &str) -> Decision {
    Decision {
        entry: Entry::assistant_with_requests(
            "",
            vec![CapabilityRequest {
                name: "update_to_do_list".into(),
                arguments: serde_json::json!({ "task": task }),
                call_id: "call-1".into(),
            }],
        ),
        usage: usage(),
    }
}

#[tokio::test]
async fn sensitive_request_suspends_with_localized_prompt() {
    let h = harness(vec![todo_request("Buy milk")]).await;

    let reply = h
        .manager
        .process_message("Add buy milk to my list", Language::En, Sender::Human)
        .await
        .expect("turn");

    assert!(reply
        .assistant_text
        .contains("Double confirmation required"));
    assert!(reply.spoken_text.contains("Double confirmation required"));
    assert!(h.todos.recorded().is_empty());
    assert!(reply.used_capabilities.is_empty());

    // The suspension is durable: the prompt is derivable from the latest
    // checkpoint record.
    let thread = h.manager.session().thread().await;
    let pending = h.store.pending_interrupt(&thread).await.expect("query");
    assert!(pending.expect("pending").contains("Double confirmation required"));
}

#[tokio::test]
async fn resume_yes_executes_exactly_the_pending_capability() {
    let h = harness(vec![todo_request("Buy milk"), say("Saved it.")]).await;

    h.manager
        .process_message("Add buy milk", Language::En, Sender::Human)
        .await
        .expect("first turn");

    let reply = h
        .manager
        .process_message("yes", Language::En, Sender::Human)
        .await
        .expect("resume turn");

    assert!(reply
        .tool_text
        .contains("To-do list updated with task Buy milk"));
    assert_eq!(h.todos.recorded(), vec!["Buy milk"]);
    assert_eq!(
        reply.used_capabilities,
        vec![Some("update_to_do_list".to_owned())]
    );
    assert!(reply.assistant_text.contains("Saved it."));

    // No duplicate decide cycle was inserted before the dispatch resume:
    // one decision before the suspension, one after the capability ran.
    assert_eq!(h.reasoner.seen_contexts().len(), 2);
}

#[tokio::test]
async fn confirmation_token_is_case_insensitive() {
    let h = harness(vec![todo_request("Buy milk"), say("Done.")]).await;

    h.manager
        .process_message("Add buy milk", Language::En, Sender::Human)
        .await
        .expect("first turn");
    let reply = h
        .manager
        .process_message("YES", Language::En, Sender::Human)
        .await
        .expect("resume turn");

    assert_eq!(h.todos.recorded(), vec!["Buy milk"]);
    assert!(reply.tool_text.contains("To-do list updated"));
}

#[tokio::test]
async fn declined_confirmation_skips_the_capability() {
    let h = harness(vec![todo_request("Buy milk"), say("Understood.")]).await;

    h.manager
        .process_message("Add buy milk", Language::En, Sender::Human)
        .await
        .expect("first turn");
    let reply = h
        .manager
        .process_message("no thanks", Language::En, Sender::Human)
        .await
        .expect("resume turn");

    assert!(reply.tool_text.contains("The user cancelled the execution."));
    assert!(h.todos.recorded().is_empty());
    assert!(reply.used_capabilities.is_empty());
}

#[tokio::test]
async fn alert_marker_overrides_an_affirmative_resume() {
    let h = harness(vec![todo_request("Buy milk"), say("Alert noted.")]).await;

    h.manager
        .process_message("Add buy milk", Language::En, Sender::Human)
        .await
        .expect("first turn");
    // "yes" is present, but the alert marker takes precedence.
    let reply = h
        .manager
        .process_message("yes [ALERT] evacuate now", Language::En, Sender::Human)
        .await
        .expect("resume turn");

    assert!(reply
        .tool_text
        .contains("An alert interrupted the tool calling."));
    assert!(h.todos.recorded().is_empty());
}

#[tokio::test]
async fn alert_marker_is_case_insensitive() {
    let h = harness(vec![todo_request("Buy milk"), say("Alert noted.")]).await;

    h.manager
        .process_message("Add buy milk", Language::En, Sender::Human)
        .await
        .expect("first turn");
    let reply = h
        .manager
        .process_message("[Alert] fire drill", Language::En, Sender::Human)
        .await
        .expect("resume turn");

    assert!(reply
        .tool_text
        .contains("An alert interrupted the tool calling."));
}

#[tokio::test]
async fn spanish_sessions_get_the_spanish_prompt() {
    let h = harness(vec![todo_request("Comprar leche")]).await;

    let reply = h
        .manager
        .process_message("Agrega comprar leche", Language::Es, Sender::Human)
        .await
        .expect("turn");

    assert!(reply.assistant_text.contains("doble confirmaci"));
}

#[tokio::test]
async fn capability_failure_becomes_a_generic_tool_entry() {
    // The request is missing its required `task` argument, so the
    // capability itself errors after confirmation.
    let broken = Decision {
        entry: Entry::assistant_with_requests(
            "",
            vec![CapabilityRequest {
                name: "update_to_do_list".into(),
                arguments: serde_json::json!({}),
                call_id: "call-1".into(),
            }],
        ),
        usage: usage(),
    };
    let h = harness(vec![broken, say("Something went wrong.")]).await;

    h.manager
        .process_message("Add a task", Language::En, Sender::Human)
        .await
        .expect("first turn");
    let reply = h
        .manager
        .process_message("yes", Language::En, Sender::Human)
        .await
        .expect("resume turn");

    assert!(reply.tool_text.contains("The capability execution failed."));
    assert!(h.todos.recorded().is_empty());
}

#[tokio::test]
async fn suspended_thread_has_no_deadline() {
    let h = harness(vec![todo_request("Buy milk"), say("Saved.")]).await;

    h.manager
        .process_message("Add buy milk", Language::En, Sender::Human)
        .await
        .expect("first turn");

    // Arbitrary unrelated store activity while the confirmation is pending.
    let other = ThreadHandle::from_key("thread-other");
    for _ in 0..5 {
        h.store
            .save(&other, "decide", &agent_parley::models::state::ConversationState::default(), None)
            .await
            .expect("unrelated save");
    }

    let reply = h
        .manager
        .process_message("yes", Language::En, Sender::Human)
        .await
        .expect("resume turn");
    assert_eq!(h.todos.recorded(), vec!["Buy milk"]);
    assert!(reply.tool_text.contains("To-do list updated"));
}
