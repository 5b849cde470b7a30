//! Integration tests for the checkpoint store contract.

use agent_parley::checkpoint::CheckpointStore;
use agent_parley::models::entry::Entry;
use agent_parley::models::state::{ConversationState, StatePatch};
use agent_parley::models::thread::ThreadHandle;

fn state_with(messages: &[&str]) -> ConversationState {
    let mut state = ConversationState::default();
    for message in messages {
        state.apply(StatePatch::message(Entry::human(*message)));
    }
    state
}

#[tokio::test]
async fn records_get_sequential_numbers_per_thread() {
    let store = CheckpointStore::connect_memory().await.expect("store");
    let thread = ThreadHandle::from_key("thread-a");

    for step in 0..3 {
        store
            .save(&thread, "decide", &state_with(&[&format!("m{step}")]), None)
            .await
            .expect("save");
    }

    let history = store.history(&thread).await.expect("history");
    let seqs: Vec<i64> = history.iter().map(|record| record.seq).collect();
    assert_eq!(seqs, [1, 2, 3]);
}

#[tokio::test]
async fn threads_do_not_interfere() {
    let store = CheckpointStore::connect_memory().await.expect("store");
    let a = ThreadHandle::from_key("thread-a");
    let b = ThreadHandle::from_key("thread-b");

    store
        .save(&a, "decide", &state_with(&["for a"]), None)
        .await
        .expect("save a");
    store
        .save(&b, "decide", &state_with(&["for b"]), None)
        .await
        .expect("save b");
    store
        .save(&b, "respond", &state_with(&["for b", "more b"]), None)
        .await
        .expect("save b2");

    assert_eq!(store.history(&a).await.expect("history").len(), 1);
    assert_eq!(store.history(&b).await.expect("history").len(), 2);

    let latest_a = store.load_latest(&a).await.expect("load").expect("state");
    assert_eq!(latest_a.messages[0].content, "for a");
}

#[tokio::test]
async fn load_latest_returns_none_for_unknown_threads() {
    let store = CheckpointStore::connect_memory().await.expect("store");
    let thread = ThreadHandle::from_key("thread-missing");

    assert!(store.load_latest(&thread).await.expect("load").is_none());
    assert!(store
        .pending_interrupt(&thread)
        .await
        .expect("query")
        .is_none());
}

#[tokio::test]
async fn pending_interrupt_tracks_only_the_latest_record() {
    let store = CheckpointStore::connect_memory().await.expect("store");
    let thread = ThreadHandle::from_key("thread-a");

    store
        .save(&thread, "decide", &state_with(&["m"]), None)
        .await
        .expect("save");
    assert!(store
        .pending_interrupt(&thread)
        .await
        .expect("query")
        .is_none());

    store
        .save(&thread, "dispatch", &state_with(&["m"]), Some("confirm?"))
        .await
        .expect("save suspend");
    assert_eq!(
        store.pending_interrupt(&thread).await.expect("query"),
        Some("confirm?".to_owned())
    );

    // A later record without a prompt resolves the interrupt.
    store
        .save(&thread, "dispatch", &state_with(&["m", "tool"]), None)
        .await
        .expect("save resume");
    assert!(store
        .pending_interrupt(&thread)
        .await
        .expect("query")
        .is_none());
}

#[tokio::test]
async fn history_keeps_every_snapshot_oldest_first() {
    let store = CheckpointStore::connect_memory().await.expect("store");
    let thread = ThreadHandle::from_key("thread-a");

    store
        .save(&thread, "decide", &state_with(&["one"]), None)
        .await
        .expect("save");
    store
        .save(&thread, "respond", &state_with(&["one", "two"]), None)
        .await
        .expect("save");

    let history = store.history(&thread).await.expect("history");
    assert_eq!(history[0].state.messages.len(), 1);
    assert_eq!(history[1].state.messages.len(), 2);
    assert_eq!(history[0].node, "decide");
    assert_eq!(history[1].node, "respond");
}
