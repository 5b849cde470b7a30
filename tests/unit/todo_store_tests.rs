//! Unit tests for the JSON-file to-do store.

use agent_parley::capabilities::todo::{JsonFileTodoStore, TodoStore};

#[tokio::test]
async fn empty_store_lists_no_tasks() {
    let temp = tempfile::tempdir().expect("tempdir");
    let store = JsonFileTodoStore::new(temp.path().join("todo.json"));

    let tasks = store.tasks().await.expect("read");
    assert!(tasks.is_empty());
}

#[tokio::test]
async fn appended_tasks_round_trip_in_order() {
    let temp = tempfile::tempdir().expect("tempdir");
    let store = JsonFileTodoStore::new(temp.path().join("todo.json"));

    store.append("Buy milk").await.expect("append");
    store.append("Call mom").await.expect("append");

    let tasks = store.tasks().await.expect("read");
    let texts: Vec<&str> = tasks.iter().map(|item| item.task.as_str()).collect();
    assert_eq!(texts, ["Buy milk", "Call mom"]);
}

#[tokio::test]
async fn append_creates_missing_parent_directories() {
    let temp = tempfile::tempdir().expect("tempdir");
    let store = JsonFileTodoStore::new(temp.path().join("nested/deep/todo.json"));

    store.append("Water plants").await.expect("append");
    assert_eq!(store.tasks().await.expect("read").len(), 1);
}

#[tokio::test]
async fn corrupt_file_surfaces_an_error() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("todo.json");
    std::fs::write(&path, "not json at all").expect("write");

    let store = JsonFileTodoStore::new(path);
    assert!(store.tasks().await.is_err());
}
