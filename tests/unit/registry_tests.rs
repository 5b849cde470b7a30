//! Unit tests for capability resolution and sensitivity flags.

use std::sync::Arc;

use agent_parley::capabilities::clock::CheckSystemTime;
use agent_parley::capabilities::todo::{JsonFileTodoStore, UpdateTodoList};
use agent_parley::capabilities::CapabilityRegistry;

fn registry() -> CapabilityRegistry {
    let temp = tempfile::tempdir().expect("tempdir");
    let store = Arc::new(JsonFileTodoStore::new(temp.path().join("todo.json")));

    let mut registry = CapabilityRegistry::new();
    registry.register(Arc::new(CheckSystemTime));
    registry.register(Arc::new(UpdateTodoList::new(store)));
    registry
}

#[test]
fn known_names_resolve() {
    let registry = registry();
    assert!(registry.resolve("check_system_time").is_some());
    assert!(registry.resolve("update_to_do_list").is_some());
}

#[test]
fn unknown_names_do_not_resolve() {
    assert!(registry().resolve("get_battlefield_data").is_none());
}

#[test]
fn sensitivity_flags() {
    let registry = registry();
    assert!(registry.is_sensitive("update_to_do_list"));
    assert!(!registry.is_sensitive("check_system_time"));
    // Unknown capabilities never execute, so they are not sensitive either.
    assert!(!registry.is_sensitive("no_such_capability"));
}

#[test]
fn manifest_lists_every_capability_with_schema() {
    let manifest = registry().manifest();
    assert_eq!(manifest.len(), 2);

    let todo = manifest
        .iter()
        .find(|entry| entry.name == "update_to_do_list")
        .expect("todo capability in manifest");
    assert!(todo.description.contains("to-do list"));
    assert_eq!(todo.parameters["required"], serde_json::json!(["task"]));
}

#[test]
fn registering_twice_replaces() {
    let mut registry = registry();
    registry.register(Arc::new(CheckSystemTime));
    assert_eq!(registry.names().len(), 2);
}
