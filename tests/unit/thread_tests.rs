//! Unit tests for the thread handle.

use std::thread::sleep;
use std::time::Duration;

use agent_parley::models::thread::ThreadHandle;

#[test]
fn minted_handles_carry_the_thread_prefix() {
    let handle = ThreadHandle::mint();
    assert!(handle.as_str().starts_with("thread-"));
}

#[test]
fn consecutive_mints_differ() {
    let first = ThreadHandle::mint();
    sleep(Duration::from_millis(5));
    let second = ThreadHandle::mint();
    assert_ne!(first, second);
}

#[test]
fn display_matches_key() {
    let handle = ThreadHandle::from_key("thread-20250101_120000_000");
    assert_eq!(handle.to_string(), handle.as_str());
}

#[test]
fn from_key_round_trips() {
    let handle = ThreadHandle::mint();
    let rebuilt = ThreadHandle::from_key(handle.as_str());
    assert_eq!(handle, rebuilt);
}
