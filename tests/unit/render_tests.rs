//! Unit tests for the display and speech text filters.

use agent_parley::session::render::{display_text, speech_text};

#[test]
fn think_blocks_are_stripped_for_display() {
    let raw = "Sure.<think>internal chain of thought</think> Here you go.";
    let cleaned = display_text(raw, false);
    assert!(!cleaned.contains("internal chain of thought"));
    assert!(cleaned.contains("Here you go."));
}

#[test]
fn think_blocks_survive_when_verbose() {
    let raw = "Sure.<think>reasoning</think>";
    let cleaned = display_text(raw, true);
    assert!(cleaned.contains("<think>reasoning</think>"));
}

#[test]
fn multiline_think_blocks_are_stripped() {
    let raw = "Answer.<think>line one\nline two\nline three</think>";
    assert_eq!(display_text(raw, false), "Answer.");
}

#[test]
fn cjk_characters_are_filtered_but_accents_kept() {
    let raw = "Hola 你好 señor 测试!";
    let cleaned = display_text(raw, false);
    assert_eq!(cleaned, "Hola  señor !");
}

#[test]
fn two_space_list_items_are_promoted() {
    let raw = "Options:\n  - first\n  - second";
    let cleaned = display_text(raw, false);
    assert!(cleaned.contains("    - first"));
    assert!(cleaned.contains("    - second"));
}

#[test]
fn speech_text_removes_markup_and_markers() {
    let raw = "<think>plan</think>\u{26a0}\u{fe0f} **Important**: buy milk \u{1f6d1}";
    let spoken = speech_text(raw);
    assert_eq!(spoken, "Important: buy milk");
}

#[test]
fn speech_text_of_blank_input_is_empty() {
    assert!(speech_text("   \n").is_empty());
}

#[test]
fn display_text_trims_surrounding_whitespace() {
    assert_eq!(display_text("\n  hello  \n", false), "hello");
}
