//! Display and speech text filters applied to assistant output before it
//! leaves the session.

use regex::Regex;
use tracing::warn;

/// Strip `<think>` blocks from reasoning output.
fn strip_think_blocks(text: &str) -> String {
    match Regex::new(r"(?s)<think>.*?</think>") {
        Ok(re) => re.replace_all(text, "").to_string(),
        Err(err) => {
            warn!(%err, "think-block pattern failed to compile");
            text.to_owned()
        }
    }
}

/// Drop CJK ideographs while keeping other non-ASCII text (accented letters
/// and so on); some models leak them into otherwise-localized output.
fn filter_cjk(text: &str) -> String {
    text.chars().filter(|c| !is_cjk(*c)).collect()
}

fn is_cjk(c: char) -> bool {
    matches!(
        c,
        '\u{4e00}'..='\u{9fff}' | '\u{3400}'..='\u{4dbf}' | '\u{f900}'..='\u{faff}'
    )
}

/// Clean assistant markdown for display.
///
/// Promotes two-space list items to a four-space indent so clients render
/// them as nested lists, strips `<think>` blocks unless `keep_think` is set,
/// and filters CJK leakage.
#[must_use]
pub fn display_text(text: &str, keep_think: bool) -> String {
    let mut cleaned = filter_cjk(text);

    cleaned = match Regex::new(r"(?m)^  -") {
        Ok(re) => re.replace_all(&cleaned, "    -").to_string(),
        Err(err) => {
            warn!(%err, "list-promotion pattern failed to compile");
            cleaned
        }
    };

    if !keep_think {
        cleaned = strip_think_blocks(&cleaned);
    }

    cleaned.trim().to_owned()
}

/// Clean text for speech synthesis: no think blocks, no markdown emphasis
/// markers, no warning/stop pictographs.
#[must_use]
pub fn speech_text(text: &str) -> String {
    strip_think_blocks(text)
        .replace('*', "")
        .replace("\u{26a0}\u{fe0f}", "")
        .replace('\u{1f6d1}', "")
        .trim()
        .to_owned()
}
