//! Removal of `<think>...</think>` reasoning traces from model output.

use std::sync::LazyLock;

use regex::Regex;

/// Everything up to and including the last `</think>`, plus the line breaks after it.
static REASONING_TRACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\A.*</think>[\r\n]*").expect("Invalid regex"));

/// Return the text after the last `</think>` marker, or the input unchanged
/// when there is no marker.
pub fn strip_reasoning_trace(text: &str) -> String {
    REASONING_TRACE.replace(text, "").into_owned()
}
