//! Response Cleaner — strips lightweight markdown from model output for plain-text display.

use once_cell::sync::Lazy;
use regex::Regex;

static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("valid bold regex"));
static ITALIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*(.*?)\*").expect("valid italic regex"));
static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^#+\s*").expect("valid heading regex"));

/// Removes `**bold**` and `*italic*` markers, then leading `#` heading markers on every line.
///
/// Each pass is a single non-greedy left-to-right substitution: for nested or unbalanced
/// markers the first matching pair wins. `.` never crosses a newline, but the whitespace after
/// a heading marker may.
pub fn clean(raw: &str) -> String {
    let text = BOLD.replace_all(raw, "${1}");
    let text = ITALIC.replace_all(&text, "${1}");
    HEADING.replace_all(&text, "").into_owned()
}
