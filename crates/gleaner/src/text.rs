// ABOUTME: Text normalization helpers shared by the field extractors and display code.
// ABOUTME: Collapses whitespace runs, gathers element text, and truncates strings for table display.

use scraper::ElementRef;

/// Collapses every run of whitespace (including newlines) into a single space and trims both ends.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Returns the element's descendant text, normalized.
///
/// Text nodes are concatenated as they appear, so inline markup such as
/// `Rust<em>acean</em>` reads as one word.
pub fn element_text(el: &ElementRef<'_>) -> String {
    normalize_whitespace(&el.text().collect::<String>())
}

/// Cuts `s` to at most `max` characters, appending "..." when anything was dropped.
pub fn truncate_display(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max).collect();
    out.push_str("...");
    out
}
