// ABOUTME: Body-text extraction with selector, <article>, <main> and class-pattern div fallbacks.
// ABOUTME: Output is always whitespace-normalized; empty only when no strategy found any text.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;

use crate::extractors::select::{resolve, select_all, select_first};
use crate::extractors::{non_empty, FallbackChain};
use crate::text::{element_text, normalize_whitespace};

/// Class values that mark a div as a likely content container.
static CONTENT_CLASS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)content|post|article").expect("valid content class regex"));

/// Text of every element matched by the selector list, joined by single spaces.
///
/// Unlike the title, all matches of the winning piece contribute. Elements
/// with no text are skipped.
pub fn from_selector(doc: &Html, selector: &str) -> Option<String> {
    let parts: Vec<String> = resolve(doc, selector)
        .iter()
        .map(element_text)
        .filter(|text| !text.is_empty())
        .collect();
    non_empty(parts.join(" "))
}

/// Text of the first `<article>`.
pub fn from_article(doc: &Html) -> Option<String> {
    select_first(doc, "article").and_then(|el| non_empty(element_text(&el)))
}

/// Text of the first `<main>`.
pub fn from_main(doc: &Html) -> Option<String> {
    select_first(doc, "main").and_then(|el| non_empty(element_text(&el)))
}

/// Text of the longest `<div>` whose class matches `content|post|article`.
///
/// Ties keep the earliest div in document order.
pub fn from_content_divs(doc: &Html) -> Option<String> {
    let mut best = String::new();
    let mut best_len = 0usize;
    for div in select_all(doc, "div[class]") {
        let class = div.value().attr("class").unwrap_or_default();
        if !CONTENT_CLASS_RE.is_match(class) {
            continue;
        }
        let text = element_text(&div);
        let len = text.chars().count();
        if len > best_len {
            best_len = len;
            best = text;
        }
    }
    non_empty(best)
}

/// Extracts the main body text of a page. May return the empty string.
pub fn extract_content(doc: &Html, selector: &str) -> String {
    let raw = FallbackChain::new("content")
        .step("selector", |doc: &Html| from_selector(doc, selector))
        .step("article", from_article)
        .step("main", from_main)
        .step("content_divs", from_content_divs)
        .run(doc)
        .unwrap_or_default();
    normalize_whitespace(&raw)
}
