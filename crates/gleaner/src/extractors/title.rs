// ABOUTME: Title extraction with a fallback chain ending in the URL's host name.
// ABOUTME: Order: caller selector list, <title>, first <h1>, og:title meta, URL host.

use scraper::Html;
use url::Url;

use crate::extractors::select::{resolve, select_first};
use crate::extractors::{non_empty, FallbackChain};
use crate::text::{element_text, normalize_whitespace};

/// Text of the first element matched by the selector list.
///
/// Only the first element of the winning piece is consulted; if its text is
/// empty the step yields nothing rather than trying the next piece.
pub fn from_selector(doc: &Html, selector: &str) -> Option<String> {
    resolve(doc, selector)
        .first()
        .and_then(|el| non_empty(element_text(el)))
}

/// Text of the document's `<title>`.
pub fn from_title_tag(doc: &Html) -> Option<String> {
    select_first(doc, "title").and_then(|el| non_empty(element_text(&el)))
}

/// Text of the first `<h1>`.
pub fn from_first_h1(doc: &Html) -> Option<String> {
    select_first(doc, "h1").and_then(|el| non_empty(element_text(&el)))
}

/// `content` of the `og:title` meta tag.
pub fn from_og_title(doc: &Html) -> Option<String> {
    select_first(doc, "meta[property='og:title']")
        .and_then(|el| el.value().attr("content"))
        .and_then(|content| non_empty(normalize_whitespace(content)))
}

/// Host name of `url`, or the trimmed URL itself when it has no host.
pub fn from_url(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .filter(|host| !host.is_empty())
        .unwrap_or_else(|| url.trim().to_string())
}

/// Extracts a page title. Never fails; non-empty for any URL with a host.
pub fn extract_title(doc: &Html, selector: &str, url: &str) -> String {
    FallbackChain::new("title")
        .step("selector", |doc: &Html| from_selector(doc, selector))
        .step("title_tag", from_title_tag)
        .step("h1", from_first_h1)
        .step("og_title", from_og_title)
        .run(doc)
        .unwrap_or_else(|| from_url(url))
}
