// ABOUTME: Publish-date extraction over a fixed list of meta, time and class selectors.
// ABOUTME: Returns the raw value as found; no parsing and no default date.

use scraper::{ElementRef, Html};

use crate::extractors::select::select_first;
use crate::extractors::{non_empty, FallbackChain};
use crate::text::element_text;

/// Date sources in priority order.
pub const DATE_SELECTORS: &[&str] = &[
    "meta[property='article:published_time']",
    "meta[name='publish_date']",
    "meta[name='date']",
    "time[datetime]",
    ".date",
    ".published",
    ".post-date",
];

/// Reads a date from an element: `content` for meta tags, otherwise the
/// `datetime` attribute with the element text as fallback.
fn date_value(el: &ElementRef<'_>) -> Option<String> {
    if el.value().name().eq_ignore_ascii_case("meta") {
        return el
            .value()
            .attr("content")
            .and_then(|v| non_empty(v.trim().to_string()));
    }
    el.value()
        .attr("datetime")
        .and_then(|v| non_empty(v.trim().to_string()))
        .or_else(|| non_empty(element_text(el)))
}

/// Date from the first element matching `css`, if that element carries one.
pub fn from_selector(doc: &Html, css: &str) -> Option<String> {
    select_first(doc, css).and_then(|el| date_value(&el))
}

/// Extracts the publish date as a raw string, or the empty string.
pub fn extract_date(doc: &Html) -> String {
    DATE_SELECTORS
        .iter()
        .fold(FallbackChain::new("date"), |chain, &css| {
            chain.step(css, move |doc: &Html| from_selector(doc, css))
        })
        .run(doc)
        .unwrap_or_default()
}
