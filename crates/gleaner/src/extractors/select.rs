// ABOUTME: Selector-list resolution over a parsed document plus a compiled selector cache.
// ABOUTME: Pieces of a comma-separated list are tried in order; the first piece with matches wins.

//! Selector resolution.
//!
//! A selector list such as `"h1, .title, .post-title"` is a priority list,
//! not a CSS union: pieces are tried left to right and the match set of the
//! first piece that matches anything is returned on its own. Matches from
//! later pieces are never merged in.
//!
//! Pieces that fail to parse are treated as matching nothing.

use std::collections::HashMap;
use std::sync::RwLock;

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

/// Upper bound on cached selectors. Keys come from user input, so once full
/// new selectors are compiled per call instead of cached.
const MAX_CACHED_SELECTORS: usize = 512;

/// Thread-safe cache of compiled CSS selectors, including failed compilations.
static SELECTOR_CACHE: Lazy<RwLock<HashMap<String, Option<Selector>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Gets or compiles a CSS selector, caching the result.
///
/// Returns `None` for selectors that do not parse.
pub fn get_or_compile(css: &str) -> Option<Selector> {
    if let Ok(cache) = SELECTOR_CACHE.read() {
        if let Some(cached) = cache.get(css) {
            return cached.clone();
        }
    }

    let compiled = Selector::parse(css).ok();
    if let Ok(mut cache) = SELECTOR_CACHE.write() {
        if cache.len() < MAX_CACHED_SELECTORS {
            cache
                .entry(css.to_string())
                .or_insert_with(|| compiled.clone());
        }
    }
    compiled
}

/// Splits a selector list on commas, trimming pieces and dropping empty ones.
pub fn split_selector_list(list: &str) -> Vec<&str> {
    list.split(',')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect()
}

/// Returns the match set of the first piece of `list` that matches anything.
///
/// An empty list, or one where no piece matches, yields an empty vec.
pub fn resolve<'a>(doc: &'a Html, list: &str) -> Vec<ElementRef<'a>> {
    for piece in split_selector_list(list) {
        let Some(selector) = get_or_compile(piece) else {
            tracing::debug!(selector = piece, "skipping unparseable selector");
            continue;
        };
        let matches: Vec<ElementRef<'a>> = doc.select(&selector).collect();
        if !matches.is_empty() {
            return matches;
        }
    }
    Vec::new()
}

/// Returns the first element matching a single selector.
pub fn select_first<'a>(doc: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let selector = get_or_compile(css)?;
    doc.select(&selector).next()
}

/// Returns every element matching a single selector, in document order.
pub fn select_all<'a>(doc: &'a Html, css: &str) -> Vec<ElementRef<'a>> {
    match get_or_compile(css) {
        Some(selector) => doc.select(&selector).collect(),
        None => Vec::new(),
    }
}
