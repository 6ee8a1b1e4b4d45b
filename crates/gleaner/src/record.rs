// ABOUTME: ScrapeTarget input and ScrapedRecord output types for one URL.
// ABOUTME: Includes the extraction timestamp format and display helpers for table rendering.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::options::{MAX_CONTENT_DISPLAY, MAX_TITLE_DISPLAY};
use crate::text::truncate_display;

/// Format of [`ScrapedRecord::timestamp`].
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Upper bound on [`ScrapedRecord::images`].
pub const MAX_IMAGES: usize = 5;

/// One URL to scrape, with optional comma-separated selector lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeTarget {
    pub url: String,
    #[serde(default)]
    pub title_selector: String,
    #[serde(default)]
    pub content_selector: String,
}

impl ScrapeTarget {
    pub fn new(
        url: impl Into<String>,
        title_selector: impl Into<String>,
        content_selector: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            title_selector: title_selector.into(),
            content_selector: content_selector.into(),
        }
    }
}

/// A fully assembled extraction result for one successfully fetched URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ScrapedRecord {
    pub url: String,
    pub title: String,
    pub content: String,
    /// Raw date string as found on the page; may be empty.
    pub date: String,
    pub images: Vec<String>,
    pub timestamp: String,
}

impl ScrapedRecord {
    /// Title cut to the table display limit.
    pub fn display_title(&self) -> String {
        truncate_display(&self.title, MAX_TITLE_DISPLAY)
    }

    /// Content cut to the table display limit.
    pub fn display_content(&self) -> String {
        truncate_display(&self.content, MAX_CONTENT_DISPLAY)
    }

    /// Whether every field except `timestamp` matches `other`.
    pub fn same_fields(&self, other: &ScrapedRecord) -> bool {
        self.url == other.url
            && self.title == other.title
            && self.content == other.content
            && self.date == other.date
            && self.images == other.images
    }
}

/// Formats `at` the way records stamp their extraction time.
pub fn format_timestamp(at: DateTime<Local>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}
