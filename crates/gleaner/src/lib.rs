// ABOUTME: Main library entry point for the Gleaner page-record extractor.
// ABOUTME: Re-exports the public API: Scraper, ClientBuilder, ScrapedRecord, GleanError, dataset helpers.

//! Gleaner - best-effort structured record extraction from arbitrary web pages.
//!
//! Given a URL and optional title/content selector lists, the crate fetches the
//! page and runs a fixed fallback chain per field (title, content, date,
//! images) so that every successfully fetched page produces a record, even
//! when the selectors are wrong or the markup is unusual.
//!
//! # Example
//!
//! ```no_run
//! use gleaner::{CancellationToken, ScrapeTarget, Scraper};
//!
//! #[tokio::main]
//! async fn main() {
//!     let scraper = Scraper::builder().build();
//!     let cancel = CancellationToken::new();
//!     let target = ScrapeTarget::new("https://example.com/post", "h1", ".post-content");
//!     if let Some(record) = scraper.process(&target, &cancel).await {
//!         println!("{}: {}", record.title, record.content);
//!     }
//! }
//! ```

pub mod client;
pub mod dataset;
pub mod error;
pub mod extractors;
pub mod options;
pub mod record;
pub mod resource;
pub mod text;

pub use tokio_util::sync::CancellationToken;

pub use crate::client::{BatchFailure, BatchReport, Scraper};
pub use crate::dataset::{
    export_csv, export_summary, load_csv, validate_records, write_csv, RequiredField,
    RunSummary, SampleProfile, ValidationIssue, ValidationReport,
};
pub use crate::error::{ErrorCode, GleanError};
pub use crate::options::{ClientBuilder, Options};
pub use crate::record::{ScrapeTarget, ScrapedRecord};
