// ABOUTME: The Scraper client that turns one ScrapeTarget into one ScrapedRecord.
// ABOUTME: Handles cancellation, retry with backoff, extraction, and the sequential batch driver.

use chrono::Local;
use scraper::Html;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::dataset::RunSummary;
use crate::error::GleanError;
use crate::extractors::{extract_content, extract_date, extract_images, extract_title};
use crate::options::{ClientBuilder, Options};
use crate::record::{format_timestamp, ScrapeTarget, ScrapedRecord};
use crate::resource::{fetch, FetchOptions, FetchResult};

/// Runs all four field extractors over `doc` and stamps the current time.
///
/// `base_url` is used to resolve relative image links; it is normally the
/// final URL after redirects.
pub fn assemble(doc: &Html, target: &ScrapeTarget, base_url: &str) -> ScrapedRecord {
    ScrapedRecord {
        url: target.url.clone(),
        title: extract_title(doc, &target.title_selector, &target.url),
        content: extract_content(doc, &target.content_selector),
        date: extract_date(doc),
        images: extract_images(doc, base_url),
        timestamp: format_timestamp(Local::now()),
    }
}

/// A URL that produced no record, with the reason.
#[derive(Debug)]
pub struct BatchFailure {
    pub url: String,
    pub error: GleanError,
}

/// Outcome of a sequential run over many targets.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Records in input order.
    pub records: Vec<ScrapedRecord>,
    pub failures: Vec<BatchFailure>,
    /// Targets whose fetch was actually started.
    pub attempted: usize,
    /// Whether the run stopped early because of cancellation.
    pub cancelled: bool,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.records.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Summary counts stamped with the current time.
    pub fn summary(&self) -> RunSummary {
        RunSummary::new(self.attempted, self.succeeded(), Local::now())
    }
}

/// The main client for scraping pages into records.
pub struct Scraper {
    opts: Options,
    http_client: reqwest::Client,
}

impl Scraper {
    /// Create a new ClientBuilder for configuring the scraper.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a new Scraper with the given options.
    pub fn new(opts: Options) -> Self {
        let http_client = opts.http_client.clone().unwrap_or_else(|| {
            reqwest::Client::builder()
                .user_agent(&opts.user_agent)
                .timeout(opts.timeout)
                .cookie_store(true)
                .gzip(true)
                .brotli(true)
                .deflate(true)
                .build()
                .unwrap_or_else(|e| {
                    warn!(error = %e, "falling back to a default HTTP client");
                    reqwest::Client::new()
                })
        });

        Self { opts, http_client }
    }

    pub fn options(&self) -> &Options {
        &self.opts
    }

    fn fetch_options(&self) -> FetchOptions {
        let mut headers = self.opts.headers.clone();
        headers
            .entry("user-agent".to_string())
            .or_insert_with(|| self.opts.user_agent.clone());
        FetchOptions {
            headers,
            timeout: Some(self.opts.timeout),
        }
    }

    /// Fetches `url`, retrying transient failures with exponential backoff.
    ///
    /// A cancel that arrives once the first attempt has been made ends the
    /// retries with the last real error, so `Cancelled` always means no
    /// request was sent.
    async fn fetch_with_retry(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<FetchResult, GleanError> {
        let opts = self.fetch_options();
        let mut attempt: u32 = 0;
        loop {
            match fetch(&self.http_client, url, &opts, cancel).await {
                Ok(fetched) => return Ok(fetched),
                Err(e)
                    if e.is_transient()
                        && attempt < self.opts.max_retries
                        && !cancel.is_cancelled() =>
                {
                    let wait = self
                        .opts
                        .retry_backoff
                        .saturating_mul(2u32.saturating_pow(attempt));
                    attempt += 1;
                    debug!(url, attempt, wait_ms = wait.as_millis() as u64, error = %e, "retrying fetch");
                    tokio::select! {
                        _ = tokio::time::sleep(wait) => {}
                        _ = cancel.cancelled() => return Err(e),
                    }
                    if cancel.is_cancelled() {
                        return Err(e);
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Scrapes one target, reporting why no record was produced on failure.
    ///
    /// The cancel token is checked once, before any network I/O. A fetch
    /// already in flight runs to completion or to its timeout.
    pub async fn try_process(
        &self,
        target: &ScrapeTarget,
        cancel: &CancellationToken,
    ) -> Result<ScrapedRecord, GleanError> {
        if cancel.is_cancelled() {
            return Err(GleanError::cancelled(&target.url, "Process"));
        }

        info!(url = %target.url, "scraping");
        let fetched = self.fetch_with_retry(&target.url, cancel).await?;
        let doc = fetched.document();
        let record = assemble(&doc, target, &fetched.final_url);
        info!(url = %target.url, title = %record.title, images = record.images.len(), "record extracted");
        Ok(record)
    }

    /// Scrapes one target, yielding `None` when cancelled or when the fetch fails.
    pub async fn process(
        &self,
        target: &ScrapeTarget,
        cancel: &CancellationToken,
    ) -> Option<ScrapedRecord> {
        match self.try_process(target, cancel).await {
            Ok(record) => Some(record),
            Err(e) if e.is_cancelled() => {
                info!(url = %target.url, "skipped: cancelled");
                None
            }
            Err(e) => {
                warn!(url = %target.url, error = %e, "no record produced");
                None
            }
        }
    }

    /// Runs extraction over an in-memory page, without any network access.
    pub fn extract_html(&self, html: &str, target: &ScrapeTarget) -> ScrapedRecord {
        let doc = Html::parse_document(html);
        assemble(&doc, target, &target.url)
    }

    /// Scrapes targets strictly one after another, pausing `delay` between fetches.
    ///
    /// A failed URL never stops the batch; cancellation stops it before the
    /// next fetch would begin.
    pub async fn process_all(
        &self,
        targets: &[ScrapeTarget],
        cancel: &CancellationToken,
    ) -> BatchReport {
        let mut report = BatchReport::default();

        for target in targets {
            if report.attempted > 0 && !self.opts.delay.is_zero() {
                tokio::time::sleep(self.opts.delay).await;
            }

            match self.try_process(target, cancel).await {
                Ok(record) => {
                    report.attempted += 1;
                    report.records.push(record);
                }
                Err(e) if e.is_cancelled() => {
                    info!(
                        remaining = targets.len() - report.attempted,
                        "batch cancelled"
                    );
                    report.cancelled = true;
                    break;
                }
                Err(e) => {
                    report.attempted += 1;
                    warn!(url = %target.url, error = %e, "no record produced");
                    report.failures.push(BatchFailure {
                        url: target.url.clone(),
                        error: e,
                    });
                }
            }
        }

        info!(
            attempted = report.attempted,
            succeeded = report.succeeded(),
            failed = report.failed(),
            "batch finished"
        );
        report
    }
}
