// ABOUTME: Configuration options for Gleaner including request, retry and batch pacing settings.
// ABOUTME: ClientBuilder provides a fluent API for constructing Scraper instances with custom settings.

use std::collections::HashMap;
use std::time::Duration;

use crate::client::Scraper;

/// Client identifier sent with every request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Title selector list used when the caller does not supply one.
pub const DEFAULT_TITLE_SELECTOR: &str = "h1, .title, .post-title";

/// Content selector list used when the caller does not supply one.
pub const DEFAULT_CONTENT_SELECTOR: &str = ".content, .post-content, article, .entry-content";

/// Table display limits, in characters.
pub const MAX_TITLE_DISPLAY: usize = 50;
pub const MAX_CONTENT_DISPLAY: usize = 100;

/// Configuration options for the scraper.
#[derive(Debug, Clone)]
pub struct Options {
    pub timeout: Duration,
    pub user_agent: String,
    pub headers: HashMap<String, String>,
    /// Extra attempts after the first for transient fetch failures.
    pub max_retries: u32,
    /// Wait before the first retry; doubled for each further retry.
    pub retry_backoff: Duration,
    /// Pause between successive URLs in a batch.
    pub delay: Duration,
    pub http_client: Option<reqwest::Client>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            headers: HashMap::new(),
            max_retries: 3,
            retry_backoff: Duration::from_millis(500),
            delay: Duration::from_secs(1),
            http_client: None,
        }
    }
}

/// Builder for constructing Scraper instances with custom configuration.
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    opts: Options,
}

impl ClientBuilder {
    /// Create a new ClientBuilder with default options.
    pub fn new() -> Self {
        Self {
            opts: Options::default(),
        }
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.opts.timeout = timeout;
        self
    }

    /// Set the User-Agent header.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.opts.user_agent = user_agent.into();
        self
    }

    /// Add a custom header to all requests.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.opts.headers.insert(key.into(), value.into());
        self
    }

    /// Set how many times a transient fetch failure is retried.
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.opts.max_retries = retries;
        self
    }

    /// Set the initial retry backoff.
    pub fn retry_backoff(mut self, backoff: Duration) -> Self {
        self.opts.retry_backoff = backoff;
        self
    }

    /// Set the pause between successive URLs in a batch.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.opts.delay = delay;
        self
    }

    /// Use a custom HTTP client.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.opts.http_client = Some(client);
        self
    }

    /// Build the Scraper with the configured options.
    pub fn build(self) -> Scraper {
        Scraper::new(self.opts)
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
