// ABOUTME: Error types for Gleaner including the ErrorCode enum and GleanError struct.
// ABOUTME: Provides categorized errors with convenience constructors and retry classification helpers.

use std::fmt;

/// Error codes representing the categories of per-URL and persistence failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidUrl,
    Fetch,
    Timeout,
    /// Response larger than the fetch size limit. Deterministic, so never retried.
    TooLarge,
    Cancelled,
    Parse,
    Export,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::InvalidUrl => "invalid URL",
            ErrorCode::Fetch => "fetch error",
            ErrorCode::Timeout => "timeout",
            ErrorCode::TooLarge => "content too large",
            ErrorCode::Cancelled => "cancelled",
            ErrorCode::Parse => "parse error",
            ErrorCode::Export => "export error",
        };
        write!(f, "{}", s)
    }
}

/// The main error type for fetch, extraction and persistence operations.
#[derive(Debug, thiserror::Error)]
pub struct GleanError {
    pub code: ErrorCode,
    pub url: String,
    pub op: String,
    /// Set for HTTP status failures so retry policy can inspect it.
    pub status: Option<u16>,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for GleanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gleaner: {} {}: {}", self.op, self.url, self.code)?;
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

impl GleanError {
    fn with_code(
        code: ErrorCode,
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code,
            url: url.into(),
            op: op.into(),
            status: None,
            source,
        }
    }

    /// Create an InvalidUrl error.
    pub fn invalid_url(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::with_code(ErrorCode::InvalidUrl, url, op, source)
    }

    /// Create a Fetch error.
    pub fn fetch(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::with_code(ErrorCode::Fetch, url, op, source)
    }

    /// Create a Fetch error for a non-success HTTP status.
    pub fn http_status(url: impl Into<String>, op: impl Into<String>, status: u16) -> Self {
        let mut err = Self::with_code(
            ErrorCode::Fetch,
            url,
            op,
            Some(anyhow::anyhow!("HTTP status {}", status)),
        );
        err.status = Some(status);
        err
    }

    /// Create a Timeout error.
    pub fn timeout(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::with_code(ErrorCode::Timeout, url, op, source)
    }

    /// Create a TooLarge error for a body over `limit` bytes.
    pub fn too_large(url: impl Into<String>, op: impl Into<String>, limit: usize) -> Self {
        Self::with_code(
            ErrorCode::TooLarge,
            url,
            op,
            Some(anyhow::anyhow!("body exceeds {} bytes", limit)),
        )
    }

    /// Create a Cancelled error. Carries no source: cancellation is requested, not caused.
    pub fn cancelled(url: impl Into<String>, op: impl Into<String>) -> Self {
        Self::with_code(ErrorCode::Cancelled, url, op, None)
    }

    /// Create a Parse error.
    pub fn parse(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::with_code(ErrorCode::Parse, url, op, source)
    }

    /// Create an Export error. `url` holds the file path for persistence failures.
    pub fn export(
        path: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::with_code(ErrorCode::Export, path, op, source)
    }

    /// Returns true if this is a Timeout error.
    pub fn is_timeout(&self) -> bool {
        self.code == ErrorCode::Timeout
    }

    /// Returns true if this is a Fetch error.
    pub fn is_fetch(&self) -> bool {
        self.code == ErrorCode::Fetch
    }

    /// Returns true if this is a Cancelled outcome.
    pub fn is_too_large(&self) -> bool {
        self.code == ErrorCode::TooLarge
    }

    pub fn is_cancelled(&self) -> bool {
        self.code == ErrorCode::Cancelled
    }

    /// Returns true if this is a Parse error.
    pub fn is_parse(&self) -> bool {
        self.code == ErrorCode::Parse
    }

    /// Returns true if this is an InvalidUrl error.
    pub fn is_invalid_url(&self) -> bool {
        self.code == ErrorCode::InvalidUrl
    }

    /// Returns true if this is an Export error.
    pub fn is_export(&self) -> bool {
        self.code == ErrorCode::Export
    }

    /// Network-layer, timeout and status failures, plus URLs that never made it onto the wire.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::Fetch | ErrorCode::Timeout | ErrorCode::TooLarge | ErrorCode::InvalidUrl
        )
    }

    /// Whether another attempt could plausibly succeed: timeouts, transport
    /// errors, 5xx and 429. Other 4xx statuses are final.
    pub fn is_transient(&self) -> bool {
        match self.code {
            ErrorCode::Timeout => true,
            ErrorCode::Fetch => match self.status {
                Some(status) => status == 429 || (500..600).contains(&status),
                None => true,
            },
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_op_url_code_and_source() {
        let err = GleanError::fetch(
            "https://x.test/a",
            "Fetch",
            Some(anyhow::anyhow!("connection refused")),
        );
        assert_eq!(
            err.to_string(),
            "gleaner: Fetch https://x.test/a: fetch error: connection refused"
        );
    }

    #[test]
    fn cancelled_is_not_a_fetch_failure() {
        let err = GleanError::cancelled("https://x.test/a", "Process");
        assert!(err.is_cancelled());
        assert!(!err.is_fetch_failure());
        assert!(!err.is_transient());
    }

    #[test]
    fn status_classification() {
        assert!(GleanError::http_status("u", "Fetch", 503).is_transient());
        assert!(GleanError::http_status("u", "Fetch", 429).is_transient());
        assert!(!GleanError::http_status("u", "Fetch", 404).is_transient());
        assert!(GleanError::http_status("u", "Fetch", 404).is_fetch_failure());
        assert!(GleanError::timeout("u", "Fetch", None).is_transient());
        assert!(!GleanError::invalid_url("u", "Fetch", None).is_transient());
        assert!(!GleanError::parse("u", "Fetch", None).is_transient());
    }

    #[test]
    fn oversized_body_is_final() {
        let err = GleanError::too_large("u", "Fetch", 10);
        assert!(err.is_too_large());
        assert!(err.is_fetch_failure());
        assert!(!err.is_transient());
        assert_eq!(
            err.to_string(),
            "gleaner: Fetch u: content too large: body exceeds 10 bytes"
        );
    }
}
