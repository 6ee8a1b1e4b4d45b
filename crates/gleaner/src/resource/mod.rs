// ABOUTME: Page fetching: one cancellable GET with timeout, status and size checks.
// ABOUTME: Decodes the body using charset hints or detection and parses it into an HTML document.

use std::collections::HashMap;
use std::time::Duration;

use bytes::Bytes;
use scraper::Html;
use tokio_util::sync::CancellationToken;

use crate::error::GleanError;

/// Maximum allowed content length (10 MB).
pub const MAX_CONTENT_LENGTH: usize = 10 * 1024 * 1024;

/// Content-type prefixes that can never hold a parseable page.
const NON_TEXT_CONTENT_TYPES: &[&str] = &[
    "image/",
    "audio/",
    "video/",
    "font/",
    "application/pdf",
    "application/zip",
    "application/octet-stream",
];

/// Options for fetching a resource.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub headers: HashMap<String, String>,
    /// Per-request timeout, overriding whatever the client was built with.
    pub timeout: Option<Duration>,
}

/// Result of a successful fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub status: u16,
    pub url: String,
    pub final_url: String,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl FetchResult {
    /// Decode the body as UTF-8 text, using charset hints from the content-type header.
    pub fn text_utf8(&self) -> String {
        decode_body(&self.body, self.content_type.as_deref())
    }

    /// Parse the decoded body into a document.
    pub fn document(&self) -> Html {
        Html::parse_document(&self.text_utf8())
    }
}

/// Decode body bytes to a String using charset from content-type header or detection.
fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    if let Some(ct) = content_type {
        if let Some(charset) = extract_charset(ct) {
            if let Some(encoding) = encoding_rs::Encoding::for_label(charset.as_bytes()) {
                let (decoded, _, _) = encoding.decode(body);
                return decoded.into_owned();
            }
        }
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(body, true);
    let encoding = detector.guess(None, true);
    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}

/// Extract charset value from Content-Type header.
fn extract_charset(content_type: &str) -> Option<String> {
    let lower = content_type.to_lowercase();
    for part in lower.split(';') {
        let trimmed = part.trim();
        if let Some(charset) = trimmed.strip_prefix("charset=") {
            let charset = charset.trim_matches('"').trim_matches('\'');
            return Some(charset.to_string());
        }
    }
    None
}

fn is_non_text(content_type: &str) -> bool {
    NON_TEXT_CONTENT_TYPES
        .iter()
        .any(|prefix| content_type.starts_with(prefix))
}

fn transport_error(url: &str, what: &str, e: reqwest::Error) -> GleanError {
    if e.is_timeout() {
        GleanError::timeout(url, "Fetch", Some(anyhow::anyhow!("{}: {}", what, e)))
    } else {
        GleanError::fetch(url, "Fetch", Some(anyhow::anyhow!("{}: {}", what, e)))
    }
}

/// Fetch a resource from the given URL with a single GET.
///
/// Returns a Cancelled error without touching the network if `cancel` is
/// already set. Retrying is left to the caller.
pub async fn fetch(
    client: &reqwest::Client,
    url: &str,
    opts: &FetchOptions,
    cancel: &CancellationToken,
) -> Result<FetchResult, GleanError> {
    if cancel.is_cancelled() {
        return Err(GleanError::cancelled(url, "Fetch"));
    }

    if url.is_empty() {
        return Err(GleanError::invalid_url(url, "Fetch", None));
    }

    let parsed_url = url::Url::parse(url).map_err(|e| {
        GleanError::invalid_url(url, "Fetch", Some(anyhow::anyhow!("invalid URL: {}", e)))
    })?;

    let scheme = parsed_url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(GleanError::invalid_url(
            url,
            "Fetch",
            Some(anyhow::anyhow!("scheme must be http or https")),
        ));
    }

    let mut request = client.get(parsed_url);
    for (key, value) in &opts.headers {
        request = request.header(key, value);
    }
    if let Some(timeout) = opts.timeout {
        request = request.timeout(timeout);
    }

    let response = request
        .send()
        .await
        .map_err(|e| transport_error(url, "request failed", e))?;

    let content_length = response.content_length().or_else(|| {
        response
            .headers()
            .get("content-length")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
    });
    if let Some(len) = content_length {
        if len as usize > MAX_CONTENT_LENGTH {
            return Err(GleanError::too_large(url, "Fetch", MAX_CONTENT_LENGTH));
        }
    }

    let status = response.status().as_u16();
    let final_url = response.url().to_string();
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_lowercase());

    if !response.status().is_success() {
        return Err(GleanError::http_status(url, "Fetch", status));
    }

    if let Some(ct) = content_type.as_deref() {
        if is_non_text(ct) {
            return Err(GleanError::parse(
                url,
                "Fetch",
                Some(anyhow::anyhow!("content-type not a page: {}", ct)),
            ));
        }
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| transport_error(url, "failed to read body", e))?;

    if body.len() > MAX_CONTENT_LENGTH {
        return Err(GleanError::too_large(url, "Fetch", MAX_CONTENT_LENGTH));
    }

    Ok(FetchResult {
        status,
        url: url.to_string(),
        final_url,
        content_type,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn create_test_client() -> reqwest::Client {
        reqwest::Client::builder()
            .user_agent("test-agent")
            .timeout(Duration::from_millis(300))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_ok_utf8() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/test").header("x-probe", "1");
            then.status(200)
                .header("content-type", "text/html; charset=utf-8")
                .body("<html><head><title>hello</title></head></html>");
        });

        let opts = FetchOptions {
            headers: HashMap::from([("x-probe".to_string(), "1".to_string())]),
            ..Default::default()
        };
        let result = fetch(
            &create_test_client(),
            &server.url("/test"),
            &opts,
            &CancellationToken::new(),
        )
        .await;
        mock.assert();

        let result = result.expect("fetch should succeed");
        assert_eq!(result.status, 200);
        assert!(result.text_utf8().contains("hello"));
        let doc = result.document();
        let sel = scraper::Selector::parse("title").unwrap();
        assert_eq!(doc.select(&sel).count(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_token_skips_network() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/test");
            then.status(200).body("unused");
        });

        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = fetch(
            &create_test_client(),
            &server.url("/test"),
            &FetchOptions::default(),
            &cancel,
        )
        .await
        .expect_err("cancelled fetch must not succeed");

        assert!(err.is_cancelled());
        assert!(!err.is_fetch_failure());
        mock.assert_calls(0);
    }

    #[tokio::test]
    async fn test_fetch_non_2xx_rejected() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/notfound");
            then.status(404).body("not found");
        });

        let err = fetch(
            &create_test_client(),
            &server.url("/notfound"),
            &FetchOptions::default(),
            &CancellationToken::new(),
        )
        .await
        .expect_err("should fail on 404");
        mock.assert();

        assert!(err.is_fetch());
        assert_eq!(err.status, Some(404));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/slow");
            then.status(200)
                .delay(Duration::from_secs(2))
                .body("too late");
        });

        let err = fetch(
            &create_test_client(),
            &server.url("/slow"),
            &FetchOptions::default(),
            &CancellationToken::new(),
        )
        .await
        .expect_err("should time out");

        assert!(err.is_timeout());
        assert!(err.is_fetch_failure());
    }

    #[tokio::test]
    async fn test_binary_content_type_is_parse_failure() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/logo.png");
            then.status(200)
                .header("content-type", "image/png")
                .body(vec![0x89, 0x50, 0x4e, 0x47]);
        });

        let err = fetch(
            &create_test_client(),
            &server.url("/logo.png"),
            &FetchOptions::default(),
            &CancellationToken::new(),
        )
        .await
        .expect_err("images are not pages");

        assert!(err.is_parse());
    }

    #[tokio::test]
    async fn test_invalid_urls() {
        let client = create_test_client();
        let cancel = CancellationToken::new();
        let opts = FetchOptions::default();

        let err = fetch(&client, "", &opts, &cancel).await.unwrap_err();
        assert!(err.is_invalid_url());

        let err = fetch(&client, "not a url", &opts, &cancel).await.unwrap_err();
        assert!(err.is_invalid_url());

        let err = fetch(&client, "ftp://x.test/file", &opts, &cancel)
            .await
            .unwrap_err();
        assert!(err.is_invalid_url());
    }

    #[test]
    fn test_decode_iso_8859_1_from_header() {
        let iso_bytes: &[u8] = &[0x63, 0x61, 0x66, 0xe9];
        assert_eq!(
            decode_body(iso_bytes, Some("text/html; charset=iso-8859-1")),
            "café"
        );
    }

    #[test]
    fn test_decode_detects_utf8_without_header() {
        assert_eq!(decode_body("tiêu đề".as_bytes(), None), "tiêu đề");
    }

    #[test]
    fn test_decode_body_with_charset() {
        let decoded = decode_body("hello world".as_bytes(), Some("text/html; charset=utf-8"));
        assert_eq!(decoded, "hello world");
    }

    #[test]
    fn test_extract_charset() {
        assert_eq!(
            extract_charset("text/html; charset=utf-8"),
            Some("utf-8".to_string())
        );
        assert_eq!(
            extract_charset("text/html; charset=\"ISO-8859-1\""),
            Some("iso-8859-1".to_string())
        );
        assert_eq!(extract_charset("text/html"), None);
    }

    #[test]
    fn test_is_non_text() {
        assert!(is_non_text("image/png"));
        assert!(is_non_text("application/pdf"));
        assert!(!is_non_text("text/html; charset=utf-8"));
        assert!(!is_non_text("application/xhtml+xml"));
    }
}
