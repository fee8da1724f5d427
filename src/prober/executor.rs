//! HTTP request executor
//!
//! This module performs exactly one request/response exchange per task:
//! - Building the shared HTTP client (no redirects, no certificate checks)
//! - Applying the fixed browser-like headers plus user-supplied ones
//! - Reading the body into a per-task buffer, capped at [`MAX_BODY_SIZE`]
//! - Classifying the outcome
//!
//! gzip and deflate bodies are decoded by the client while streaming, so the
//! buffer always holds the decoded bytes. Other encodings are kept as-is. The
//! bytes themselves are never re-encoded; text is derived from them on demand.

use crate::task::Task;
use crate::ProbeError;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, USER_AGENT};
use reqwest::{redirect::Policy, Client, StatusCode, Version};
use std::borrow::Cow;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use url::Url;

/// User-Agent sent with every request unless overridden by a custom header
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_3) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/80.0.3987.132 Safari/537.36";

pub const DEFAULT_ACCEPT: &str = "*/*";

pub const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.8";

/// Bodies larger than this are dropped without producing a record (5 MiB)
pub const MAX_BODY_SIZE: usize = 5 * 1024 * 1024;

/// Result of executing one task
#[derive(Debug)]
pub enum Outcome {
    /// The exchange completed and the body was read
    Completed(Exchange),

    /// The exchange completed but produces no record
    Discarded(DiscardReason),
}

/// Why a completed exchange was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    /// Body exceeded [`MAX_BODY_SIZE`]
    BodyTooLarge,

    /// HTML error page (404 or 429) while noise filtering is on
    Noise(StatusCode),
}

/// Everything observed during one exchange, owned by a single task
#[derive(Debug)]
pub struct Exchange {
    /// URL that was requested
    pub url: Url,
    pub remote_addr: Option<SocketAddr>,
    pub status: StatusCode,
    pub version: Version,
    /// Headers actually sent
    pub request_headers: HeaderMap,
    pub response_headers: HeaderMap,
    /// Body bytes after content decoding, otherwise exactly as received
    pub body: Vec<u8>,
    /// From sending the request to the last body byte
    pub duration: Duration,
}

impl Exchange {
    /// Raw Content-Type header value, empty when absent
    pub fn content_type(&self) -> &str {
        header_str(&self.response_headers, CONTENT_TYPE)
    }

    pub fn is_html(&self) -> bool {
        self.content_type().contains("/html")
    }

    /// Body as text, invalid UTF-8 sequences replaced
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Builds the HTTP client shared by all workers
///
/// Redirects are never followed by the client itself: each hop becomes its
/// own task. Server certificates are not validated.
///
/// # Arguments
///
/// * `timeout` - Absolute limit for connect, send and body read
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .use_rustls_tls()
        .danger_accept_invalid_certs(true)
        .timeout(timeout)
        .connect_timeout(timeout)
        .redirect(Policy::none())
        .gzip(true)
        .deflate(true)
        .pool_max_idle_per_host(1024)
        .build()
}

/// Executes the request for one task
///
/// # Arguments
///
/// * `client` - The shared HTTP client
/// * `headers` - User-supplied headers; they override the fixed ones
/// * `task` - The task to execute
/// * `ignore_noise` - Drop HTML 404/429 responses
///
/// # Returns
///
/// * `Ok(Outcome)` - The exchange completed (possibly discarded)
/// * `Err(ProbeError)` - Transport failure, timeout or undecodable body
pub async fn execute(
    client: &Client,
    headers: &HeaderMap,
    task: &Task,
    ignore_noise: bool,
) -> Result<Outcome, ProbeError> {
    let url = task.url();

    let request = client
        .get(url.clone())
        .header(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT))
        .header(ACCEPT, HeaderValue::from_static(DEFAULT_ACCEPT))
        .header(ACCEPT_LANGUAGE, HeaderValue::from_static(DEFAULT_ACCEPT_LANGUAGE))
        .headers(headers.clone())
        .build()
        .map_err(|e| transport_error(url, e))?;
    let request_headers = request.headers().clone();

    let started = Instant::now();
    let mut response = client
        .execute(request)
        .await
        .map_err(|e| transport_error(url, e))?;

    let status = response.status();
    let version = response.version();
    let remote_addr = response.remote_addr();
    let response_headers = response.headers().clone();

    if response
        .content_length()
        .is_some_and(|len| len > MAX_BODY_SIZE as u64)
    {
        return Ok(Outcome::Discarded(DiscardReason::BodyTooLarge));
    }

    if ignore_noise && is_noise(status, header_str(&response_headers, CONTENT_TYPE)) {
        return Ok(Outcome::Discarded(DiscardReason::Noise(status)));
    }

    let mut buffer = Vec::new();
    while let Some(chunk) = response.chunk().await.map_err(|e| body_error(url, e))? {
        if buffer.len() + chunk.len() > MAX_BODY_SIZE {
            return Ok(Outcome::Discarded(DiscardReason::BodyTooLarge));
        }
        buffer.extend_from_slice(&chunk);
    }
    let duration = started.elapsed();

    Ok(Outcome::Completed(Exchange {
        url: url.clone(),
        remote_addr,
        status,
        version,
        request_headers,
        response_headers,
        body: buffer,
        duration,
    }))
}

/// Returns true for HTML error pages that carry no signal (404 and 429)
pub fn is_noise(status: StatusCode, content_type: &str) -> bool {
    content_type.contains("/html")
        && (status == StatusCode::NOT_FOUND || status == StatusCode::TOO_MANY_REQUESTS)
}

/// Returns true for the statuses that carry a redirect target
pub fn is_redirect(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    )
}

pub(crate) fn header_str(headers: &HeaderMap, name: reqwest::header::HeaderName) -> &str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

fn transport_error(url: &Url, error: reqwest::Error) -> ProbeError {
    if error.is_timeout() {
        ProbeError::Timeout {
            url: url.to_string(),
        }
    } else {
        ProbeError::Transport {
            url: url.to_string(),
            source: error,
        }
    }
}

fn body_error(url: &Url, error: reqwest::Error) -> ProbeError {
    if error.is_decode() {
        ProbeError::ContentDecode {
            url: url.to_string(),
            source: error,
        }
    } else {
        transport_error(url, error)
    }
}
