//! Response persistence
//!
//! Every persisted exchange lands in `<root>/<host>/<sha256 of the URL>`, so
//! the same canonical URL always maps to the same artifact path. The artifact
//! holds the URL, the page title, summary metrics, the request headers, the
//! response status line and headers, and the raw body bytes.
//!
//! Headers are recorded as the prober sees them. Request headers are the ones
//! set per request, so `host` and `accept-encoding` added by the client are
//! not listed. When a gzip or deflate body was decoded the client has already
//! removed `content-encoding` and `content-length` from the response headers,
//! and the body is stored decoded.

use crate::prober::{BodyMetrics, Exchange};
use reqwest::Version;
use scraper::{Html, Selector};
use sha2::{Digest, Sha256};
use std::io::Write as _;
use std::path::PathBuf;
use url::Url;

/// Writes response artifacts under a root directory
#[derive(Debug, Clone)]
pub struct Persister {
    root: PathBuf,
}

impl Persister {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Deterministic artifact path for a canonical URL
    pub fn artifact_path(&self, url: &Url) -> PathBuf {
        let host = url.host_str().unwrap_or("unknown");
        self.root.join(host).join(hash_url(url))
    }

    /// Writes the artifact for one exchange and returns its path
    ///
    /// # Returns
    ///
    /// * `Ok(PathBuf)` - Where the artifact was written
    /// * `Err(std::io::Error)` - Directory or file creation failed
    pub async fn save(
        &self,
        exchange: &Exchange,
        metrics: &BodyMetrics,
    ) -> std::io::Result<PathBuf> {
        let path = self.artifact_path(&exchange.url);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let artifact = render_artifact(exchange, metrics);
        tokio::fs::write(&path, artifact).await?;

        Ok(path)
    }
}

/// Hex SHA-256 digest of the canonical URL
pub fn hash_url(url: &Url) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_str().as_bytes());
    hex::encode(hasher.finalize())
}

/// Extracts the text of the first `<title>` element, entities decoded
pub fn extract_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("title").ok()?;

    let title = document
        .select(&selector)
        .next()?
        .text()
        .collect::<String>();
    let title = title.split_whitespace().collect::<Vec<_>>().join(" ");

    if title.is_empty() {
        None
    } else {
        Some(title)
    }
}

/// Protocol label for the response status line
pub fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "HTTP/0.9",
        Version::HTTP_10 => "HTTP/1.0",
        Version::HTTP_11 => "HTTP/1.1",
        Version::HTTP_2 => "HTTP/2",
        Version::HTTP_3 => "HTTP/3",
        _ => "HTTP/?",
    }
}

/// Renders the artifact for one exchange
///
/// Everything up to the body is UTF-8 text; the body follows byte for byte.
pub fn render_artifact(exchange: &Exchange, metrics: &BodyMetrics) -> Vec<u8> {
    let mut out = Vec::with_capacity(exchange.body.len() + 1024);

    // Writes into a Vec cannot fail
    let _ = writeln!(out, "{}", exchange.url);
    out.push(b'\n');

    if exchange.is_html() {
        if let Some(title) = extract_title(&exchange.text()) {
            let _ = writeln!(out, "Title: {}", title);
        }
    }
    let _ = writeln!(
        out,
        "Status: {} | Size: {} | Words: {} | Lines: {} | Duration: {}ms",
        exchange.status.as_u16(),
        metrics.size,
        metrics.words,
        metrics.lines,
        exchange.duration.as_millis()
    );
    out.push(b'\n');

    for (name, value) in &exchange.request_headers {
        let _ = write!(out, "> {}: ", name);
        out.extend_from_slice(value.as_bytes());
        out.push(b'\n');
    }
    out.push(b'\n');

    let _ = writeln!(out, "< {} {}", version_label(exchange.version), exchange.status);
    for (name, value) in &exchange.response_headers {
        let _ = write!(out, "< {}: ", name);
        out.extend_from_slice(value.as_bytes());
        out.push(b'\n');
    }
    out.push(b'\n');

    out.extend_from_slice(&exchange.body);
    out
}
