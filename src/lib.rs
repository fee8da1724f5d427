//! Sumi-Probe: a concurrent HTTP/HTTPS prober
//!
//! This crate reads candidate URLs, requests each one through a bounded worker
//! pool, classifies the responses, optionally follows redirects by feeding new
//! tasks back into the same pool, and reports per-response metrics either as
//! text lines or JSON records. Raw responses can be persisted to disk.

pub mod config;
pub mod output;
pub mod prober;
pub mod task;
pub mod url;

use thiserror::Error;

/// Main error type for Sumi-Probe operations
///
/// Every variant except `Config` and `Io` describes a failure local to one task.
/// Those never abort the pool or other in-flight tasks.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Request to {url} failed: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Redirect from {url} has no Location header")]
    MissingRedirectTarget { url: String },

    #[error("Failed to decode body of {url}: {source}")]
    ContentDecode { url: String, source: reqwest::Error },

    #[error("Failed to persist response for {url}: {source}")]
    Persistence { url: String, source: std::io::Error },

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid header '{0}': expected 'Name: Value'")]
    InvalidHeader(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for Sumi-Probe operations
pub type Result<T> = std::result::Result<T, ProbeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::{Config, OutputFormat};
pub use prober::{Prober, RunSummary};
pub use task::{ProbeResponse, Task};
pub use url::{is_scheme_upgrade, parse_input_url, resolve_redirect};
