use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Main configuration structure for Sumi-Probe
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub probe: ProbeConfig,
    pub output: OutputConfig,
    /// Extra request headers, sent with every request
    pub headers: BTreeMap<String, String>,
}

/// Request and pool behaviour
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ProbeConfig {
    /// Number of requests in flight at once
    pub workers: usize,

    /// Absolute timeout for one request, body included (seconds)
    pub timeout_secs: u64,

    /// Follow every redirect, not only same-resource scheme upgrades
    pub follow_redirects: bool,

    /// Maximum redirect depth a follow-up task may reach
    pub max_redirects: u32,

    /// Drop HTML responses with status 404 or 429
    pub ignore_noise: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            workers: 10,
            timeout_secs: 15,
            follow_redirects: false,
            max_redirects: 16,
            ignore_noise: true,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    pub format: OutputFormat,

    /// Persist raw responses and write records to `<directory>/index`
    pub save_responses: bool,

    /// Root directory for the index file and artifacts
    pub directory: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            save_responses: false,
            directory: PathBuf::from("out"),
        }
    }
}

/// Record format, chosen once at startup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `[status-type] url size words lines [history]`
    #[default]
    Text,
    /// One JSON object per line
    Json,
}
