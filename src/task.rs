//! Task and response data model
//!
//! A [`Task`] is one unit of work submitted to the worker pool. A
//! [`ProbeResponse`] is produced once per completed task and is never
//! mutated after it has been emitted.

use serde::Serialize;
use std::time::Duration;
use url::Url;

/// One URL to probe plus the number of redirect hops taken to reach it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    url: Url,
    depth: u32,
}

impl Task {
    /// Creates a task read from the input (depth 0)
    pub fn new(url: Url) -> Self {
        Self { url, depth: 0 }
    }

    /// Creates the follow-up task for a redirect hop out of this one
    pub fn follow(&self, url: Url) -> Self {
        Self {
            url,
            depth: self.depth + 1,
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Redirect hops already followed to reach this task
    pub fn depth(&self) -> u32 {
        self.depth
    }
}

/// Metrics and metadata for one completed request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeResponse {
    /// Canonical URL that was requested
    pub url: String,

    /// Remote peer address, empty when unknown
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ip_address: String,

    /// Every redirect target observed for this request, followed or not
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub redirect_history: Vec<String>,

    pub status_code: u16,

    pub content_type: String,

    /// Character count of the decoded body
    pub size: usize,

    pub word_count: usize,

    pub line_count: usize,

    /// Time from sending the request to having the full body
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub duration: Duration,

    /// Artifact path when the response was persisted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

impl ProbeResponse {
    /// Content type without parameters (`text/html; charset=utf-8` -> `text/html`)
    pub fn media_type(&self) -> &str {
        self.content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
    }
}

fn serialize_millis<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u64(duration.as_millis() as u64)
}
