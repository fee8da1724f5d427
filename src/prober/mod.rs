//! Prober module: the concurrent request pipeline
//!
//! This module contains the core probing logic, including:
//! - The bounded, self-feeding worker pool and its completion tracking
//! - Reading input URLs into tasks
//! - Executing one HTTP exchange per task and measuring the body
//! - Turning redirects into follow-up tasks
//! - Handing finished responses to persistence and the result sink

mod executor;
mod metrics;
mod pool;
mod source;

pub use executor::{
    build_http_client, execute, is_noise, is_redirect, DiscardReason, Exchange, Outcome,
    DEFAULT_ACCEPT, DEFAULT_ACCEPT_LANGUAGE, DEFAULT_USER_AGENT, MAX_BODY_SIZE,
};
pub use metrics::BodyMetrics;
pub use pool::{TaskTicket, TaskTracker, WorkerPool};
pub use source::{feed, open_input, InputReader, SourceStats};

use crate::config::{build_header_set, Config, ProbeConfig};
use crate::output::{open_sink, Persister, ResponseSink};
use crate::task::{ProbeResponse, Task};
use crate::url::{resolve_redirect, should_follow};
use crate::ProbeError;
use executor::header_str;
use reqwest::header::{HeaderMap, LOCATION};
use reqwest::Client;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncBufRead;
use url::Url;

/// Totals for one run, reported once the pool has drained
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Tasks created from input lines
    pub submitted: u64,
    /// Input lines that were not valid URLs
    pub malformed: u64,
    /// Follow-up tasks created from redirects
    pub followed: u64,
    /// Redirects not followed because the depth limit was reached
    pub depth_exceeded: u64,
    /// Responses written to the sink
    pub emitted: u64,
    /// Tasks that ended with an error
    pub failed: u64,
    /// Completed exchanges that produce no record (oversized body, noise)
    pub discarded: u64,
}

#[derive(Debug, Default)]
struct Counters {
    followed: AtomicU64,
    depth_exceeded: AtomicU64,
    emitted: AtomicU64,
    failed: AtomicU64,
    discarded: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Shared probing context, built once and captured by every worker
pub struct Prober {
    client: Client,
    headers: HeaderMap,
    settings: ProbeConfig,
    sink: Box<dyn ResponseSink>,
    persister: Option<Persister>,
    counters: Counters,
}

impl Prober {
    /// Creates a prober writing to the sink selected by the configuration
    ///
    /// # Arguments
    ///
    /// * `config` - Validated configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Prober)` - Ready to run
    /// * `Err(ProbeError)` - The client, headers or output could not be set up
    pub fn new(config: &Config) -> Result<Self, ProbeError> {
        let sink = open_sink(&config.output)?;
        Self::with_sink(config, Box::new(sink))
    }

    /// Creates a prober writing to an explicit sink
    pub fn with_sink(config: &Config, sink: Box<dyn ResponseSink>) -> Result<Self, ProbeError> {
        let client = build_http_client(Duration::from_secs(config.probe.timeout_secs))?;
        let headers = build_header_set(config)?;
        let persister = config
            .output
            .save_responses
            .then(|| Persister::new(&config.output.directory));

        Ok(Self {
            client,
            headers,
            settings: config.probe.clone(),
            sink,
            persister,
            counters: Counters::default(),
        })
    }

    /// Probes every URL read from `input` and waits for all follow-ups
    ///
    /// Returns once the outstanding-task count has dropped to zero. An input
    /// read error stops reading but still lets submitted tasks finish.
    pub async fn run<R>(self, input: R) -> Result<RunSummary, ProbeError>
    where
        R: AsyncBufRead + Unpin,
    {
        let prober = Arc::new(self);
        let worker = Arc::clone(&prober);

        let pool = WorkerPool::new(prober.settings.workers, move |task: Task| {
            let prober = Arc::clone(&worker);
            async move { prober.process(task).await }
        });

        let fed = feed(input, &pool).await;
        pool.wait().await;

        if let Err(e) = prober.sink.flush() {
            tracing::warn!("Failed to flush output: {}", e);
        }

        let stats = fed?;
        Ok(prober.summary(stats))
    }

    /// Runs one task to completion and returns its follow-up, if any
    ///
    /// Failures stay local to the task: they are logged and counted, and the
    /// task simply produces no record.
    pub async fn process(&self, task: Task) -> Option<Task> {
        tracing::debug!(url = %task.url(), depth = task.depth(), "Probing");

        let outcome = execute(
            &self.client,
            &self.headers,
            &task,
            self.settings.ignore_noise,
        )
        .await;

        let exchange = match outcome {
            Ok(Outcome::Completed(exchange)) => exchange,
            Ok(Outcome::Discarded(reason)) => {
                tracing::debug!(url = %task.url(), ?reason, "Discarding response");
                Counters::bump(&self.counters.discarded);
                return None;
            }
            Err(e) => {
                tracing::debug!(url = %task.url(), error = %e, "Request failed");
                Counters::bump(&self.counters.failed);
                return None;
            }
        };

        match self.complete(&task, exchange).await {
            Ok(follow_up) => follow_up,
            Err(e) => {
                tracing::debug!(url = %task.url(), error = %e, "Task failed");
                Counters::bump(&self.counters.failed);
                None
            }
        }
    }

    async fn complete(&self, task: &Task, exchange: Exchange) -> Result<Option<Task>, ProbeError> {
        let mut redirect_history = Vec::new();
        let mut follow_up = None;

        if is_redirect(exchange.status) {
            let location = header_str(&exchange.response_headers, LOCATION);
            if location.trim().is_empty() {
                return Err(ProbeError::MissingRedirectTarget {
                    url: task.url().to_string(),
                });
            }

            let target = resolve_redirect(task.url(), location)?;
            redirect_history.push(target.to_string());

            if should_follow(self.settings.follow_redirects, task.url(), &target) {
                follow_up = self.follow(task, target);
            }
        }

        let metrics = BodyMetrics::measure(&exchange.text());

        let filename = match &self.persister {
            Some(persister) => self.persist(persister, &exchange, &metrics).await,
            None => None,
        };

        let response = ProbeResponse {
            url: exchange.url.to_string(),
            ip_address: exchange
                .remote_addr
                .map(|addr| addr.ip().to_string())
                .unwrap_or_default(),
            redirect_history,
            status_code: exchange.status.as_u16(),
            content_type: exchange.content_type().to_string(),
            size: metrics.size,
            word_count: metrics.words,
            line_count: metrics.lines,
            duration: exchange.duration,
            filename,
        };

        match self.sink.emit(&response) {
            Ok(()) => Counters::bump(&self.counters.emitted),
            Err(e) => tracing::warn!(url = %response.url, "Failed to write record: {}", e),
        }

        Ok(follow_up)
    }

    /// Builds the follow-up task unless it would exceed the redirect depth
    fn follow(&self, task: &Task, target: Url) -> Option<Task> {
        let depth = task.depth() + 1;
        if depth > self.settings.max_redirects {
            tracing::debug!(url = %target, depth, "Redirect depth exceeded, not following");
            Counters::bump(&self.counters.depth_exceeded);
            return None;
        }

        Counters::bump(&self.counters.followed);
        Some(task.follow(target))
    }

    /// Writes the artifact; failures leave the record without a filename
    async fn persist(
        &self,
        persister: &Persister,
        exchange: &Exchange,
        metrics: &BodyMetrics,
    ) -> Option<String> {
        match persister.save(exchange, metrics).await {
            Ok(path) => Some(path.display().to_string()),
            Err(source) => {
                let error = ProbeError::Persistence {
                    url: exchange.url.to_string(),
                    source,
                };
                tracing::warn!("{}", error);
                None
            }
        }
    }

    fn summary(&self, stats: SourceStats) -> RunSummary {
        RunSummary {
            submitted: stats.submitted,
            malformed: stats.malformed,
            followed: self.counters.followed.load(Ordering::Relaxed),
            depth_exceeded: self.counters.depth_exceeded.load(Ordering::Relaxed),
            emitted: self.counters.emitted.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
            discarded: self.counters.discarded.load(Ordering::Relaxed),
        }
    }
}
