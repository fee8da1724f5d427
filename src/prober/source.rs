//! Task source: turns input lines into initial tasks

use crate::prober::pool::WorkerPool;
use crate::task::Task;
use crate::url::parse_input_url;
use std::future::Future;
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

/// Boxed line reader over standard input or a file
pub type InputReader = Box<dyn AsyncBufRead + Unpin + Send>;

/// Opens the input: `-` (or no path) is standard input
pub async fn open_input(path: Option<&Path>) -> std::io::Result<InputReader> {
    match path {
        Some(path) if path != Path::new("-") => {
            let file = tokio::fs::File::open(path).await?;
            Ok(Box::new(BufReader::new(file)))
        }
        _ => Ok(Box::new(BufReader::new(tokio::io::stdin()))),
    }
}

/// Counts of what the source did with its input
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceStats {
    pub submitted: u64,
    pub malformed: u64,
}

/// Reads one URL per line and submits each valid one to the pool
///
/// Blank lines are skipped and malformed URLs dropped without output.
/// Submission waits while the pool is saturated, which in turn stops the
/// reading of further input.
pub async fn feed<R, F, Fut>(reader: R, pool: &WorkerPool<F>) -> std::io::Result<SourceStats>
where
    R: AsyncBufRead + Unpin,
    F: Fn(Task) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Option<Task>> + Send + 'static,
{
    let mut stats = SourceStats::default();
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match parse_input_url(line) {
            Ok(url) => {
                pool.submit(Task::new(url)).await;
                stats.submitted += 1;
            }
            Err(e) => {
                tracing::trace!("Skipping input line '{}': {}", line, e);
                stats.malformed += 1;
            }
        }
    }

    Ok(stats)
}
