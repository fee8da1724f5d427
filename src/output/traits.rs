//! Output sink trait and error types

use crate::task::ProbeResponse;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to format output: {0}")]
    Format(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Output writer is poisoned")]
    Poisoned,
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Destination for completed responses
///
/// Workers emit concurrently, so implementations must write each record as a
/// whole line and never interleave two records.
pub trait ResponseSink: Send + Sync {
    /// Writes one record
    fn emit(&self, response: &ProbeResponse) -> OutputResult<()>;

    /// Flushes buffered records, if any
    fn flush(&self) -> OutputResult<()> {
        Ok(())
    }
}
