//! Output module for emitting probe results
//!
//! This module handles:
//! - Rendering responses as text lines or JSON records
//! - Serialized writing to standard output or the append-only index file
//! - Persisting raw responses as per-URL artifacts

mod lines;
mod persist;
mod traits;

pub use lines::{format_text_line, index_path, LineSink, INDEX_FILE_NAME};
pub use persist::{extract_title, hash_url, render_artifact, Persister};
pub use traits::{OutputError, OutputResult, ResponseSink};

use crate::config::OutputConfig;

/// Opens the sink selected by the output configuration
///
/// With persistence enabled records go to `<directory>/index`, otherwise to
/// standard output.
pub fn open_sink(config: &OutputConfig) -> std::io::Result<LineSink> {
    if config.save_responses {
        LineSink::index_file(config.format, &config.directory)
    } else {
        Ok(LineSink::stdout(config.format))
    }
}
