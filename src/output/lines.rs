//! Line-oriented result sink
//!
//! Records are rendered either as compact text lines or as JSON objects and
//! written one per line to standard output or to the append-only index file.

use crate::config::OutputFormat;
use crate::output::traits::{OutputError, OutputResult, ResponseSink};
use crate::task::ProbeResponse;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// File name of the index inside the output directory
pub const INDEX_FILE_NAME: &str = "index";

/// Sink writing one record per line to a single destination
pub struct LineSink {
    format: OutputFormat,
    /// Prefix text lines with the artifact file name (index mode)
    with_filename: bool,
    writer: Mutex<Box<dyn Write + Send>>,
}

impl LineSink {
    /// Creates a sink over an arbitrary writer
    pub fn new(format: OutputFormat, with_filename: bool, writer: Box<dyn Write + Send>) -> Self {
        Self {
            format,
            with_filename,
            writer: Mutex::new(writer),
        }
    }

    /// Sink writing to standard output
    pub fn stdout(format: OutputFormat) -> Self {
        Self::new(format, false, Box::new(std::io::stdout()))
    }

    /// Sink appending to `<directory>/index`, creating the directory if needed
    pub fn index_file(format: OutputFormat, directory: &Path) -> std::io::Result<Self> {
        std::fs::create_dir_all(directory)?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(index_path(directory))?;

        Ok(Self::new(format, true, Box::new(BufWriter::new(file))))
    }

    /// Renders one record without the trailing newline
    pub fn render(&self, response: &ProbeResponse) -> OutputResult<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string(response)?),
            OutputFormat::Text if self.with_filename => Ok(format!(
                "{} - {}",
                response.filename.as_deref().unwrap_or(""),
                format_text_line(response)
            )),
            OutputFormat::Text => Ok(format_text_line(response)),
        }
    }
}

impl ResponseSink for LineSink {
    fn emit(&self, response: &ProbeResponse) -> OutputResult<()> {
        let mut line = self.render(response)?;
        line.push('\n');

        let mut writer = self.writer.lock().map_err(|_| OutputError::Poisoned)?;
        writer.write_all(line.as_bytes())?;
        Ok(())
    }

    fn flush(&self) -> OutputResult<()> {
        let mut writer = self.writer.lock().map_err(|_| OutputError::Poisoned)?;
        writer.flush()?;
        Ok(())
    }
}

/// Path of the index file inside an output directory
pub fn index_path(directory: &Path) -> PathBuf {
    directory.join(INDEX_FILE_NAME)
}

/// Formats `[status-type] url size words lines [history]`
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use sumi_probe::output::format_text_line;
/// use sumi_probe::ProbeResponse;
///
/// let response = ProbeResponse {
///     url: "http://a.test/".to_string(),
///     ip_address: String::new(),
///     redirect_history: vec!["https://a.test/".to_string()],
///     status_code: 301,
///     content_type: "text/html; charset=utf-8".to_string(),
///     size: 10,
///     word_count: 2,
///     line_count: 1,
///     duration: Duration::from_millis(3),
///     filename: None,
/// };
///
/// assert_eq!(
///     format_text_line(&response),
///     "[301-text/html] http://a.test/ 10 2 1 [https://a.test/]"
/// );
/// ```
pub fn format_text_line(response: &ProbeResponse) -> String {
    format!(
        "[{}-{}] {} {} {} {} [{}]",
        response.status_code,
        response.media_type(),
        response.url,
        response.size,
        response.word_count,
        response.line_count,
        response.redirect_history.join(" ")
    )
}
