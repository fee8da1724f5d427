use flate2::write::{GzEncoder, ZlibEncoder};
use flate2::Compression;
use std::io::Write;
use std::sync::{Arc, Mutex};
use sumi_probe::config::{Config, OutputFormat};
use sumi_probe::output::LineSink;
use sumi_probe::{Prober, RunSummary};

/// In-memory writer shared between the sink and the test
#[derive(Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl SharedBuffer {
    pub fn lines(&self) -> Vec<String> {
        let bytes = self.0.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }
}

/// Creates a test configuration with short timeouts
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.probe.workers = 4;
    config.probe.timeout_secs = 5;
    config
}

/// Runs the prober over `input` and returns the summary and emitted lines
pub async fn run_probe(config: &Config, input: &str) -> (RunSummary, Vec<String>) {
    let buffer = SharedBuffer::default();
    let sink = LineSink::new(config.output.format, false, Box::new(buffer.clone()));
    let prober = Prober::with_sink(config, Box::new(sink)).expect("Failed to create prober");

    let summary = prober.run(input.as_bytes()).await.expect("Probe run failed");
    (summary, buffer.lines())
}

/// Like [`run_probe`] but with JSON output, parsed
pub async fn run_probe_json(config: &Config, input: &str) -> (RunSummary, Vec<serde_json::Value>) {
    let mut config = config.clone();
    config.output.format = OutputFormat::Json;

    let (summary, lines) = run_probe(&config, input).await;
    let records = lines
        .iter()
        .map(|line| serde_json::from_str(line).expect("Record is not valid JSON"))
        .collect();
    (summary, records)
}

/// Finds the record for a URL
pub fn record_for<'a>(records: &'a [serde_json::Value], url: &str) -> &'a serde_json::Value {
    records
        .iter()
        .find(|record| record["url"] == url)
        .unwrap_or_else(|| panic!("No record for {}", url))
}

/// gzip-compresses a body for a `Content-Encoding: gzip` response
pub fn gzip(body: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(body).unwrap();
    encoder.finish().unwrap()
}

/// zlib-wrapped deflate, as sent with `Content-Encoding: deflate`
pub fn deflate(body: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(body).unwrap();
    encoder.finish().unwrap()
}
