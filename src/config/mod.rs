//! Configuration module for Sumi-Probe
//!
//! Settings come from three layers, later ones winning: built-in defaults, an
//! optional TOML file, and command-line flags. The merged [`Config`] is
//! validated once and then shared read-only by every worker.
//!
//! # Example
//!
//! ```no_run
//! use sumi_probe::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("probe.toml")).unwrap();
//! println!("Probing with {} workers", config.probe.workers);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, OutputConfig, OutputFormat, ProbeConfig};

// Re-export parser functions
pub use parser::{build_header_set, load_config, parse_config, parse_header};
pub use validation::validate;
