use crate::config::types::Config;
use crate::config::validation::validate;
use crate::{ConfigError, ConfigResult};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from TOML text
///
/// Missing sections and keys fall back to their defaults, so an empty
/// document is a valid configuration.
pub fn parse_config(content: &str) -> ConfigResult<Config> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Splits a `Name: Value` header argument at the first colon
///
/// # Examples
///
/// ```
/// use sumi_probe::config::parse_header;
///
/// let (name, value) = parse_header("Authorization: Bearer a:b").unwrap();
/// assert_eq!(name, "Authorization");
/// assert_eq!(value, "Bearer a:b");
/// ```
pub fn parse_header(arg: &str) -> ConfigResult<(String, String)> {
    let (name, value) = arg
        .split_once(':')
        .ok_or_else(|| ConfigError::InvalidHeader(arg.to_string()))?;

    let name = name.trim();
    if name.is_empty() {
        return Err(ConfigError::InvalidHeader(arg.to_string()));
    }

    Ok((name.to_string(), value.trim().to_string()))
}

/// Builds the header set shared by all workers
pub fn build_header_set(config: &Config) -> ConfigResult<HeaderMap> {
    let mut headers = HeaderMap::with_capacity(config.headers.len());

    for (name, value) in &config.headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| ConfigError::InvalidHeader(format!("{}: {}", name, value)))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|_| ConfigError::InvalidHeader(format!("{}: {}", name, value)))?;
        headers.insert(header_name, header_value);
    }

    Ok(headers)
}
