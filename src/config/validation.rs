use crate::config::parser::build_header_set;
use crate::config::types::{Config, OutputConfig, ProbeConfig};
use crate::{ConfigError, ConfigResult};

const MAX_WORKERS: usize = 1024;
const MAX_REDIRECT_DEPTH: u32 = 64;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_probe_config(&config.probe)?;
    validate_output_config(&config.output)?;
    build_header_set(config)?;
    Ok(())
}

/// Validates pool and request settings
fn validate_probe_config(config: &ProbeConfig) -> ConfigResult<()> {
    if config.workers < 1 || config.workers > MAX_WORKERS {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and {}, got {}",
            MAX_WORKERS, config.workers
        )));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.max_redirects < 1 || config.max_redirects > MAX_REDIRECT_DEPTH {
        return Err(ConfigError::Validation(format!(
            "max-redirects must be between 1 and {}, got {}",
            MAX_REDIRECT_DEPTH, config.max_redirects
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> ConfigResult<()> {
    if config.save_responses && config.directory.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty when saving responses".to_string(),
        ));
    }

    Ok(())
}
