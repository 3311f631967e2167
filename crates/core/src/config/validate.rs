use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Session TTL and reaper interval are not 0
/// - Download directory and merge format are not empty
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    // Storage validation
    if config.storage.download_dir.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "storage.download_dir cannot be empty".to_string(),
        ));
    }
    if config.storage.ttl_secs == 0 {
        return Err(ConfigError::ValidationError(
            "storage.ttl_secs cannot be 0".to_string(),
        ));
    }
    if config.storage.reap_interval_secs == 0 {
        return Err(ConfigError::ValidationError(
            "storage.reap_interval_secs cannot be 0".to_string(),
        ));
    }

    // Engine validation
    if config.engine.merge_output_format.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "engine.merge_output_format cannot be empty".to_string(),
        ));
    }

    Ok(())
}
