use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Environment variables that override file settings
pub const ENV_HOST: &str = "SHELF_HOST";
pub const ENV_PORT: &str = "SHELF_PORT";
pub const ENV_API_KEY: &str = "EXTRACTION_API_KEY";
pub const ENV_BASE_URL: &str = "EXTRACTION_BASE_URL";

/// Loads and parses a configuration file from the given path
///
/// Environment overrides are applied after parsing and before validation.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use shelf_harvest::config::load_config;
///
/// let config = load_config(Path::new("harvest.toml")).unwrap();
/// println!("Batch size: {}", config.extraction.items_per_batch);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    finish(parse_config(&content)?)
}

/// Builds the configuration from built-in defaults plus the environment
pub fn load_default_config() -> Result<Config, ConfigError> {
    finish(Config::default())
}

/// Parses TOML text into a configuration without validating it
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    Ok(toml::from_str(content)?)
}

fn finish(mut config: Config) -> Result<Config, ConfigError> {
    apply_overrides(&mut config, |name| std::env::var(name).ok())?;
    validate(&config)?;
    Ok(config)
}

/// Applies environment-style overrides through the given lookup
///
/// Only the extraction wiring and the bind address can be overridden; none of
/// these affect crawl semantics.
pub fn apply_overrides<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(host) = lookup(ENV_HOST) {
        config.server.host = host;
    }

    if let Some(port) = lookup(ENV_PORT) {
        config.server.port = port.trim().parse().map_err(|e| ConfigError::Env {
            name: ENV_PORT.to_string(),
            message: format!("'{}' is not a port number: {}", port, e),
        })?;
    }

    if let Some(key) = lookup(ENV_API_KEY) {
        config.extraction.api_key = key;
    }

    if let Some(base_url) = lookup(ENV_BASE_URL) {
        config.extraction.base_url = base_url;
    }

    Ok(())
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so a running server can be matched to the file it loaded.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}
