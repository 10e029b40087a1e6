use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Loads, parses, and validates the configuration file at `path`
///
/// # Returns
///
/// * `Ok(Config)` - Validated configuration with defaults filled in
/// * `Err(ConfigError)` - Failed to read, parse, or validate the file
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use vitrina::config::load_config;
///
/// let config = load_config(Path::new("vitrina.toml")).unwrap();
/// println!("Snapshot goes to: {}", config.output.snapshot_path);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}
