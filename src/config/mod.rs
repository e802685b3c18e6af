mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Largest synthesized seek table accepted from configuration.
pub const MAX_SEEK_TABLE_SIZE: usize = 65_536;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = ["./flacseek.toml", "~/.config/flacseek/config.toml"];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.stream.seek_table_size > MAX_SEEK_TABLE_SIZE {
        anyhow::bail!(
            "seek_table_size {} exceeds the maximum of {}",
            config.stream.seek_table_size,
            MAX_SEEK_TABLE_SIZE
        );
    }

    if config.logging.filter.trim().is_empty() {
        anyhow::bail!("Logging filter cannot be empty");
    }

    tracing_subscriber::EnvFilter::try_new(&config.logging.filter)
        .with_context(|| format!("Invalid logging filter: {:?}", config.logging.filter))?;

    Ok(())
}

/// Settings that are valid but likely unintended.
///
/// Callers log these once a tracing subscriber is installed.
pub fn config_warnings(config: &Config) -> Vec<String> {
    let mut warnings = Vec::new();
    if config.stream.seek_table_size == 0 {
        warnings.push("seek_table_size is 0, seek table synthesis is disabled".to_string());
    }
    warnings
}
