use super::{DelimiterSetting, LogFormat, RuntimeConfig};
use anyhow::{anyhow, Context, Result};
use ocrsplit_core::Strategy;

pub const ENV_PREFIX: &str = "OCRSPLIT_";

/// Abstraction over environment-variable lookups so tests can supply their
/// own source of overrides.
pub trait EnvSource {
    /// Get a variable by its key without the `OCRSPLIT_` prefix
    fn get(&self, key: &str) -> Option<String>;
}

/// Apply environment-variable overrides (highest priority) to the runtime config.
pub fn apply_env_overrides<E: EnvSource>(config: &mut RuntimeConfig, env: &E) -> Result<()> {
    // Input
    if let Some(delimiter) = get_env_string(env, "DELIMITER") {
        config.input.delimiter = delimiter
            .parse::<DelimiterSetting>()
            .context("Invalid OCRSPLIT_DELIMITER value")?;
    }
    if let Some(formats) = get_env_string(env, "DATE_FORMATS") {
        config.input.date_formats = formats
            .split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .collect();
    }

    // Output
    if let Some(dir) = get_env_string(env, "OUTPUT_DIR") {
        config.output.dir = dir;
    }
    if let Some(strategy) = get_env_string(env, "STRATEGY") {
        config.output.strategy = strategy
            .parse::<Strategy>()
            .map_err(|e| anyhow!("Invalid {}STRATEGY value: {}", ENV_PREFIX, e))?;
    }

    // Archive
    if let Some(val) = get_env_i64(env, "COMPRESSION_LEVEL")? {
        config.archive.compression_level = Some(val);
    }

    // Logging
    if let Some(level) = get_env_string(env, "LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(format) = get_env_string(env, "LOG_FORMAT") {
        config.logging.format = match format.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Text,
        };
    }

    Ok(())
}

fn get_env_string<E: EnvSource>(env: &E, key: &str) -> Option<String> {
    env.get(key)
}

fn get_env_i64<E: EnvSource>(env: &E, key: &str) -> Result<Option<i64>> {
    match get_env_string(env, key) {
        Some(val) => {
            let parsed = val
                .parse::<i64>()
                .map_err(|e| anyhow!("Failed to parse {}{}: {}", ENV_PREFIX, key, e))?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}
