// Configuration validation
//
// Validates that values are present and sensible

use crate::*;
use anyhow::{bail, Result};
use tracing::warn;

const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

pub fn validate_config(config: &RuntimeConfig) -> Result<()> {
    validate_input_config(&config.input)?;
    validate_output_config(&config.output)?;
    validate_archive_config(&config.archive)?;
    validate_logging_config(&config.logging);
    Ok(())
}

fn validate_input_config(config: &InputConfig) -> Result<()> {
    if config.date_formats.iter().any(|f| f.trim().is_empty()) {
        bail!("input.date_formats must not contain empty formats");
    }
    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<()> {
    if config.dir.is_empty() {
        bail!("output.dir must not be empty");
    }
    Ok(())
}

fn validate_archive_config(config: &ArchiveConfig) -> Result<()> {
    if let Some(level) = config.compression_level {
        if !(0..=9).contains(&level) {
            bail!(
                "archive.compression_level must be between 0 and 9, got {}",
                level
            );
        }
    }
    Ok(())
}

fn validate_logging_config(config: &LoggingConfig) {
    // Directives such as "ocrsplit=debug" are passed through to EnvFilter untouched
    let level = config.level.to_lowercase();
    if !level.contains('=') && !LOG_LEVELS.contains(&level.as_str()) {
        warn!(
            level = %config.level,
            "logging.level is not a known level; falling back to info"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_defaults() {
        assert!(validate_config(&RuntimeConfig::default()).is_ok());
    }

    #[test]
    fn test_validate_output_config() {
        let invalid = OutputConfig {
            dir: String::new(),
            ..OutputConfig::default()
        };
        assert!(validate_output_config(&invalid).is_err());
    }

    #[test]
    fn test_validate_archive_config() {
        for level in [0, 6, 9] {
            let config = ArchiveConfig {
                compression_level: Some(level),
            };
            assert!(validate_archive_config(&config).is_ok());
        }
        for level in [-1, 10] {
            let config = ArchiveConfig {
                compression_level: Some(level),
            };
            assert!(validate_archive_config(&config).is_err());
        }
    }

    #[test]
    fn test_validate_input_config() {
        let invalid = InputConfig {
            date_formats: vec!["%Y".to_string(), " ".to_string()],
            ..InputConfig::default()
        };
        assert!(validate_input_config(&invalid).is_err());
    }
}
