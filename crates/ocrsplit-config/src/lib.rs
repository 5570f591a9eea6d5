// ocrsplit-config - Runtime configuration for the ocrsplit CLI
//
// Supports configuration from multiple sources:
// 1. Environment variables (highest priority)
// 2. Config file path from OCRSPLIT_CONFIG env var
// 3. Config file contents from OCRSPLIT_CONFIG_CONTENT env var
// 4. Default config file locations (./config.toml, ./.ocrsplit.toml)
// 5. Built-in defaults (lowest priority)
//
// Command line flags are applied on top by the binary.

use anyhow::Result;
use ocrsplit_core::{ArchiveOptions, Delimiter, Normalizer, Strategy};
use serde::{Deserialize, Serialize};
use std::path::Path;

mod env_overrides;
mod sources;
mod validation;

pub use env_overrides::{apply_env_overrides, EnvSource, ENV_PREFIX};

/// Main runtime configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub archive: ArchiveConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// How the uploaded table is read
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(default)]
    pub delimiter: DelimiterSetting,

    /// Extra chrono date formats tried before the built-in layouts
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub date_formats: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DelimiterSetting {
    /// `.tsv` files are tab separated, everything else is comma separated
    #[default]
    Auto,
    Comma,
    Tab,
}

impl DelimiterSetting {
    /// Resolve the delimiter for a concrete input file
    pub fn resolve(&self, path: impl AsRef<Path>) -> Delimiter {
        match self {
            DelimiterSetting::Auto => Delimiter::from_path(path),
            DelimiterSetting::Comma => Delimiter::Comma,
            DelimiterSetting::Tab => Delimiter::Tab,
        }
    }
}

impl std::fmt::Display for DelimiterSetting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DelimiterSetting::Auto => write!(f, "auto"),
            DelimiterSetting::Comma => write!(f, "comma"),
            DelimiterSetting::Tab => write!(f, "tab"),
        }
    }
}

impl std::str::FromStr for DelimiterSetting {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "auto" | "extension" => Ok(DelimiterSetting::Auto),
            "comma" | "csv" => Ok(DelimiterSetting::Comma),
            "tab" | "tsv" => Ok(DelimiterSetting::Tab),
            _ => anyhow::bail!("Unsupported delimiter: {}. Supported: auto, comma, tab", s),
        }
    }
}

/// Where and how the archive is produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: String,

    #[serde(default = "default_strategy")]
    pub strategy: Strategy,
}

fn default_output_dir() -> String {
    ".".to_string()
}

fn default_strategy() -> Strategy {
    Strategy::PerRow
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            strategy: default_strategy(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArchiveConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compression_level: Option<i64>,
}

impl ArchiveConfig {
    pub fn options(&self) -> ArchiveOptions {
        ArchiveOptions {
            compression_level: self.compression_level,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

impl RuntimeConfig {
    /// Load configuration from all sources with priority
    pub fn load() -> Result<Self> {
        sources::load_config()
    }

    /// Load configuration from an explicit file (CLI `--config`), then apply
    /// environment overrides.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        sources::load_from_file_path(path)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }

    /// Table normalizer honouring the configured date formats
    pub fn normalizer(&self) -> Normalizer {
        Normalizer::with_formats(self.input.date_formats.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delimiter_setting_from_str() {
        assert_eq!(
            "auto".parse::<DelimiterSetting>().unwrap(),
            DelimiterSetting::Auto
        );
        assert_eq!(
            "TSV".parse::<DelimiterSetting>().unwrap(),
            DelimiterSetting::Tab
        );
        assert_eq!(
            "comma".parse::<DelimiterSetting>().unwrap(),
            DelimiterSetting::Comma
        );
        assert!("semicolon".parse::<DelimiterSetting>().is_err());
    }

    #[test]
    fn test_delimiter_resolution() {
        assert_eq!(DelimiterSetting::Auto.resolve("a.tsv"), Delimiter::Tab);
        assert_eq!(DelimiterSetting::Auto.resolve("a.csv"), Delimiter::Comma);
        assert_eq!(DelimiterSetting::Tab.resolve("a.csv"), Delimiter::Tab);
        assert_eq!(DelimiterSetting::Comma.resolve("a.tsv"), Delimiter::Comma);
    }

    #[test]
    fn test_default_configs() {
        let config = RuntimeConfig::default();
        assert_eq!(config.input.delimiter, DelimiterSetting::Auto);
        assert!(config.input.date_formats.is_empty());
        assert_eq!(config.output.dir, ".");
        assert_eq!(config.output.strategy, Strategy::PerRow);
        assert_eq!(config.archive.compression_level, None);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Text);
    }

    #[test]
    fn test_parse_toml() {
        let config: RuntimeConfig = toml::from_str(
            r#"
            [input]
            delimiter = "tab"
            date_formats = ["%d/%m/%Y"]

            [output]
            strategy = "per_newspaper"

            [archive]
            compression_level = 9

            [logging]
            level = "debug"
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.input.delimiter, DelimiterSetting::Tab);
        assert_eq!(config.input.date_formats, vec!["%d/%m/%Y".to_string()]);
        assert_eq!(config.output.dir, ".");
        assert_eq!(config.output.strategy, Strategy::PerNewspaper);
        assert_eq!(config.archive.options().compression_level, Some(9));
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_normalizer_uses_date_formats() {
        use ocrsplit_core::RawTable;

        let mut config = RuntimeConfig::default();
        config.input.date_formats = vec!["%d/%m/%Y".to_string()];

        let table = RawTable::new(
            vec!["ocr".to_string(), "date".to_string()],
            vec![vec![Some("x".to_string()), Some("02/03/1901".to_string())]],
        );
        let normalized = config.normalizer().normalize(&table).unwrap();
        assert_eq!(normalized.records()[0].month(), Some("1901-03"));
    }
}
