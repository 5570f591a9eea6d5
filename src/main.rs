use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ocrsplit_config::RuntimeConfig;
use ocrsplit_core::Strategy;
use std::path::PathBuf;

/// Split a CSV/TSV table of OCR text into a ZIP archive of text files
#[derive(Parser)]
#[command(name = "ocrsplit")]
#[command(version)]
#[command(about = "Split a CSV/TSV table of OCR text into a ZIP archive of text files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short = 'v', long, value_name = "LEVEL", global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Split the table into ocr_split_<strategy>.zip
    Split {
        /// Input table (.csv or .tsv)
        input: PathBuf,

        /// per_row, per_month, per_year, per_newspaper or per_spatial
        #[arg(short, long, value_name = "STRATEGY")]
        strategy: Option<Strategy>,

        /// Directory the archive is written to (overrides config file)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Print the archive entry names instead of writing the archive
        #[arg(long)]
        list: bool,
    },
    /// Show the row count and the first rows of the table
    Preview {
        /// Input table (.csv or .tsv)
        input: PathBuf,

        /// Number of rows to show
        #[arg(short = 'n', long, default_value_t = 5)]
        rows: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Step 1: Load base configuration
    let mut config = if let Some(config_path) = &cli.config {
        RuntimeConfig::load_from_path(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else {
        RuntimeConfig::load().context("Failed to load configuration")?
    };

    // Step 2: Apply CLI overrides (highest priority)
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }

    // Step 3: Initialize tracing
    ocrsplit::init_tracing(&config);

    match cli.command {
        Commands::Split {
            input,
            strategy,
            output,
            list,
        } => {
            if let Some(output) = output {
                config.output.dir = output.to_string_lossy().to_string();
            }
            let strategy = strategy.unwrap_or(config.output.strategy);
            config.validate()?;

            if list {
                for name in ocrsplit::list_entries(&config, &input, strategy)? {
                    println!("{}", name);
                }
            } else {
                let outcome = ocrsplit::split_file(&config, &input, strategy)?;
                println!("{}", outcome.archive_path.display());
            }
        }
        Commands::Preview { input, rows } => {
            let table = ocrsplit::load_table(&input, &config)?;
            print!("{}", ocrsplit::preview(&table, rows));
        }
    }

    Ok(())
}
