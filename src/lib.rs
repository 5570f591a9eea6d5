// ocrsplit - command line front end for the OCR table splitter
//
// Reads a CSV/TSV file from disk, runs it through ocrsplit-core and writes
// the resulting archive next to the configured output directory. All table
// logic lives in ocrsplit-core; this crate only does file I/O and reporting.

use anyhow::{Context, Result};
use ocrsplit_config::RuntimeConfig;
use ocrsplit_core::{generate_with, plan, RawTable, Strategy};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

mod init;

pub use init::init_tracing;

/// Width at which preview cells are truncated
const PREVIEW_CELL_WIDTH: usize = 40;

/// Summary of a written archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitOutcome {
    pub archive_path: PathBuf,
    pub rows: usize,
    pub bytes: usize,
}

/// Load a CSV/TSV file using the configured (or extension derived) delimiter.
pub fn load_table(path: &Path, config: &RuntimeConfig) -> Result<RawTable> {
    let delimiter = config.input.delimiter.resolve(path);
    debug!("Reading {} as {} separated table", path.display(), delimiter);

    let file =
        File::open(path).with_context(|| format!("Failed to open input: {}", path.display()))?;
    let table = RawTable::from_reader(BufReader::new(file), delimiter)
        .with_context(|| format!("Failed to read table: {}", path.display()))?;

    info!("Loaded {} rows from '{}'", table.len(), path.display());
    Ok(table)
}

/// Split `input` with `strategy` and write `ocr_split_<strategy>.zip` into the
/// configured output directory.
///
/// The archive is generated completely in memory before anything is written,
/// then moved into place, so a failed run never leaves a partial archive.
pub fn split_file(config: &RuntimeConfig, input: &Path, strategy: Strategy) -> Result<SplitOutcome> {
    let raw = load_table(input, config)?;
    let table = config.normalizer().normalize(&raw)?;
    let bytes = generate_with(&table, strategy, &config.archive.options())?;

    let output_dir = PathBuf::from(&config.output.dir);
    fs::create_dir_all(&output_dir).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            output_dir.display()
        )
    })?;

    let archive_path = output_dir.join(strategy.archive_name());
    let partial_path = output_dir.join(format!("{}.partial", strategy.archive_name()));
    fs::write(&partial_path, &bytes)
        .with_context(|| format!("Failed to write archive: {}", partial_path.display()))?;
    fs::rename(&partial_path, &archive_path)
        .with_context(|| format!("Failed to move archive into place: {}", archive_path.display()))?;

    info!(
        "✓ Wrote {} rows to '{}' ({}, {} bytes)",
        table.len(),
        archive_path.display(),
        strategy,
        bytes.len()
    );

    Ok(SplitOutcome {
        archive_path,
        rows: table.len(),
        bytes: bytes.len(),
    })
}

/// Entry names `split_file` would write, without building the archive.
pub fn list_entries(config: &RuntimeConfig, input: &Path, strategy: Strategy) -> Result<Vec<String>> {
    let raw = load_table(input, config)?;
    let table = config.normalizer().normalize(&raw)?;
    Ok(plan(&table, strategy)?
        .into_iter()
        .map(|file| file.name)
        .collect())
}

/// Render the row count and the first `rows` rows as tab separated text.
pub fn preview(table: &RawTable, rows: usize) -> String {
    let mut out = format!("Loaded {} rows\n", table.len());
    out.push_str(&table.columns().join("\t"));
    out.push('\n');

    for row in table.head(rows) {
        let cells: Vec<String> = row
            .values()
            .iter()
            .map(|cell| preview_cell(cell.as_deref()))
            .collect();
        out.push_str(&cells.join("\t"));
        out.push('\n');
    }
    out
}

fn preview_cell(cell: Option<&str>) -> String {
    let Some(value) = cell else {
        return String::new();
    };
    let flat = value.replace(['\n', '\r', '\t'], " ");
    if flat.chars().count() > PREVIEW_CELL_WIDTH {
        let truncated: String = flat.chars().take(PREVIEW_CELL_WIDTH - 1).collect();
        format!("{}…", truncated)
    } else {
        flat
    }
}
