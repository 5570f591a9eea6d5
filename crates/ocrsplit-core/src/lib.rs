// ocrsplit-core - Pure table-to-archive logic
//
// This crate contains the processing logic for splitting an OCR table into
// text files. No filesystem access, no async, no runtime dependencies: input
// arrives through `Read`, output leaves as a byte buffer.
//
// Pipeline: RawTable -> normalize -> NormalizedTable -> plan -> pack -> bytes

pub mod archive;
pub mod error;
pub mod normalize;
pub mod partition;
pub mod strategy;
pub mod table;

// Re-export commonly used types
pub use archive::{pack, unpack, ArchiveOptions};
pub use error::{ErrorCode, Result, SplitError};
pub use normalize::{normalize, DateParser, NormalizedTable, Normalizer, Record};
pub use partition::{plan, sanitize_filename, OutputFile, SEPARATOR, UNKNOWN_KEY};
pub use strategy::Strategy;
pub use table::{Delimiter, RawTable};

/// Partition `table` with `strategy` and pack the result as a ZIP archive.
///
/// Either the complete archive is returned or an error; nothing partial is
/// produced. Fails with [`SplitError::MissingColumn`] when the strategy needs
/// a column the table lacks.
pub fn generate(table: &NormalizedTable, strategy: Strategy) -> Result<Vec<u8>> {
    generate_with(table, strategy, &ArchiveOptions::default())
}

/// [`generate`] with explicit archive options
pub fn generate_with(
    table: &NormalizedTable,
    strategy: Strategy,
    options: &ArchiveOptions,
) -> Result<Vec<u8>> {
    let files = plan(table, strategy)?;
    let bytes = pack(&files, options)?;

    tracing::info!(
        strategy = strategy.slug(),
        rows = table.len(),
        entries = files.len(),
        bytes = bytes.len(),
        "Generated archive"
    );

    Ok(bytes)
}
