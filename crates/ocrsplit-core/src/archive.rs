//! ZIP packing of planned entries
//!
//! Every entry is deflate-compressed with a fixed timestamp and mode, so the
//! same entries always produce the same archive bytes.

use std::io::{Cursor, Read, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::Result;
use crate::partition::OutputFile;

/// Archive tuning knobs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArchiveOptions {
    /// Deflate level 0..=9, `None` uses the zip crate default
    pub compression_level: Option<i64>,
}

/// Serialize `files` into an in-memory ZIP archive, one entry per file, in order.
pub fn pack(files: &[OutputFile], options: &ArchiveOptions) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    for file in files {
        zip.start_file(file.name.as_str(), entry_options(options))?;
        zip.write_all(file.content.as_bytes())?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

/// Read every entry of an archive produced by [`pack`] back into memory.
pub fn unpack(bytes: &[u8]) -> Result<Vec<OutputFile>> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut files = Vec::with_capacity(archive.len());

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let mut content = String::new();
        entry.read_to_string(&mut content)?;
        files.push(OutputFile {
            name: entry.name().to_string(),
            content,
        });
    }

    Ok(files)
}

fn entry_options(options: &ArchiveOptions) -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(options.compression_level)
        .last_modified_time(zip::DateTime::default())
        .unix_permissions(0o644)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, content: &str) -> OutputFile {
        OutputFile {
            name: name.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_pack_keeps_entries_separate() {
        let files = vec![
            file("2023-07.txt", "A\n\n---\n\nB"),
            file("unknown.txt", ""),
            file("Zürich.txt", "grüezi"),
        ];

        let bytes = pack(&files, &ArchiveOptions::default()).unwrap();
        assert_eq!(&bytes[..2], b"PK");
        assert_eq!(unpack(&bytes).unwrap(), files);
    }

    #[test]
    fn test_pack_uses_deflate() {
        let files = vec![file("big.txt", &"newsprint ".repeat(1_000))];
        let bytes = pack(&files, &ArchiveOptions::default()).unwrap();

        let mut archive = ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        let entry = archive.by_index(0).unwrap();
        assert_eq!(entry.compression(), CompressionMethod::Deflated);
        assert!(entry.compressed_size() < entry.size());
    }

    #[test]
    fn test_pack_is_deterministic() {
        let files = vec![file("a.txt", "one"), file("b.txt", "two")];
        let options = ArchiveOptions {
            compression_level: Some(9),
        };

        let first = pack(&files, &options).unwrap();
        let second = pack(&files, &options).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_pack_empty() {
        let bytes = pack(&[], &ArchiveOptions::default()).unwrap();
        assert!(unpack(&bytes).unwrap().is_empty());
    }
}
