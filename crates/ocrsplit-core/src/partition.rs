//! Grouping and file synthesis
//!
//! Turns normalized records into named text entries:
//!
//! - `Per Row`: one `YYYY-MM-DD.txt` per record (`unknown.txt` without a date)
//! - `Per Month` / `Per Year`: `2023-07.txt`, `2023.txt`
//! - `Per Newspaper` / `Per Spatial`: sanitized column value + `.txt`
//!
//! Grouped entries are emitted in ascending key order with the missing-key
//! bucket (`unknown`) last. Filenames are unique within one call: repeated
//! base names get `_2`, `_3`, ... before the extension.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::debug;

use crate::error::{Result, SplitError};
use crate::normalize::{NormalizedTable, Record};
use crate::strategy::Strategy;

/// Separator placed between OCR passages that share a file
pub const SEPARATOR: &str = "\n\n---\n\n";

/// Base name used for records whose grouping key is missing
pub const UNKNOWN_KEY: &str = "unknown";

const EXTENSION: &str = ".txt";

/// A named text entry destined for the archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub name: String,
    pub content: String,
}

/// Grouping key; `Unknown` orders after every known key
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum GroupKey<K> {
    Known(K),
    Unknown,
}

/// Build the named entries for `strategy` without packing them.
///
/// Fails with [`SplitError::MissingColumn`] before any grouping when the
/// strategy needs a column the table does not have.
pub fn plan(table: &NormalizedTable, strategy: Strategy) -> Result<Vec<OutputFile>> {
    if let Some(column) = strategy.required_column() {
        if !table.has_column(column) {
            return Err(SplitError::missing_column(column));
        }
    }

    let records = table.records();
    let entries = match strategy {
        Strategy::PerRow => name_entries(records.iter().map(|record| {
            let base = record
                .date()
                .map(|date| date.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| UNKNOWN_KEY.to_string());
            (base, record.ocr_text().to_string())
        })),
        Strategy::PerMonth => grouped(
            records,
            |r| r.month().map(str::to_string),
            |label| label.clone(),
        ),
        Strategy::PerYear => grouped(records, Record::year, |year| year.to_string()),
        Strategy::PerNewspaper => grouped(
            records,
            |r| r.newspaper().map(str::to_string),
            |name| sanitize_filename(name),
        ),
        Strategy::PerSpatial => grouped(
            records,
            |r| r.spatial().map(str::to_string),
            |name| sanitize_filename(name),
        ),
    };

    for entry in &entries {
        debug!(
            strategy = strategy.slug(),
            name = %entry.name,
            bytes = entry.content.len(),
            "Planned archive entry"
        );
    }

    Ok(entries)
}

/// Replace every character that is not alphanumeric, space, `-` or `_` with `_`.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || c == ' ' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Group records by `key` in one pass, then emit one entry per group in
/// ascending key order.
fn grouped<K, FKey, FName>(records: &[Record], key: FKey, base_name: FName) -> Vec<OutputFile>
where
    K: Ord,
    FKey: Fn(&Record) -> Option<K>,
    FName: Fn(&K) -> String,
{
    let mut groups: BTreeMap<GroupKey<K>, Vec<&Record>> = BTreeMap::new();
    for record in records {
        let group_key = key(record).map_or(GroupKey::Unknown, GroupKey::Known);
        groups.entry(group_key).or_default().push(record);
    }

    name_entries(groups.into_iter().map(|(group_key, members)| {
        let base = match &group_key {
            GroupKey::Known(k) => base_name(k),
            GroupKey::Unknown => UNKNOWN_KEY.to_string(),
        };
        (base, join_ocr(&members))
    }))
}

fn join_ocr(records: &[&Record]) -> String {
    records
        .iter()
        .map(|record| record.ocr_text())
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

/// Fold `(base, content)` pairs into entries with unique filenames.
fn name_entries<I>(entries: I) -> Vec<OutputFile>
where
    I: IntoIterator<Item = (String, String)>,
{
    let (_, files) = entries.into_iter().fold(
        (UniqueNames::default(), Vec::new()),
        |(mut names, mut files), (base, content)| {
            let name = names.claim(&base);
            files.push(OutputFile { name, content });
            (names, files)
        },
    );
    files
}

/// Running occurrence count per base name
#[derive(Debug, Default)]
struct UniqueNames {
    counts: HashMap<String, usize>,
    taken: HashSet<String>,
}

impl UniqueNames {
    /// First claim of a base is `base.txt`, later claims are `base_<n>.txt`.
    /// A suffixed candidate that another base already produced is skipped.
    fn claim(&mut self, base: &str) -> String {
        let count = self.counts.entry(base.to_string()).or_insert(0);
        loop {
            *count += 1;
            let candidate = if *count == 1 {
                format!("{}{}", base, EXTENSION)
            } else {
                format!("{}_{}{}", base, count, EXTENSION)
            };
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}
