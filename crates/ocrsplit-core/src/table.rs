//! Raw delimited table loading
//!
//! A [`RawTable`] is the untyped view of the uploaded CSV/TSV file: ordered
//! column names plus rows of optional string cells. Nothing is interpreted
//! here beyond recognising missing values.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

/// Cell values read as "missing", in addition to the empty cell.
const NA_TOKENS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>",
    "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Field delimiter of the input table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Delimiter {
    Comma,
    Tab,
}

impl Delimiter {
    /// Pick the delimiter from the file extension: `.tsv` is tab separated,
    /// everything else is treated as CSV.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("tsv") => Delimiter::Tab,
            _ => Delimiter::Comma,
        }
    }

    pub fn as_byte(self) -> u8 {
        match self {
            Delimiter::Comma => b',',
            Delimiter::Tab => b'\t',
        }
    }
}

impl std::fmt::Display for Delimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Delimiter::Comma => write!(f, "comma"),
            Delimiter::Tab => write!(f, "tab"),
        }
    }
}

impl std::str::FromStr for Delimiter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "comma" | "csv" | "," => Ok(Delimiter::Comma),
            "tab" | "tsv" | "\\t" | "\t" => Ok(Delimiter::Tab),
            _ => Err(format!(
                "Unsupported delimiter: {}. Supported: comma, tab",
                s
            )),
        }
    }
}

/// In-memory delimited table with named columns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    /// Build a table from column names and rows of cells.
    ///
    /// Rows shorter than the header are padded with missing cells, longer rows
    /// are truncated.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, None);
                row
            })
            .collect();
        Self { columns, rows }
    }

    /// Read a header row followed by data rows from `reader`.
    pub fn from_reader<R: Read>(reader: R, delimiter: Delimiter) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(delimiter.as_byte())
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let columns: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            rows.push(record.iter().map(parse_cell).collect());
        }

        tracing::debug!(
            columns = columns.len(),
            rows = rows.len(),
            %delimiter,
            "Loaded raw table"
        );

        Ok(Self::new(columns, rows))
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate rows in input order
    pub fn rows(&self) -> impl Iterator<Item = RawRow<'_>> {
        self.rows.iter().map(move |values| RawRow {
            columns: &self.columns,
            values,
        })
    }

    /// The first `n` rows, for previews
    pub fn head(&self, n: usize) -> impl Iterator<Item = RawRow<'_>> {
        self.rows().take(n)
    }
}

/// Borrowed view of one table row
#[derive(Debug, Clone, Copy)]
pub struct RawRow<'a> {
    columns: &'a [String],
    values: &'a [Option<String>],
}

impl<'a> RawRow<'a> {
    /// Cell value for `column`, `None` when the column is absent or the cell is missing.
    pub fn get(&self, column: &str) -> Option<&'a str> {
        let index = self.columns.iter().position(|c| c == column)?;
        self.values.get(index)?.as_deref()
    }

    pub fn values(&self) -> &'a [Option<String>] {
        self.values
    }
}

fn parse_cell(raw: &str) -> Option<String> {
    if raw.is_empty() || NA_TOKENS.contains(&raw) {
        None
    } else {
        Some(raw.to_string())
    }
}
