//! Table normalization: required column checks, date parsing and derived keys
//!
//! Row-level date failures are tolerated: an unparseable date becomes missing
//! and so do the `year` and `month` derived from it. Only the absence of a
//! required column fails the whole table.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use tracing::{debug, warn};

use crate::error::{Result, SplitError};
use crate::table::RawTable;

pub const OCR_COLUMN: &str = "ocr";
pub const DATE_COLUMN: &str = "date";
pub const NEWSPAPER_COLUMN: &str = "newspaper";
pub const SPATIAL_COLUMN: &str = "spatial";

/// Date + time layouts, the time part is discarded.
const DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const DATE_FORMATS: [&str; 9] = [
    "%Y-%m-%d", "%Y/%m/%d", "%Y%m%d", "%m/%d/%Y", "%d.%m.%Y", "%B %d, %Y", "%b %d, %Y", "%d %B %Y",
    "%d %b %Y",
];

/// One normalized input row.
///
/// `year` and `month` are derived in [`Record::new`] and cannot be set
/// independently of `date`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    ocr: Option<String>,
    date: Option<NaiveDate>,
    newspaper: Option<String>,
    spatial: Option<String>,
    year: Option<i32>,
    month: Option<String>,
}

impl Record {
    pub fn new(
        ocr: Option<String>,
        date: Option<NaiveDate>,
        newspaper: Option<String>,
        spatial: Option<String>,
    ) -> Self {
        Self {
            ocr,
            date,
            newspaper,
            spatial,
            year: date.map(|d| d.year()),
            month: date.map(month_label),
        }
    }

    pub fn ocr(&self) -> Option<&str> {
        self.ocr.as_deref()
    }

    /// OCR body as written to output files, empty when missing
    pub fn ocr_text(&self) -> &str {
        self.ocr.as_deref().unwrap_or_default()
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }

    /// `YYYY-MM` label of the parsed date
    pub fn month(&self) -> Option<&str> {
        self.month.as_deref()
    }

    pub fn newspaper(&self) -> Option<&str> {
        self.newspaper.as_deref()
    }

    pub fn spatial(&self) -> Option<&str> {
        self.spatial.as_deref()
    }
}

/// Format a date as a four digit year, hyphen, two digit month.
pub fn month_label(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Normalized records plus which optional grouping columns the source had
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedTable {
    records: Vec<Record>,
    has_newspaper: bool,
    has_spatial: bool,
}

impl NormalizedTable {
    pub fn new(records: Vec<Record>, has_newspaper: bool, has_spatial: bool) -> Self {
        Self {
            records,
            has_newspaper,
            has_spatial,
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether the source table carried `column`.
    pub fn has_column(&self, column: &str) -> bool {
        match column {
            OCR_COLUMN | DATE_COLUMN => true,
            NEWSPAPER_COLUMN => self.has_newspaper,
            SPATIAL_COLUMN => self.has_spatial,
            _ => false,
        }
    }
}

/// Free-form date parser.
///
/// Tries caller supplied chrono formats first, then RFC 3339, then a fixed
/// list of common date and date-time layouts, then bare `YYYY-MM` and `YYYY`.
#[derive(Debug, Clone, Default)]
pub struct DateParser {
    custom_formats: Vec<String>,
}

impl DateParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_formats<I, S>(formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            custom_formats: formats.into_iter().map(Into::into).collect(),
        }
    }

    pub fn parse(&self, raw: &str) -> Option<NaiveDate> {
        let value = raw.trim();
        if value.is_empty() {
            return None;
        }

        for format in &self.custom_formats {
            if let Some(date) = parse_with_format(value, format) {
                return Some(date);
            }
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Some(dt.date_naive());
        }

        DATETIME_FORMATS
            .iter()
            .chain(DATE_FORMATS.iter())
            .find_map(|format| parse_with_format(value, format))
            .or_else(|| parse_partial(value))
    }
}

fn parse_with_format(value: &str, format: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, format)
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, format)
                .ok()
                .map(|dt| dt.date())
        })
}

/// `YYYY-MM` resolves to the first of the month, `YYYY` to 1 January.
fn parse_partial(value: &str) -> Option<NaiveDate> {
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

    match value.split_once('-') {
        Some((year, month)) if year.len() == 4 && all_digits(year) && all_digits(month) => {
            NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)
        }
        None if value.len() == 4 && all_digits(value) => {
            NaiveDate::from_ymd_opt(value.parse().ok()?, 1, 1)
        }
        _ => None,
    }
}

/// Validates required columns and derives per-row date keys
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    dates: DateParser,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalizer that tries `formats` (chrono syntax) before the built-in layouts
    pub fn with_formats<I, S>(formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            dates: DateParser::with_formats(formats),
        }
    }

    pub fn normalize(&self, table: &RawTable) -> Result<NormalizedTable> {
        for column in [OCR_COLUMN, DATE_COLUMN] {
            if !table.has_column(column) {
                return Err(SplitError::missing_column(column));
            }
        }

        let mut unparsed = 0usize;
        let records: Vec<Record> = table
            .rows()
            .map(|row| {
                let raw_date = row.get(DATE_COLUMN);
                let date = raw_date.and_then(|raw| self.dates.parse(raw));
                if raw_date.is_some() && date.is_none() {
                    unparsed += 1;
                }
                Record::new(
                    row.get(OCR_COLUMN).map(str::to_string),
                    date,
                    row.get(NEWSPAPER_COLUMN).map(str::to_string),
                    row.get(SPATIAL_COLUMN).map(str::to_string),
                )
            })
            .collect();

        if unparsed > 0 {
            warn!(
                unparsed,
                rows = records.len(),
                "Some dates could not be parsed; treating them as missing"
            );
        }

        let normalized = NormalizedTable::new(
            records,
            table.has_column(NEWSPAPER_COLUMN),
            table.has_column(SPATIAL_COLUMN),
        );
        debug!(
            rows = normalized.len(),
            newspaper = normalized.has_newspaper,
            spatial = normalized.has_spatial,
            "Normalized table"
        );
        Ok(normalized)
    }
}

/// Normalize with the built-in date layouts.
pub fn normalize(table: &RawTable) -> Result<NormalizedTable> {
    Normalizer::default().normalize(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Delimiter;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn table(input: &str) -> RawTable {
        RawTable::from_reader(input.as_bytes(), Delimiter::Comma).unwrap()
    }

    #[test]
    fn test_missing_ocr_column() {
        let err = normalize(&table("text,date\na,2023-01-01\n")).unwrap_err();
        assert_eq!(err.missing_column_name(), Some("ocr"));
    }

    #[test]
    fn test_missing_date_column() {
        let err = normalize(&table("ocr,when\na,2023-01-01\n")).unwrap_err();
        assert_eq!(err.missing_column_name(), Some("date"));
    }

    #[test]
    fn test_ocr_checked_before_date() {
        let err = normalize(&table("body,when\na,b\n")).unwrap_err();
        assert_eq!(err.missing_column_name(), Some("ocr"));
    }

    #[test]
    fn test_derives_year_and_month() {
        let normalized = normalize(&table("ocr,date\na,2023-07-09\nb,not a date\nc,\n")).unwrap();
        let records = normalized.records();

        assert_eq!(records[0].date(), Some(ymd(2023, 7, 9)));
        assert_eq!(records[0].year(), Some(2023));
        assert_eq!(records[0].month(), Some("2023-07"));

        for record in &records[1..] {
            assert_eq!(record.date(), None);
            assert_eq!(record.year(), None);
            assert_eq!(record.month(), None);
        }
    }

    #[test]
    fn test_optional_columns_pass_through() {
        let normalized =
            normalize(&table("ocr,date,newspaper\na,2023-07-09,Herald\n")).unwrap();
        assert!(normalized.has_column(NEWSPAPER_COLUMN));
        assert!(!normalized.has_column(SPATIAL_COLUMN));
        assert_eq!(normalized.records()[0].newspaper(), Some("Herald"));
        assert_eq!(normalized.records()[0].spatial(), None);
    }

    #[test]
    fn test_missing_ocr_renders_empty() {
        let normalized = normalize(&table("ocr,date\n,2023-07-09\n")).unwrap();
        assert_eq!(normalized.records()[0].ocr(), None);
        assert_eq!(normalized.records()[0].ocr_text(), "");
    }

    #[test]
    fn test_date_layouts() {
        let parser = DateParser::new();
        let expected = Some(ymd(1901, 2, 3));

        for raw in [
            "1901-02-03",
            " 1901-02-03 ",
            "1901/02/03",
            "19010203",
            "02/03/1901",
            "03.02.1901",
            "February 3, 1901",
            "Feb 3, 1901",
            "3 February 1901",
            "1901-02-03 10:15:00",
            "1901-02-03T10:15:00.250",
            "1901-02-03 10:15",
            "1901-02-03T10:15:00+02:00",
        ] {
            assert_eq!(parser.parse(raw), expected, "failed to parse {:?}", raw);
        }

        assert_eq!(parser.parse("1901-02"), Some(ymd(1901, 2, 1)));
        assert_eq!(parser.parse("1901"), Some(ymd(1901, 1, 1)));
    }

    #[test]
    fn test_unparseable_dates() {
        let parser = DateParser::new();
        for raw in ["", "   ", "yesterday", "1901-13-01", "1901-02-30", "12345", "1901-xx"] {
            assert_eq!(parser.parse(raw), None, "unexpectedly parsed {:?}", raw);
        }
    }

    #[test]
    fn test_timezone_keeps_local_calendar_date() {
        let parser = DateParser::new();
        assert_eq!(
            parser.parse("2023-07-01T23:30:00-05:00"),
            Some(ymd(2023, 7, 1))
        );
    }

    #[test]
    fn test_custom_formats_take_priority() {
        let normalizer = Normalizer::with_formats(["%d/%m/%Y"]);
        let normalized = normalizer.normalize(&table("ocr,date\na,02/03/1901\n")).unwrap();
        assert_eq!(normalized.records()[0].date(), Some(ymd(1901, 3, 2)));

        let default = normalize(&table("ocr,date\na,02/03/1901\n")).unwrap();
        assert_eq!(default.records()[0].date(), Some(ymd(1901, 2, 3)));
    }

    #[test]
    fn test_month_label_pads() {
        assert_eq!(month_label(ymd(1899, 1, 31)), "1899-01");
        assert_eq!(month_label(ymd(2023, 12, 1)), "2023-12");
    }
}
