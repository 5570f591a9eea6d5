//! Error types for the ocrsplit core crate

use thiserror::Error;

/// Error codes for programmatic handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// E001: A column required by the requested operation is absent
    E001MissingColumn,
    /// E002: The delimited input could not be read as a table
    E002MalformedTable,
    /// E003: Archive serialization failed
    E003ArchiveFailure,
    /// E004: I/O failure while buffering output
    E004Io,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::E001MissingColumn => "E001",
            Self::E002MalformedTable => "E002",
            Self::E003ArchiveFailure => "E003",
            Self::E004Io => "E004",
        }
    }
}

/// Errors that can occur while loading, normalizing or packing a table
#[derive(Debug, Error)]
pub enum SplitError {
    /// A required column is absent from the table
    #[error("[E001] The file must contain a '{column}' column")]
    MissingColumn {
        /// Name of the absent column
        column: String,
    },

    /// Input could not be parsed as a delimited table
    #[error("[E002] Malformed table: {0}")]
    MalformedTable(#[from] csv::Error),

    /// Zip writer failed
    #[error("[E003] Archive write failed: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("[E004] I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SplitError {
    /// Create a missing column error
    pub fn missing_column(column: impl Into<String>) -> Self {
        Self::MissingColumn {
            column: column.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::MissingColumn { .. } => ErrorCode::E001MissingColumn,
            Self::MalformedTable(_) => ErrorCode::E002MalformedTable,
            Self::Archive(_) => ErrorCode::E003ArchiveFailure,
            Self::Io(_) => ErrorCode::E004Io,
        }
    }

    /// Name of the missing column, if this is a missing column error
    pub fn missing_column_name(&self) -> Option<&str> {
        match self {
            Self::MissingColumn { column } => Some(column),
            _ => None,
        }
    }
}

/// Result type alias for SplitError
pub type Result<T> = std::result::Result<T, SplitError>;
