//! Error taxonomy for locating, extracting and decomposing report tables.
//!
//! Two classes matter to callers:
//! - `NoData`: the feed has nothing for the query (non-trading day, report not
//!   yet published). Recoverable; never a partially filled record.
//! - everything else: a schema or offset defect. Surface loudly.
//!
//! Missing numeric cells are *not* errors; see [`crate::value::Numeric`].

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::axis::Segment;

/// Why a table yielded no data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoDataReason {
    /// The table has no rows at all.
    EmptyTable,
    /// The sentinel header cell did not match.
    HeaderMismatch { expected: String, found: String },
    /// The selected row subset had the wrong size.
    RowCount { expected: String, found: usize },
    /// A raw vector the decomposition needs was never supplied.
    MissingSegment(Segment),
}

impl fmt::Display for NoDataReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTable => write!(f, "table is empty"),
            Self::HeaderMismatch { expected, found } => {
                write!(f, "expected header '{expected}', found '{found}'")
            }
            Self::RowCount { expected, found } => {
                write!(f, "expected {expected} rows, found {found}")
            }
            Self::MissingSegment(segment) => write!(f, "raw segment {segment} is absent"),
        }
    }
}

/// Errors from the locate → extract → decompose pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReportError {
    #[error("no data: {0}")]
    NoData(NoDataReason),

    #[error("shape mismatch in {context}: {left} values vs {right} values")]
    ShapeMismatch {
        context: String,
        left: usize,
        right: usize,
    },

    #[error("field '{0}' is not produced by this decomposition")]
    UnknownField(String),

    #[error("field '{0}' appears twice in the record")]
    DuplicateField(String),

    #[error("segment {0} is derived and cannot be supplied as raw input")]
    DerivedSegmentSupplied(Segment),
}

impl ReportError {
    /// True for the recoverable "nothing published for this date" class.
    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData(_))
    }

    pub fn shape(context: impl Into<String>, left: usize, right: usize) -> Self {
        Self::ShapeMismatch {
            context: context.into(),
            left,
            right,
        }
    }
}

impl From<NoDataReason> for ReportError {
    fn from(reason: NoDataReason) -> Self {
        Self::NoData(reason)
    }
}

/// Load-time validation failures for report schemas.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("schema '{schema}': {message}")]
    Invalid { schema: String, message: String },

    #[error("parse schema TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("read schema file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SchemaError {
    pub(crate) fn invalid(schema: &str, message: impl Into<String>) -> Self {
        Self::Invalid {
            schema: schema.to_string(),
            message: message.into(),
        }
    }
}

/// Tokenization failures when building a [`crate::table::RawTable`].
#[derive(Debug, Error)]
pub enum TableError {
    #[error("CSV tokenization failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON payload section '{key}' is not an array of rows")]
    JsonShape { key: String },
}
