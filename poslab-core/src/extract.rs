//! Field Extractor: slices a row at fixed offsets and coerces each cell.
//!
//! Offsets are part of each report's format contract. They live in
//! [`crate::schema::ReportSchema`] as a [`ColumnSpan`] bound to an ordered
//! [`FieldLayout`], so an off-by-one shows up as a `ShapeMismatch` at bind
//! time instead of silently shifting every derived field.

use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::error::ReportError;
use crate::table::Row;
use crate::value::{Numeric, NumericVector};

// ─── Numeric coercion ────────────────────────────────────────────────

/// Text → number coercion. Failure is a missing marker, never an error.
pub trait CellParser: Send + Sync {
    fn parse_cell(&self, text: &str) -> Numeric;
}

/// Parser for exchange exports: `1,234`, `-56`, `0.85`. Blank cells and
/// dash placeholders are missing.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocaleNumberParser;

const MISSING_TOKENS: [&str; 5] = ["-", "--", "—", "N/A", "NaN"];

impl CellParser for LocaleNumberParser {
    fn parse_cell(&self, text: &str) -> Numeric {
        let text = text.trim();
        if text.is_empty() || MISSING_TOKENS.iter().any(|t| t.eq_ignore_ascii_case(text)) {
            return Numeric::Missing;
        }
        let cleaned: String = text.chars().filter(|c| *c != ',').collect();
        cleaned
            .parse::<f64>()
            .map_or(Numeric::Missing, Numeric::new)
    }
}

// ─── Column spans ────────────────────────────────────────────────────

/// Which cells of a row make up the numeric run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnSpan {
    /// `[start, end)`.
    Range { start: usize, end: usize },
    /// `[start, len - skip_last)`; trailing columns often hold an unrelated
    /// aggregate such as total market open interest.
    From {
        start: usize,
        #[serde(default)]
        skip_last: usize,
    },
    /// The last `count` cells.
    Tail { count: usize },
}

impl ColumnSpan {
    pub const fn from(start: usize) -> Self {
        ColumnSpan::From { start, skip_last: 0 }
    }

    /// Cell indices for a row of `width` cells, clamped to the row.
    pub fn bounds(&self, width: usize) -> Range<usize> {
        let (start, end) = match *self {
            ColumnSpan::Range { start, end } => (start, end.min(width)),
            ColumnSpan::From { start, skip_last } => (start, width.saturating_sub(skip_last)),
            ColumnSpan::Tail { count } => (width.saturating_sub(count), width),
        };
        start.min(end)..end
    }

    /// Width independent of the row, when the span fixes one.
    pub fn fixed_width(&self) -> Option<usize> {
        match *self {
            ColumnSpan::Range { start, end } => Some(end.saturating_sub(start)),
            ColumnSpan::Tail { count } => Some(count),
            ColumnSpan::From { .. } => None,
        }
    }
}

/// Slice `row` by `span` and coerce every cell.
pub fn extract(row: &Row, span: &ColumnSpan, parser: &dyn CellParser) -> NumericVector {
    row.cells()[span.bounds(row.len())]
        .iter()
        .map(|cell| parser.parse_cell(cell))
        .collect()
}

// ─── Field layouts ───────────────────────────────────────────────────

/// Named fields bound to a row's extracted values, in layout order.
pub type FieldValues = Vec<(String, Numeric)>;

/// Ordered field names for one extracted vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldLayout {
    names: Vec<String>,
}

impl FieldLayout {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Pair each value with its field name. The vector must be exactly as
    /// long as the layout.
    pub fn bind(&self, vector: &NumericVector) -> Result<FieldValues, ReportError> {
        if vector.len() != self.len() {
            return Err(ReportError::shape("field layout", self.len(), vector.len()));
        }
        Ok(self.names.iter().cloned().zip(vector.iter()).collect())
    }
}
