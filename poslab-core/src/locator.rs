//! Table Locator: sentinel-header validation and row selection.
//!
//! `locate` fails closed: a missing or different sentinel header, or a row
//! subset of the wrong size, is `NoData`. The header check happens before any
//! row is looked at.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{NoDataReason, ReportError};
use crate::table::{RawTable, Row};

/// Test applied to one cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "match", rename_all = "snake_case")]
pub enum CellMatch {
    /// Cell text equals `value` exactly.
    Equals { value: String },
    /// Cell is absent or blank.
    Empty,
    /// Cell is present and not blank.
    NonEmpty,
}

/// A predicate on a single column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellPredicate {
    pub column: usize,
    #[serde(flatten)]
    pub matcher: CellMatch,
}

impl CellPredicate {
    pub fn matches(&self, row: &Row) -> bool {
        let cell = row.cell(self.column);
        match &self.matcher {
            CellMatch::Equals { value } => cell == Some(value.as_str()),
            CellMatch::Empty => cell.map_or(true, |c| c.trim().is_empty()),
            CellMatch::NonEmpty => cell.is_some_and(|c| !c.trim().is_empty()),
        }
    }
}

/// Conjunction of cell predicates. No predicates selects every row.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowSelector {
    predicates: Vec<CellPredicate>,
}

impl RowSelector {
    /// Select every data row.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn and_equals(mut self, column: usize, value: impl Into<String>) -> Self {
        self.predicates.push(CellPredicate {
            column,
            matcher: CellMatch::Equals {
                value: value.into(),
            },
        });
        self
    }

    pub fn and_empty(mut self, column: usize) -> Self {
        self.predicates.push(CellPredicate {
            column,
            matcher: CellMatch::Empty,
        });
        self
    }

    pub fn and_non_empty(mut self, column: usize) -> Self {
        self.predicates.push(CellPredicate {
            column,
            matcher: CellMatch::NonEmpty,
        });
        self
    }

    pub fn predicates(&self) -> &[CellPredicate] {
        &self.predicates
    }

    pub fn matches(&self, row: &Row) -> bool {
        self.predicates.iter().all(|p| p.matches(row))
    }
}

/// How many rows the selector must yield for the report shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowCount {
    Exactly(usize),
    AtLeast(usize),
}

impl RowCount {
    pub fn accepts(self, found: usize) -> bool {
        match self {
            RowCount::Exactly(n) => found == n,
            RowCount::AtLeast(n) => found >= n,
        }
    }

    /// Smallest row count this expectation admits.
    pub fn minimum(self) -> usize {
        match self {
            RowCount::Exactly(n) | RowCount::AtLeast(n) => n,
        }
    }
}

impl fmt::Display for RowCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowCount::Exactly(n) => write!(f, "exactly {n}"),
            RowCount::AtLeast(n) => write!(f, "at least {n}"),
        }
    }
}

/// Validate the sentinel header, then select the rows for one instrument.
///
/// Returns the matching data rows (header excluded) in source order.
pub fn locate<'t>(
    table: &'t RawTable,
    header_token: &str,
    selector: &RowSelector,
    expected: RowCount,
) -> Result<Vec<&'t Row>, ReportError> {
    let found_header = table.header_token().ok_or(NoDataReason::EmptyTable)?;
    if found_header != header_token {
        return Err(NoDataReason::HeaderMismatch {
            expected: header_token.to_string(),
            found: found_header.to_string(),
        }
        .into());
    }

    let rows: Vec<&Row> = table.rows()[1..]
        .iter()
        .filter(|row| selector.matches(row))
        .collect();

    if rows.is_empty() || !expected.accepts(rows.len()) {
        return Err(NoDataReason::RowCount {
            expected: expected.to_string(),
            found: rows.len(),
        }
        .into());
    }
    Ok(rows)
}
