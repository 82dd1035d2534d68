//! Raw tables as delivered by the tokenizer: rows × text cells.
//!
//! Two adapters build tables from already-decoded report payloads:
//! - [`RawTable::from_csv`] for the header-less CSV downloads
//! - [`RawTable::from_json_sections`] for JSON reports that carry a field list
//!   and a row array under separate keys
//!
//! A table is never mutated after construction.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TableError;

/// One tokenized row.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(Vec<String>);

impl Row {
    pub fn new(cells: Vec<String>) -> Self {
        Self(cells)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Cell text at `index`, if the row is that wide.
    pub fn cell(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn cells(&self) -> &[String] {
        &self.0
    }

    fn is_blank(&self) -> bool {
        self.0.iter().all(|c| c.trim().is_empty())
    }
}

impl<S: Into<String>> FromIterator<S> for Row {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// An ordered sequence of rows. No uniqueness or type constraints on cells.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawTable {
    rows: Vec<Row>,
}

impl RawTable {
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// Build a table from string slices; handy for fixtures.
    pub fn from_rows<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self::new(rows.into_iter().map(|r| r.into_iter().collect()).collect())
    }

    /// Tokenize header-less CSV text. Cells are trimmed, rows may differ in
    /// width, and blank rows are dropped. A leading byte-order mark is ignored.
    pub fn from_csv(text: &str) -> Result<Self, TableError> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let mut rows = Vec::new();
        for record in reader.records() {
            let row: Row = record?.iter().collect();
            if !row.is_blank() {
                rows.push(row);
            }
        }
        Ok(Self::new(rows))
    }

    /// Build a table from a JSON payload: the array under `header_key` becomes
    /// row 0 and each array under `rows_key` becomes a data row. Absent keys
    /// contribute nothing, so an unpublished report yields an empty table.
    pub fn from_json_sections(
        payload: &Value,
        header_key: &str,
        rows_key: &str,
    ) -> Result<Self, TableError> {
        let mut rows = Vec::new();

        if let Some(header) = payload.get(header_key) {
            let cells = header.as_array().ok_or_else(|| TableError::JsonShape {
                key: header_key.to_string(),
            })?;
            rows.push(cells.iter().map(json_cell_text).collect());
        }

        if let Some(data) = payload.get(rows_key) {
            let data = data.as_array().ok_or_else(|| TableError::JsonShape {
                key: rows_key.to_string(),
            })?;
            for entry in data {
                let cells = entry.as_array().ok_or_else(|| TableError::JsonShape {
                    key: rows_key.to_string(),
                })?;
                rows.push(cells.iter().map(json_cell_text).collect());
            }
        }

        Ok(Self::new(rows))
    }

    /// Build a table from a JSON payload that carries no header row. Data
    /// rows are gathered from `row_keys` in order; each key holds either one
    /// row (an array of cells) or many (an array of arrays). When any data is
    /// found, a single-cell `header` row is put in front so the table passes
    /// the usual sentinel check. No data at all yields an empty table.
    pub fn from_json_rows(
        payload: &Value,
        header: &str,
        row_keys: &[String],
    ) -> Result<Self, TableError> {
        let mut rows: Vec<Row> = Vec::new();

        for key in row_keys {
            let Some(section) = payload.get(key) else {
                continue;
            };
            let shape = || TableError::JsonShape { key: key.clone() };
            let entries = section.as_array().ok_or_else(shape)?;
            if entries.iter().all(Value::is_array) {
                for entry in entries {
                    let cells = entry.as_array().ok_or_else(shape)?;
                    rows.push(cells.iter().map(json_cell_text).collect());
                }
            } else if entries.iter().any(Value::is_array) {
                return Err(shape());
            } else {
                rows.push(entries.iter().map(json_cell_text).collect());
            }
        }

        rows.retain(|row| !row.is_blank());
        if !rows.is_empty() {
            rows.insert(0, std::iter::once(header).collect());
        }
        Ok(Self::new(rows))
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First cell of the first row: the report's sentinel header.
    pub fn header_token(&self) -> Option<&str> {
        self.rows.first().and_then(|r| r.cell(0))
    }
}

fn json_cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
