//! Table sources: where raw report tables come from.
//!
//! A [`TableRequest`] names one provider download: endpoint, fixed query
//! parameters, which parameters carry the trade date, and how the payload is
//! tokenized. A [`TableSource`] turns a request plus a date into a
//! [`RawTable`]. No network source ships here; [`StaticSource`] replays
//! captured payloads for tests and offline runs.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use poslab_core::{ProviderDateFormat, RawTable, TableError};

/// Errors from fetching or tokenizing a payload.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("no payload for '{key}' on {date}")]
    NotFound { key: String, date: NaiveDate },

    #[error("payload for '{key}' is not valid JSON: {source}")]
    Json {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("tokenize failed: {0}")]
    Table(#[from] TableError),

    #[error("request to '{endpoint}' failed: {message}")]
    Failed { endpoint: String, message: String },
}

/// How a payload becomes rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum PayloadFormat {
    Csv,
    /// Header row under `header_key`, data rows under `rows_key`.
    Json { header_key: String, rows_key: String },
    /// No header in the payload: rows from `row_keys`, behind a one-cell
    /// `header` row.
    JsonRows { header: String, row_keys: Vec<String> },
}

/// One provider download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRequest {
    pub endpoint: String,
    /// Fixed parameters, in the order the provider documents them.
    pub params: Vec<(String, String)>,
    /// Parameters that receive the trade date.
    pub date_params: Vec<String>,
    pub date_format: ProviderDateFormat,
    pub payload: PayloadFormat,
}

impl TableRequest {
    /// A CSV download with slashed dates.
    pub fn csv(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            params: Vec::new(),
            date_params: Vec::new(),
            date_format: ProviderDateFormat::Slashed,
            payload: PayloadFormat::Csv,
        }
    }

    /// A JSON report with compact dates.
    pub fn json(
        endpoint: impl Into<String>,
        header_key: impl Into<String>,
        rows_key: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            params: Vec::new(),
            date_params: Vec::new(),
            date_format: ProviderDateFormat::Compact,
            payload: PayloadFormat::Json {
                header_key: header_key.into(),
                rows_key: rows_key.into(),
            },
        }
    }

    /// A headerless JSON report (TPEX style) with ROC dates.
    pub fn json_rows(
        endpoint: impl Into<String>,
        header: impl Into<String>,
        row_keys: &[&str],
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            params: Vec::new(),
            date_params: Vec::new(),
            date_format: ProviderDateFormat::RocSlashed,
            payload: PayloadFormat::JsonRows {
                header: header.into(),
                row_keys: row_keys.iter().map(|k| k.to_string()).collect(),
            },
        }
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    pub fn date_param(mut self, name: impl Into<String>) -> Self {
        self.date_params.push(name.into());
        self
    }

    /// Date-independent identity: `endpoint` or `endpoint?a=1&b=2`.
    pub fn key(&self) -> String {
        if self.params.is_empty() {
            return self.endpoint.clone();
        }
        let query: Vec<String> = self.params.iter().map(|(k, v)| format!("{k}={v}")).collect();
        format!("{}?{}", self.endpoint, query.join("&"))
    }

    /// Full query for `date`: fixed parameters first, then the date parameters.
    pub fn query(&self, date: NaiveDate) -> Vec<(String, String)> {
        let rendered = self.date_format.to_query(date);
        self.params
            .iter()
            .cloned()
            .chain(self.date_params.iter().map(|name| (name.clone(), rendered.clone())))
            .collect()
    }

    /// Tokenize a payload body according to [`Self::payload`].
    pub fn decode(&self, body: &str) -> Result<RawTable, TransportError> {
        match &self.payload {
            PayloadFormat::Csv => Ok(RawTable::from_csv(body)?),
            PayloadFormat::Json {
                header_key,
                rows_key,
            } => Ok(RawTable::from_json_sections(
                &self.parse_json(body)?,
                header_key,
                rows_key,
            )?),
            PayloadFormat::JsonRows { header, row_keys } => Ok(RawTable::from_json_rows(
                &self.parse_json(body)?,
                header,
                row_keys,
            )?),
        }
    }

    fn parse_json(&self, body: &str) -> Result<serde_json::Value, TransportError> {
        serde_json::from_str(body).map_err(|source| TransportError::Json {
            key: self.key(),
            source,
        })
    }
}

/// Collaborator that fetches one table for one trade date.
///
/// Implementations must be shareable across threads; batch evaluation calls
/// `fetch` from a rayon pool.
pub trait TableSource: Send + Sync {
    fn fetch(&self, request: &TableRequest, date: NaiveDate) -> Result<RawTable, TransportError>;
}

/// In-memory payloads keyed by [`TableRequest::key`].
///
/// A payload stored for a specific date wins over an undated one.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    payloads: HashMap<(String, Option<NaiveDate>), String>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for `key` on every date.
    pub fn insert(&mut self, key: impl Into<String>, body: impl Into<String>) {
        self.payloads.insert((key.into(), None), body.into());
    }

    /// Serve `body` for `key` on `date` only.
    pub fn insert_dated(&mut self, key: impl Into<String>, date: NaiveDate, body: impl Into<String>) {
        self.payloads.insert((key.into(), Some(date)), body.into());
    }

    pub fn with(mut self, key: impl Into<String>, body: impl Into<String>) -> Self {
        self.insert(key, body);
        self
    }

    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }
}

impl TableSource for StaticSource {
    fn fetch(&self, request: &TableRequest, date: NaiveDate) -> Result<RawTable, TransportError> {
        let key = request.key();
        let body = self
            .payloads
            .get(&(key.clone(), Some(date)))
            .or_else(|| self.payloads.get(&(key.clone(), None)))
            .ok_or(TransportError::NotFound { key, date })?;
        request.decode(body)
    }
}
