//! The [`Report`] trait and what every driver shares.
//!
//! A driver owns one or more [`ReportSchema`]s, knows which provider
//! downloads feed them, and adds whatever post-processing its record needs
//! (ratio scaling, totals, balance changes). Fetching is delegated to a
//! [`TableSource`].

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use poslab_core::{DerivedRecord, FieldValues, Numeric, RawTable, ReportError, ReportSchema};

use crate::source::{TableRequest, TableSource, TransportError};

/// Errors from running one report end to end.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("report error: {0}")]
    Report(#[from] ReportError),
}

impl RunError {
    /// True when the provider had nothing for the date.
    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::Report(e) if e.is_no_data())
    }
}

/// Every report this crate knows how to evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    InstInvestorsFutures,
    InstInvestorsOptions,
    PutCallRatio,
    LargeTradersFutures,
    LargeTradersOptions,
    RetailPosition,
    StockInstInvestors,
    MarginTransactions,
    OtcInstInvestors,
    OtcMarginTransactions,
}

impl ReportKind {
    pub const ALL: [ReportKind; 10] = [
        Self::InstInvestorsFutures,
        Self::InstInvestorsOptions,
        Self::PutCallRatio,
        Self::LargeTradersFutures,
        Self::LargeTradersOptions,
        Self::RetailPosition,
        Self::StockInstInvestors,
        Self::MarginTransactions,
        Self::OtcInstInvestors,
        Self::OtcMarginTransactions,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::InstInvestorsFutures => "inst_investors_futures",
            Self::InstInvestorsOptions => "inst_investors_options",
            Self::PutCallRatio => "put_call_ratio",
            Self::LargeTradersFutures => "large_traders_futures",
            Self::LargeTradersOptions => "large_traders_options",
            Self::RetailPosition => "retail_position",
            Self::StockInstInvestors => "stock_inst_investors",
            Self::MarginTransactions => "margin_transactions",
            Self::OtcInstInvestors => "otc_inst_investors",
            Self::OtcMarginTransactions => "otc_margin_transactions",
        }
    }

    /// Instrument code used when a configuration names none.
    pub fn default_instrument(self) -> &'static str {
        match self {
            Self::InstInvestorsFutures => "TXF",
            Self::InstInvestorsOptions | Self::PutCallRatio | Self::LargeTradersOptions => "TXO",
            Self::LargeTradersFutures => "TX",
            Self::RetailPosition => "MXF",
            Self::StockInstInvestors | Self::MarginTransactions => "TWSE",
            Self::OtcInstInvestors | Self::OtcMarginTransactions => "TPEX",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One evaluable positioning report.
pub trait Report: Send + Sync {
    fn kind(&self) -> ReportKind;

    fn instrument(&self) -> &str;

    /// Downloads this report needs, in the order `evaluate` expects them.
    fn requests(&self) -> Vec<TableRequest>;

    /// Turn the fetched tables into a record.
    fn evaluate(&self, date: NaiveDate, tables: &[RawTable]) -> Result<DerivedRecord, ReportError>;

    /// Schemas backing this report.
    fn schemas(&self) -> Vec<&ReportSchema>;

    /// Mutable access for configuration overrides.
    fn schemas_mut(&mut self) -> Vec<&mut ReportSchema>;

    /// Schema outputs the post-step reads by name. Checked against the
    /// schemas after overrides are applied.
    fn required_fields(&self) -> Vec<String> {
        Vec::new()
    }

    /// First required field none of the current schemas produce.
    fn missing_field(&self) -> Option<String> {
        let produced: Vec<String> = self
            .schemas()
            .iter()
            .flat_map(|schema| schema.output_names())
            .collect();
        self.required_fields()
            .into_iter()
            .find(|name| !produced.contains(name))
    }

    /// Fetch every request for `date`, then evaluate.
    fn run(&self, source: &dyn TableSource, date: NaiveDate) -> Result<DerivedRecord, RunError> {
        let tables = self
            .requests()
            .iter()
            .map(|request| source.fetch(request, date))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| {
                warn!(kind = %self.kind(), %date, error = %e, "fetch failed");
                e
            })?;

        match self.evaluate(date, &tables) {
            Ok(record) => {
                debug!(kind = %self.kind(), %date, fields = record.len(), "report evaluated");
                Ok(record)
            }
            Err(e) if e.is_no_data() => {
                debug!(kind = %self.kind(), %date, reason = %e, "no data");
                Err(e.into())
            }
            Err(e) => {
                warn!(kind = %self.kind(), %date, error = %e, "report defect");
                Err(e.into())
            }
        }
    }
}

// ─── Driver helpers ─────────────────────────────────────────────────

/// Fail unless exactly `expected` tables were supplied.
pub(crate) fn expect_tables(tables: &[RawTable], expected: usize) -> Result<(), ReportError> {
    if tables.len() != expected {
        return Err(ReportError::shape("fetched tables", expected, tables.len()));
    }
    Ok(())
}

/// Look up a field an upstream schema must have produced.
pub(crate) fn field(values: &FieldValues, name: &str) -> Result<Numeric, ReportError> {
    values
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| *v)
        .ok_or_else(|| ReportError::UnknownField(name.to_string()))
}

/// Sum of several produced fields; missing if any term is.
pub(crate) fn sum_fields(values: &FieldValues, names: &[String]) -> Result<Numeric, ReportError> {
    names.iter().map(|name| field(values, name)).sum()
}
