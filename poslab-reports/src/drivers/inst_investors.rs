//! Institutional investors' futures and options positions (TAIFEX).
//!
//! One row per investor class, twelve figures per row: long, short and net,
//! each for trading and open interest, each as volume and contract value.

use chrono::NaiveDate;

use poslab_core::{
    ColumnSpan, DerivedRecord, LocaleNumberParser, RawTable, ReportError, ReportSchema, RowCount,
};

use super::{labeled_schema, taifex_request, TAIFEX_HEADER};
use crate::report::{expect_tables, Report, ReportKind};
use crate::source::TableRequest;

pub const INST_FIELDS: [&str; 12] = [
    "long_trade_volume",
    "long_trade_value",
    "short_trade_volume",
    "short_trade_value",
    "net_trade_volume",
    "net_trade_value",
    "long_oi_volume",
    "long_oi_value",
    "short_oi_volume",
    "short_oi_value",
    "net_oi_volume",
    "net_oi_value",
];

/// Dealers, investment trusts, foreign institutions.
pub const INVESTOR_CLASSES: [&str; 3] = ["dealers", "sitc", "fini"];

pub fn futures_schema() -> ReportSchema {
    labeled_schema(
        "inst_investors_futures",
        TAIFEX_HEADER,
        RowCount::Exactly(3),
        ColumnSpan::from(3),
        &INST_FIELDS,
        &INVESTOR_CLASSES,
    )
}

pub fn options_schema() -> ReportSchema {
    labeled_schema(
        "inst_investors_options",
        TAIFEX_HEADER,
        RowCount::Exactly(6),
        ColumnSpan::from(4),
        &INST_FIELDS,
        &[
            "dealers_calls",
            "sitc_calls",
            "fini_calls",
            "dealers_puts",
            "sitc_puts",
            "fini_puts",
        ],
    )
}

/// Futures positions for one contract (`TXF`, `MXF`, ...).
#[derive(Debug, Clone)]
pub struct InstInvestorsFutures {
    instrument: String,
    schema: ReportSchema,
}

impl InstInvestorsFutures {
    pub fn new(instrument: impl Into<String>) -> Self {
        Self {
            instrument: instrument.into(),
            schema: futures_schema(),
        }
    }

    pub(crate) fn request(instrument: &str) -> TableRequest {
        taifex_request("futContractsDateDown").param("commodityId", instrument)
    }
}

impl Report for InstInvestorsFutures {
    fn kind(&self) -> ReportKind {
        ReportKind::InstInvestorsFutures
    }

    fn instrument(&self) -> &str {
        &self.instrument
    }

    fn requests(&self) -> Vec<TableRequest> {
        vec![Self::request(&self.instrument)]
    }

    fn evaluate(&self, date: NaiveDate, tables: &[RawTable]) -> Result<DerivedRecord, ReportError> {
        expect_tables(tables, 1)?;
        self.schema
            .apply(&tables[0], date, &self.instrument, &LocaleNumberParser)
    }

    fn schemas(&self) -> Vec<&ReportSchema> {
        vec![&self.schema]
    }

    fn schemas_mut(&mut self) -> Vec<&mut ReportSchema> {
        vec![&mut self.schema]
    }
}

/// Calls and puts positions for one options contract (`TXO`).
#[derive(Debug, Clone)]
pub struct InstInvestorsOptions {
    instrument: String,
    schema: ReportSchema,
}

impl InstInvestorsOptions {
    pub fn new(instrument: impl Into<String>) -> Self {
        Self {
            instrument: instrument.into(),
            schema: options_schema(),
        }
    }
}

impl Report for InstInvestorsOptions {
    fn kind(&self) -> ReportKind {
        ReportKind::InstInvestorsOptions
    }

    fn instrument(&self) -> &str {
        &self.instrument
    }

    fn requests(&self) -> Vec<TableRequest> {
        vec![taifex_request("callsAndPutsDateDown").param("commodityId", &self.instrument)]
    }

    fn evaluate(&self, date: NaiveDate, tables: &[RawTable]) -> Result<DerivedRecord, ReportError> {
        expect_tables(tables, 1)?;
        self.schema
            .apply(&tables[0], date, &self.instrument, &LocaleNumberParser)
    }

    fn schemas(&self) -> Vec<&ReportSchema> {
        vec![&self.schema]
    }

    fn schemas_mut(&mut self) -> Vec<&mut ReportSchema> {
        vec![&mut self.schema]
    }
}
