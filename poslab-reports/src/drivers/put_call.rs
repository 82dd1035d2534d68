//! TXO put/call ratios (TAIFEX `pcRatioDown`).
//!
//! The download lists one row per trading day, newest first; only the first
//! is used. Ratios arrive in percent and are reported as fractions.

use chrono::NaiveDate;

use poslab_core::{
    ColumnSpan, DerivedRecord, LocaleNumberParser, Numeric, RawTable, ReportError, ReportSchema,
    RowCount,
};

use super::{labeled_schema, taifex_request, TAIFEX_HEADER};
use crate::report::{expect_tables, Report, ReportKind};
use crate::source::TableRequest;

const PERCENT_SUFFIX: &str = "_percent";

pub fn schema() -> ReportSchema {
    labeled_schema(
        "put_call_ratio",
        TAIFEX_HEADER,
        RowCount::AtLeast(1),
        ColumnSpan::from(1),
        &[
            "put_volume",
            "call_volume",
            "put_call_volume_ratio_percent",
            "put_oi",
            "call_oi",
            "put_call_ratio_percent",
        ],
        &["txo"],
    )
}

#[derive(Debug, Clone)]
pub struct PutCallRatio {
    instrument: String,
    schema: ReportSchema,
}

impl PutCallRatio {
    pub fn new(instrument: impl Into<String>) -> Self {
        Self {
            instrument: instrument.into(),
            schema: schema(),
        }
    }
}

impl Default for PutCallRatio {
    fn default() -> Self {
        Self::new(ReportKind::PutCallRatio.default_instrument())
    }
}

impl Report for PutCallRatio {
    fn kind(&self) -> ReportKind {
        ReportKind::PutCallRatio
    }

    fn instrument(&self) -> &str {
        &self.instrument
    }

    fn requests(&self) -> Vec<TableRequest> {
        vec![taifex_request("pcRatioDown")]
    }

    fn evaluate(&self, date: NaiveDate, tables: &[RawTable]) -> Result<DerivedRecord, ReportError> {
        expect_tables(tables, 1)?;
        let fields = self
            .schema
            .evaluate(&tables[0], &LocaleNumberParser)?
            .into_iter()
            .map(|(name, value)| match name.strip_suffix(PERCENT_SUFFIX) {
                Some(stem) => (stem.to_string(), value.checked_div(Numeric::Value(100.0))),
                None => (name, value),
            })
            .collect();
        DerivedRecord::new(date, &self.instrument, fields)
    }

    fn schemas(&self) -> Vec<&ReportSchema> {
        vec![&self.schema]
    }

    fn schemas_mut(&mut self) -> Vec<&mut ReportSchema> {
        vec![&mut self.schema]
    }
}
