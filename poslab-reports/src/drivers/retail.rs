//! Retail positioning in a futures contract, inferred as market open
//! interest minus the three institutional classes.
//!
//! Market open interest comes from the daily quotes download: regular
//! session rows only, spreads excluded, summed across contract months.

use chrono::NaiveDate;

use poslab_core::{
    ColumnSpan, DerivedRecord, FieldLayout, LocaleNumberParser, RawTable, ReportError,
    ReportSchema, RowCount, RowPlan, RowSelector,
};

use super::inst_investors::{futures_schema, InstInvestorsFutures, INVESTOR_CLASSES};
use crate::report::{expect_tables, field, sum_fields, Report, ReportKind};
use crate::source::TableRequest;

const QUOTES_HEADER: &str = "交易日期";
const OI_COLUMN: usize = 11;
const SESSION_COLUMN: usize = 17;
const SPREAD_COLUMN: usize = 18;
const REGULAR_SESSION: &str = "一般";
const MARKET_FIELD: &str = "market_oi";

pub fn market_schema(quote_code: &str) -> ReportSchema {
    ReportSchema {
        name: "market_open_interest".into(),
        version: 1,
        header_token: QUOTES_HEADER.into(),
        selector: RowSelector::all()
            .and_equals(1, quote_code)
            .and_equals(SESSION_COLUMN, REGULAR_SESSION)
            .and_empty(SPREAD_COLUMN),
        row_count: RowCount::AtLeast(1),
        span: ColumnSpan::Range {
            start: OI_COLUMN,
            end: OI_COLUMN + 1,
        },
        fields: FieldLayout::new([MARKET_FIELD]),
        plan: RowPlan::Summed,
    }
}

/// Quote-table code for an institutional-positions commodity id.
pub fn quote_code(instrument: &str) -> Option<&'static str> {
    match instrument {
        "MXF" => Some("MTX"),
        "TXF" => Some("TX"),
        _ => None,
    }
}

#[derive(Debug, Clone)]
pub struct RetailPosition {
    instrument: String,
    quote_code: &'static str,
    market: ReportSchema,
    institutional: ReportSchema,
}

impl RetailPosition {
    /// `None` when the contract has no known quote code.
    pub fn new(instrument: impl Into<String>) -> Option<Self> {
        let instrument = instrument.into();
        let quote_code = quote_code(&instrument)?;
        Some(Self {
            market: market_schema(quote_code),
            institutional: futures_schema(),
            instrument,
            quote_code,
        })
    }

    fn prefix(&self) -> String {
        self.instrument.to_lowercase()
    }

    fn oi_sum_names(&self, side: &str) -> Vec<String> {
        INVESTOR_CLASSES
            .iter()
            .map(|class| format!("{class}_{side}_oi_volume"))
            .collect()
    }
}

impl Report for RetailPosition {
    fn kind(&self) -> ReportKind {
        ReportKind::RetailPosition
    }

    fn instrument(&self) -> &str {
        &self.instrument
    }

    fn requests(&self) -> Vec<TableRequest> {
        vec![
            super::taifex_request("futDataDown")
                .param("down_type", "1")
                .param("commodity_id", self.quote_code),
            InstInvestorsFutures::request(&self.instrument),
        ]
    }

    fn evaluate(&self, date: NaiveDate, tables: &[RawTable]) -> Result<DerivedRecord, ReportError> {
        expect_tables(tables, 2)?;
        let market_values = self.market.evaluate(&tables[0], &LocaleNumberParser)?;
        let inst_values = self.institutional.evaluate(&tables[1], &LocaleNumberParser)?;

        let market_oi = field(&market_values, MARKET_FIELD)?;
        let inst_long = sum_fields(&inst_values, &self.oi_sum_names("long"))?;
        let inst_short = sum_fields(&inst_values, &self.oi_sum_names("short"))?;

        let retail_long = market_oi - inst_long;
        let retail_short = market_oi - inst_short;
        let retail_net = retail_long - retail_short;
        let ratio = retail_net.checked_div(market_oi).round_to(4);

        let p = self.prefix();
        DerivedRecord::new(
            date,
            &self.instrument,
            vec![
                (format!("{p}_market_oi"), market_oi),
                (format!("inst_investors_{p}_long_oi"), inst_long),
                (format!("inst_investors_{p}_short_oi"), inst_short),
                (format!("retail_{p}_long_oi"), retail_long),
                (format!("retail_{p}_short_oi"), retail_short),
                (format!("retail_{p}_net_oi"), retail_net),
                (format!("retail_{p}_long_short_ratio"), ratio),
            ],
        )
    }

    fn schemas(&self) -> Vec<&ReportSchema> {
        vec![&self.market, &self.institutional]
    }

    fn schemas_mut(&mut self) -> Vec<&mut ReportSchema> {
        vec![&mut self.market, &mut self.institutional]
    }

    fn required_fields(&self) -> Vec<String> {
        let mut names = vec![MARKET_FIELD.to_string()];
        names.extend(self.oi_sum_names("long"));
        names.extend(self.oi_sum_names("short"));
        names
    }
}
