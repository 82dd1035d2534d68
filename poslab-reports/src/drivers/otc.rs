//! OTC market reports from TPEX: institutional investors' trade values and
//! margin balances.
//!
//! TPEX answers with headerless JSON and ROC dates (`111/07/01`). Data rows
//! sit under `aaData`; the margin totals are the two footer rows. A day
//! without trading has no rows at all.

use chrono::NaiveDate;

use poslab_core::{
    ColumnSpan, DerivedRecord, LocaleNumberParser, RawTable, ReportError, ReportSchema, RowCount,
};

use super::labeled_schema;
use super::margin::{balance_changes, balance_inputs};
use super::stock_inst::{FIELDS, OUTPUT_LABELS};
use crate::report::{expect_tables, field, Report, ReportKind};
use crate::source::TableRequest;

/// Sentinel row put in front of every TPEX table.
pub(crate) const TPEX_HEADER: &str = "TPEX";

const INST_ENDPOINT: &str = "web/stock/3insti/3insti_summary/3itrdsum_result.php";
const MARGIN_ENDPOINT: &str = "web/stock/margin_trading/margin_balance/margin_bal_result.php";

/// The seven `aaData` rows, totals included, in publication order.
const INST_LABELS: [&str; 7] = [
    "foreign_investors",
    "foreign_dealers_excluded",
    "foreign_dealers",
    "sitc",
    "dealers",
    "dealers_proprietary",
    "dealers_hedge",
];

/// Per-side footer columns: previous balance, buys, sells, redemptions,
/// balance. Buys on the short side are covering purchases.
const MARGIN_FIELDS: [&str; 5] = ["balance_prev", "purchase", "sale", "redemption", "balance"];
const MARGIN_SIDE_START: usize = 2;
const SHORT_SIDE_START: usize = 10;

pub fn inst_schema() -> ReportSchema {
    labeled_schema(
        "otc_inst_investors",
        TPEX_HEADER,
        RowCount::AtLeast(INST_LABELS.len()),
        ColumnSpan::from(1),
        &FIELDS,
        &INST_LABELS,
    )
}

/// Margin side of both footers: units on the first, thousands of NT$ on
/// the second.
pub fn margin_schema() -> ReportSchema {
    footer_schema("otc_margin_balances", MARGIN_SIDE_START, &["margin", "margin_value"])
}

/// Short side of the first footer.
pub fn short_schema() -> ReportSchema {
    footer_schema("otc_short_balances", SHORT_SIDE_START, &["short"])
}

fn footer_schema(name: &str, start: usize, labels: &[&str]) -> ReportSchema {
    labeled_schema(
        name,
        TPEX_HEADER,
        RowCount::AtLeast(labels.len()),
        ColumnSpan::Range {
            start,
            end: start + MARGIN_FIELDS.len(),
        },
        &MARGIN_FIELDS,
        labels,
    )
}

fn tpex_request(endpoint: &str, row_keys: &[&str]) -> TableRequest {
    TableRequest::json_rows(endpoint, TPEX_HEADER, row_keys)
        .param("l", "zh-tw")
        .param("o", "json")
        .date_param("d")
}

// ─── Institutional investors ────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct OtcInstInvestors {
    market: String,
    schema: ReportSchema,
}

impl OtcInstInvestors {
    pub fn new(market: impl Into<String>) -> Self {
        Self {
            market: market.into(),
            schema: inst_schema(),
        }
    }
}

impl Default for OtcInstInvestors {
    fn default() -> Self {
        Self::new(ReportKind::OtcInstInvestors.default_instrument())
    }
}

impl Report for OtcInstInvestors {
    fn kind(&self) -> ReportKind {
        ReportKind::OtcInstInvestors
    }

    fn instrument(&self) -> &str {
        &self.market
    }

    fn requests(&self) -> Vec<TableRequest> {
        vec![tpex_request(INST_ENDPOINT, &["aaData"]).param("t", "D")]
    }

    fn evaluate(&self, date: NaiveDate, tables: &[RawTable]) -> Result<DerivedRecord, ReportError> {
        expect_tables(tables, 1)?;
        let values = self.schema.evaluate(&tables[0], &LocaleNumberParser)?;

        let mut ordered = Vec::with_capacity(OUTPUT_LABELS.len() * FIELDS.len());
        for name in self.required_fields() {
            ordered.push((name.clone(), field(&values, &name)?));
        }
        DerivedRecord::new(date, &self.market, ordered)
    }

    fn schemas(&self) -> Vec<&ReportSchema> {
        vec![&self.schema]
    }

    fn schemas_mut(&mut self) -> Vec<&mut ReportSchema> {
        vec![&mut self.schema]
    }

    /// Every output is read straight from the table, in record order.
    fn required_fields(&self) -> Vec<String> {
        OUTPUT_LABELS
            .iter()
            .flat_map(|label| FIELDS.iter().map(move |f| format!("{label}_{f}")))
            .collect()
    }
}

// ─── Margin balances ────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct OtcMarginTransactions {
    market: String,
    margin: ReportSchema,
    short: ReportSchema,
}

impl OtcMarginTransactions {
    pub fn new(market: impl Into<String>) -> Self {
        Self {
            market: market.into(),
            margin: margin_schema(),
            short: short_schema(),
        }
    }
}

impl Default for OtcMarginTransactions {
    fn default() -> Self {
        Self::new(ReportKind::OtcMarginTransactions.default_instrument())
    }
}

impl Report for OtcMarginTransactions {
    fn kind(&self) -> ReportKind {
        ReportKind::OtcMarginTransactions
    }

    fn instrument(&self) -> &str {
        &self.market
    }

    fn requests(&self) -> Vec<TableRequest> {
        vec![tpex_request(MARGIN_ENDPOINT, &["tfootData_one", "tfootData_two"])]
    }

    fn evaluate(&self, date: NaiveDate, tables: &[RawTable]) -> Result<DerivedRecord, ReportError> {
        expect_tables(tables, 1)?;
        let mut values = self.margin.evaluate(&tables[0], &LocaleNumberParser)?;
        values.extend(self.short.evaluate(&tables[0], &LocaleNumberParser)?);
        DerivedRecord::new(date, &self.market, balance_changes(&values)?)
    }

    fn schemas(&self) -> Vec<&ReportSchema> {
        vec![&self.margin, &self.short]
    }

    fn schemas_mut(&mut self) -> Vec<&mut ReportSchema> {
        vec![&mut self.margin, &mut self.short]
    }

    fn required_fields(&self) -> Vec<String> {
        balance_inputs()
    }
}
