//! Margin purchase and short sale balances (TWSE `MI_MARGN`).

use chrono::NaiveDate;

use poslab_core::{
    ColumnSpan, DerivedRecord, FieldValues, LocaleNumberParser, RawTable, ReportError,
    ReportSchema, RowCount,
};

use super::labeled_schema;
use crate::report::{expect_tables, field, Report, ReportKind};
use crate::source::TableRequest;

pub fn schema() -> ReportSchema {
    labeled_schema(
        "margin_transactions",
        "項目",
        RowCount::AtLeast(3),
        ColumnSpan::from(1),
        &["purchase", "sale", "redemption", "balance_prev", "balance"],
        &["margin", "short", "margin_value"],
    )
}

/// `(output stem, source label)`; each yields a balance and a day change.
const BALANCES: [(&str, &str); 3] = [
    ("margin_balance", "margin"),
    ("margin_balance_value", "margin_value"),
    ("short_balance", "short"),
];

/// Balance and day change per [`BALANCES`] entry, read from
/// `{label}_balance` and `{label}_balance_prev`.
pub(crate) fn balance_changes(values: &FieldValues) -> Result<FieldValues, ReportError> {
    let mut fields = Vec::with_capacity(BALANCES.len() * 2);
    for (stem, label) in BALANCES {
        let balance = field(values, &format!("{label}_balance"))?;
        let previous = field(values, &format!("{label}_balance_prev"))?;
        fields.push((stem.to_string(), balance));
        fields.push((format!("{stem}_change"), balance - previous));
    }
    Ok(fields)
}

/// Inputs [`balance_changes`] reads.
pub(crate) fn balance_inputs() -> Vec<String> {
    BALANCES
        .iter()
        .flat_map(|(_, label)| [format!("{label}_balance"), format!("{label}_balance_prev")])
        .collect()
}

#[derive(Debug, Clone)]
pub struct MarginTransactions {
    market: String,
    schema: ReportSchema,
}

impl MarginTransactions {
    pub fn new(market: impl Into<String>) -> Self {
        Self {
            market: market.into(),
            schema: schema(),
        }
    }
}

impl Default for MarginTransactions {
    fn default() -> Self {
        Self::new(ReportKind::MarginTransactions.default_instrument())
    }
}

impl Report for MarginTransactions {
    fn kind(&self) -> ReportKind {
        ReportKind::MarginTransactions
    }

    fn instrument(&self) -> &str {
        &self.market
    }

    fn requests(&self) -> Vec<TableRequest> {
        vec![
            TableRequest::json("exchangeReport/MI_MARGN", "creditFields", "creditList")
                .param("response", "json")
                .param("selectType", "MS")
                .date_param("dayDate"),
        ]
    }

    fn evaluate(&self, date: NaiveDate, tables: &[RawTable]) -> Result<DerivedRecord, ReportError> {
        expect_tables(tables, 1)?;
        let values = self.schema.evaluate(&tables[0], &LocaleNumberParser)?;
        DerivedRecord::new(date, &self.market, balance_changes(&values)?)
    }

    fn schemas(&self) -> Vec<&ReportSchema> {
        vec![&self.schema]
    }

    fn schemas_mut(&mut self) -> Vec<&mut ReportSchema> {
        vec![&mut self.schema]
    }

    fn required_fields(&self) -> Vec<String> {
        balance_inputs()
    }
}
