//! Institutional investors' buy/sell in the stock market (TWSE `BFI82U`).

use chrono::NaiveDate;

use poslab_core::{
    ColumnSpan, DerivedRecord, LocaleNumberParser, RawTable, ReportError, ReportSchema, RowCount,
};

use super::labeled_schema;
use crate::report::{expect_tables, field, Report, ReportKind};
use crate::source::TableRequest;

pub(crate) const FIELDS: [&str; 3] = ["buy", "sell", "net_buy_sell"];

pub fn schema() -> ReportSchema {
    labeled_schema(
        "stock_inst_investors",
        "單位名稱",
        RowCount::AtLeast(5),
        ColumnSpan::from(1),
        &FIELDS,
        &[
            "dealers_proprietary",
            "dealers_hedge",
            "sitc",
            "foreign_dealers_excluded",
            "foreign_dealers",
        ],
    )
}

/// Combined classes: `(output label, parts)`.
const TOTALS: [(&str, [&str; 2]); 2] = [
    ("foreign_investors", ["foreign_dealers_excluded", "foreign_dealers"]),
    ("dealers", ["dealers_proprietary", "dealers_hedge"]),
];

/// Record order: foreign classes, trusts, then dealer classes.
pub(crate) const OUTPUT_LABELS: [&str; 7] = [
    "foreign_dealers_excluded",
    "foreign_dealers",
    "foreign_investors",
    "sitc",
    "dealers_proprietary",
    "dealers_hedge",
    "dealers",
];

#[derive(Debug, Clone)]
pub struct StockInstInvestors {
    market: String,
    schema: ReportSchema,
}

impl StockInstInvestors {
    pub fn new(market: impl Into<String>) -> Self {
        Self {
            market: market.into(),
            schema: schema(),
        }
    }
}

impl Default for StockInstInvestors {
    fn default() -> Self {
        Self::new(ReportKind::StockInstInvestors.default_instrument())
    }
}

impl Report for StockInstInvestors {
    fn kind(&self) -> ReportKind {
        ReportKind::StockInstInvestors
    }

    fn instrument(&self) -> &str {
        &self.market
    }

    fn requests(&self) -> Vec<TableRequest> {
        vec![TableRequest::json("fund/BFI82U", "fields", "data")
            .param("response", "json")
            .param("type", "day")
            .date_param("dayDate")]
    }

    fn evaluate(&self, date: NaiveDate, tables: &[RawTable]) -> Result<DerivedRecord, ReportError> {
        expect_tables(tables, 1)?;
        let mut values = self.schema.evaluate(&tables[0], &LocaleNumberParser)?;

        for (label, parts) in TOTALS {
            for f in FIELDS {
                let total = field(&values, &format!("{}_{f}", parts[0]))?
                    + field(&values, &format!("{}_{f}", parts[1]))?;
                values.push((format!("{label}_{f}"), total));
            }
        }

        let mut ordered = Vec::with_capacity(OUTPUT_LABELS.len() * FIELDS.len());
        for label in OUTPUT_LABELS {
            for f in FIELDS {
                let name = format!("{label}_{f}");
                ordered.push((name.clone(), field(&values, &name)?));
            }
        }
        DerivedRecord::new(date, &self.market, ordered)
    }

    fn schemas(&self) -> Vec<&ReportSchema> {
        vec![&self.schema]
    }

    fn schemas_mut(&mut self) -> Vec<&mut ReportSchema> {
        vec![&mut self.schema]
    }

    fn required_fields(&self) -> Vec<String> {
        TOTALS
            .iter()
            .flat_map(|(_, parts)| parts.iter())
            .chain(std::iter::once(&"sitc"))
            .flat_map(|label| FIELDS.iter().map(move |f| format!("{label}_{f}")))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_validates() {
        schema().validate().unwrap();
    }

    #[test]
    fn every_input_class_is_required() {
        let report = StockInstInvestors::default();
        assert_eq!(report.required_fields().len(), 15);
        assert_eq!(report.missing_field(), None);
    }

    #[test]
    fn request_is_json_with_compact_date() {
        let requests = StockInstInvestors::default().requests();
        assert_eq!(requests[0].key(), "fund/BFI82U?response=json&type=day");
        let date = NaiveDate::from_ymd_opt(2022, 7, 1).unwrap();
        assert!(requests[0]
            .query(date)
            .contains(&("dayDate".to_string(), "20220701".to_string())));
    }
}
