//! Large traders' open interest (TAIFEX `largeTraderFutDown` /
//! `largeTraderOptDown`).
//!
//! Each contract contributes six rows: weekly, front-month and all-months
//! contracts, each for all traders and for specific (institutional) traders.
//! Options repeat the block for calls and puts. The last column is total
//! market open interest.

use chrono::NaiveDate;

use poslab_core::{
    Bucket, ColumnSpan, DerivedRecord, FieldLayout, LocaleNumberParser, MarketColumn, RawTable,
    ReportError, ReportSchema, RowCount, RowPlan, RowRole, RowSelector, Segment, Tier,
};

use super::{taifex_request, TAIFEX_HEADER};
use crate::report::{expect_tables, Report, ReportKind};
use crate::source::TableRequest;

const RANKS: [&str; 2] = ["top5", "top10"];
const REPORTED_TIERS: [Tier; 2] = [Tier::Specific, Tier::NonSpecific];
const REPORTED_BUCKETS: [Bucket; 2] = [Bucket::FrontMonth, Bucket::BackMonths];
const SIDES: [&str; 3] = ["long", "short", "net"];

const ROLES: [RowRole; 6] = [
    RowRole::Skip,
    RowRole::Skip,
    RowRole::Raw(Segment::new(Tier::AllTraders, Bucket::FrontMonth)),
    RowRole::Raw(Segment::new(Tier::Specific, Bucket::FrontMonth)),
    RowRole::Raw(Segment::new(Tier::AllTraders, Bucket::AllMonths)),
    RowRole::Raw(Segment::new(Tier::Specific, Bucket::AllMonths)),
];

/// Outputs in rank → tier → bucket → side order, then the market totals.
fn outputs() -> Vec<String> {
    let mut names = Vec::with_capacity(RANKS.len() * 12 + 2);
    for rank in RANKS {
        for tier in REPORTED_TIERS {
            for bucket in REPORTED_BUCKETS {
                for side in SIDES {
                    names.push(format!(
                        "{rank}_{}_{}_{side}_oi",
                        tier.as_str(),
                        bucket.as_str()
                    ));
                }
            }
        }
    }
    names.push("market_front_month_oi".into());
    names.push("market_back_months_oi".into());
    names
}

fn schema(name: &str, code: &str, start: usize, series: &[&str]) -> ReportSchema {
    let groups = series.len().max(1);
    ReportSchema {
        name: name.to_string(),
        version: 1,
        header_token: TAIFEX_HEADER.to_string(),
        selector: RowSelector::all().and_equals(1, code),
        row_count: RowCount::Exactly(ROLES.len() * groups),
        span: ColumnSpan::From {
            start,
            skip_last: 1,
        },
        fields: FieldLayout::new(["top5_long_oi", "top5_short_oi", "top10_long_oi", "top10_short_oi"]),
        plan: RowPlan::Segmented {
            series: series.iter().map(|s| s.to_string()).collect(),
            roles: ROLES.to_vec(),
            market: Some(MarketColumn {
                span: ColumnSpan::Tail { count: 1 },
                field: "market_oi".into(),
            }),
            outputs: outputs(),
        },
    }
}

/// Futures schema for contract code `code` (`TX`, `MTX`, ...).
pub fn futures_schema(code: &str) -> ReportSchema {
    schema("large_traders_futures", code, 5, &[])
}

/// Options schema; calls then puts.
pub fn options_schema(code: &str) -> ReportSchema {
    schema("large_traders_options", code, 6, &["call", "put"])
}

#[derive(Debug, Clone)]
pub struct LargeTradersFutures {
    instrument: String,
    schema: ReportSchema,
}

impl LargeTradersFutures {
    pub fn new(instrument: impl Into<String>) -> Self {
        let instrument = instrument.into();
        let schema = futures_schema(&instrument);
        Self { instrument, schema }
    }
}

impl Report for LargeTradersFutures {
    fn kind(&self) -> ReportKind {
        ReportKind::LargeTradersFutures
    }

    fn instrument(&self) -> &str {
        &self.instrument
    }

    fn requests(&self) -> Vec<TableRequest> {
        vec![taifex_request("largeTraderFutDown")]
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

#[derive(Debug, Clone)]
pub struct LargeTradersOptions {
    instrument: String,
    schema: ReportSchema,
}

impl LargeTradersOptions {
    pub fn new(instrument: impl Into<String>) -> Self {
        let instrument = instrument.into();
        let schema = options_schema(&instrument);
        Self { instrument, schema }
    }
}

impl Report for LargeTradersOptions {
    fn kind(&self) -> ReportKind {
        ReportKind::LargeTradersOptions
    }

    fn instrument(&self) -> &str {
        &self.instrument
    }

    fn requests(&self) -> Vec<TableRequest> {
        vec![taifex_request("largeTraderOptDown")]
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_schemas_validate() {
        futures_schema("TX").validate().unwrap();
        options_schema("TXO").validate().unwrap();
    }

    #[test]
    fn output_order() {
        let names = outputs();
        assert_eq!(names.len(), 26);
        assert_eq!(names[0], "top5_specific_front_month_long_oi");
        assert_eq!(names[5], "top5_specific_back_months_net_oi");
        assert_eq!(names[6], "top5_non_specific_front_month_long_oi");
        assert_eq!(names[12], "top10_specific_front_month_long_oi");
        assert_eq!(names[25], "market_back_months_oi");
    }

    #[test]
    fn options_outputs_are_series_prefixed() {
        let names = options_schema("TXO").output_names();
        assert_eq!(names.len(), 52);
        assert_eq!(names[0], "call_top5_specific_front_month_long_oi");
        assert_eq!(names[26], "put_top5_specific_front_month_long_oi");
        assert_eq!(names[51], "put_market_back_months_oi");
    }
}
