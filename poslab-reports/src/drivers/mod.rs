//! Built-in report drivers.
//!
//! TAIFEX (futures exchange) downloads are CSV; TWSE (stock exchange)
//! reports are JSON; TPEX (OTC market) reports are headerless JSON. Each driver module exposes its built-in schema(s) and
//! a [`Report`](crate::report::Report) implementation.

pub mod inst_investors;
pub mod large_traders;
pub mod margin;
pub mod otc;
pub mod put_call;
pub mod retail;
pub mod stock_inst;

pub use inst_investors::{InstInvestorsFutures, InstInvestorsOptions};
pub use large_traders::{LargeTradersFutures, LargeTradersOptions};
pub use margin::MarginTransactions;
pub use otc::{OtcInstInvestors, OtcMarginTransactions};
pub use put_call::PutCallRatio;
pub use retail::RetailPosition;
pub use stock_inst::StockInstInvestors;

use poslab_core::{ColumnSpan, FieldLayout, ReportSchema, RowCount, RowPlan, RowSelector};

/// Sentinel first cell of every TAIFEX positioning download.
pub(crate) const TAIFEX_HEADER: &str = "日期";

/// Build a one-row-per-label schema with no row filter.
pub(crate) fn labeled_schema(
    name: &str,
    header_token: &str,
    row_count: RowCount,
    span: ColumnSpan,
    fields: &[&str],
    labels: &[&str],
) -> ReportSchema {
    ReportSchema {
        name: name.to_string(),
        version: 1,
        header_token: header_token.to_string(),
        selector: RowSelector::all(),
        row_count,
        span,
        fields: FieldLayout::new(fields.iter().copied()),
        plan: RowPlan::Labeled {
            labels: labels.iter().map(|l| l.to_string()).collect(),
        },
    }
}

/// The slash-dated TAIFEX date range used by every CSV download.
pub(crate) fn taifex_request(endpoint: &str) -> crate::source::TableRequest {
    crate::source::TableRequest::csv(endpoint)
        .date_param("queryStartDate")
        .date_param("queryEndDate")
}
