//! Parallel evaluation of independent reports for one trade date.

use chrono::NaiveDate;
use rayon::prelude::*;
use tracing::{info, instrument};

use poslab_core::DerivedRecord;

use crate::report::{Report, ReportKind, RunError};
use crate::source::TableSource;

/// What one report produced.
#[derive(Debug)]
pub struct ReportOutcome {
    pub kind: ReportKind,
    pub instrument: String,
    pub result: Result<DerivedRecord, RunError>,
}

impl ReportOutcome {
    pub fn is_no_data(&self) -> bool {
        matches!(&self.result, Err(e) if e.is_no_data())
    }

    pub fn record(&self) -> Option<&DerivedRecord> {
        self.result.as_ref().ok()
    }
}

/// Run every report against `source`. Outcomes keep the order of `reports`.
#[instrument(level = "debug", skip(reports, source), fields(reports = reports.len()))]
pub fn evaluate_all(
    reports: &[Box<dyn Report>],
    source: &dyn TableSource,
    date: NaiveDate,
) -> Vec<ReportOutcome> {
    let outcomes: Vec<ReportOutcome> = reports
        .par_iter()
        .map(|report| ReportOutcome {
            kind: report.kind(),
            instrument: report.instrument().to_string(),
            result: report.run(source, date),
        })
        .collect();

    let produced = outcomes.iter().filter(|o| o.result.is_ok()).count();
    let no_data = outcomes.iter().filter(|o| o.is_no_data()).count();
    info!(
        %date,
        produced,
        no_data,
        failed = outcomes.len() - produced - no_data,
        "batch evaluated"
    );
    outcomes
}
