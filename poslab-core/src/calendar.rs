//! Provider date formats.
//!
//! Exchanges take and return dates in their own notation: slashed or compact
//! Gregorian dates, or ROC (Minguo) years where year 1 is 1912. Records only
//! ever carry ISO [`NaiveDate`]s; conversion happens at the edges.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Offset between Gregorian and ROC years.
pub const ROC_YEAR_OFFSET: i32 = 1911;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderDateFormat {
    /// `2022/07/01`
    Slashed,
    /// `20220701`
    Compact,
    /// `111/07/01`
    RocSlashed,
    /// `111/07`; parses to the first of the month.
    RocMonth,
    /// `07/01/2022`
    UsSlashed,
}

impl ProviderDateFormat {
    /// Render `date` the way the provider expects it in a query.
    pub fn to_query(self, date: NaiveDate) -> String {
        match self {
            Self::Slashed => date.format("%Y/%m/%d").to_string(),
            Self::Compact => date.format("%Y%m%d").to_string(),
            Self::RocSlashed => format!(
                "{}/{:02}/{:02}",
                date.year() - ROC_YEAR_OFFSET,
                date.month(),
                date.day()
            ),
            Self::RocMonth => format!("{}/{:02}", date.year() - ROC_YEAR_OFFSET, date.month()),
            Self::UsSlashed => date.format("%m/%d/%Y").to_string(),
        }
    }

    /// Parse a provider date back to ISO. `None` on anything malformed.
    pub fn parse(self, text: &str) -> Option<NaiveDate> {
        let text = text.trim();
        match self {
            Self::Slashed => NaiveDate::parse_from_str(text, "%Y/%m/%d").ok(),
            Self::Compact => NaiveDate::parse_from_str(text, "%Y%m%d").ok(),
            Self::UsSlashed => NaiveDate::parse_from_str(text, "%m/%d/%Y").ok(),
            Self::RocSlashed => {
                let mut parts = text.split('/');
                let year = roc_year(parts.next()?)?;
                let month = parts.next()?.parse().ok()?;
                let day = parts.next()?.parse().ok()?;
                if parts.next().is_some() {
                    return None;
                }
                NaiveDate::from_ymd_opt(year, month, day)
            }
            Self::RocMonth => {
                let (year, month) = text.split_once('/')?;
                NaiveDate::from_ymd_opt(roc_year(year)?, month.parse().ok()?, 1)
            }
        }
    }
}

fn roc_year(text: &str) -> Option<i32> {
    let year: i32 = text.parse().ok()?;
    (year > 0).then_some(year + ROC_YEAR_OFFSET)
}
