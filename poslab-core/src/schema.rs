//! Report schemas: named, versioned descriptors of one report's format.
//!
//! A schema binds the sentinel header, the row selection, the column span and
//! the ordered field names of a report, plus a [`RowPlan`] saying how the
//! located rows turn into record fields. Schemas are validated when loaded,
//! so a wrong offset or a field the decomposer cannot produce is rejected
//! before any table is read.
//!
//! Schemas can be written in TOML:
//!
//! ```toml
//! name = "large_traders_futures"
//! version = 1
//! header_token = "日期"
//! selector = [{ column = 1, match = "equals", value = "TX" }]
//! row_count = { exactly = 2 }
//! span = { kind = "from", start = 5, skip_last = 1 }
//! fields = ["top5_long_oi", "top5_short_oi"]
//!
//! [plan]
//! kind = "segmented"
//! roles = [
//!     { role = "raw", tier = "all_traders", bucket = "all_months" },
//!     { role = "raw", tier = "specific", bucket = "all_months" },
//! ]
//! outputs = ["top5_non_specific_all_months_net_oi"]
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::axis::{Segment, Tier};
use crate::decompose::{Decomposer, Decomposition, SegmentVectors};
use crate::error::{NoDataReason, ReportError, SchemaError};
use crate::extract::{extract, CellParser, ColumnSpan, FieldLayout, FieldValues};
use crate::locator::{locate, RowCount, RowSelector};
use crate::record::DerivedRecord;
use crate::table::{RawTable, Row};
use crate::value::{Numeric, NumericVector};

// ─── Descriptor types ────────────────────────────────────────────────

/// What one located row contributes to a segmented decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum RowRole {
    /// Row is located but not used (e.g. weekly contracts).
    Skip,
    /// Row carries the raw vector for this segment.
    Raw(Segment),
}

/// A trailing market-total column decomposed on the all-traders tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketColumn {
    pub span: ColumnSpan,
    pub field: String,
}

/// How located rows become record fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowPlan {
    /// Row `i` is emitted under `labels[i]_<field>`. Extra rows are ignored.
    Labeled { labels: Vec<String> },
    /// All rows are added element-wise and emitted under the bare field names.
    Summed,
    /// Rows form `series.len()` (or one) groups of `roles.len()` rows; each
    /// group is decomposed and `outputs` are projected, prefixed by the series.
    Segmented {
        #[serde(default)]
        series: Vec<String>,
        roles: Vec<RowRole>,
        #[serde(default)]
        market: Option<MarketColumn>,
        outputs: Vec<String>,
    },
}

impl RowPlan {
    pub fn kind(&self) -> &'static str {
        match self {
            RowPlan::Labeled { .. } => "labeled",
            RowPlan::Summed => "summed",
            RowPlan::Segmented { .. } => "segmented",
        }
    }
}

/// Named, versioned format contract for one report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSchema {
    pub name: String,
    pub version: u32,
    pub header_token: String,
    #[serde(default)]
    pub selector: RowSelector,
    pub row_count: RowCount,
    pub span: ColumnSpan,
    pub fields: FieldLayout,
    pub plan: RowPlan,
}

// ─── Loading ─────────────────────────────────────────────────────────

impl ReportSchema {
    /// Parse and validate a TOML schema.
    pub fn from_toml(content: &str) -> Result<Self, SchemaError> {
        let schema: ReportSchema = toml::from_str(content)?;
        schema.validate()?;
        Ok(schema)
    }

    pub fn from_file(path: &Path) -> Result<Self, SchemaError> {
        let content = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Stable identity of this exact schema version (BLAKE3 of canonical JSON).
    pub fn fingerprint(&self) -> String {
        let canonical = serde_json::to_string(self).expect("ReportSchema must serialize");
        blake3::hash(canonical.as_bytes()).to_hex().to_string()
    }

    /// Load-time checks. Everything that would otherwise surface as a
    /// `ShapeMismatch` or `UnknownField` on real data is caught here.
    pub fn validate(&self) -> Result<(), SchemaError> {
        let invalid = |msg: String| SchemaError::invalid(&self.name, msg);

        if self.name.trim().is_empty() {
            return Err(SchemaError::invalid("<unnamed>", "schema name is empty"));
        }
        if self.header_token.is_empty() {
            return Err(invalid("header token is empty".into()));
        }
        if self.fields.is_empty() {
            return Err(invalid("field layout is empty".into()));
        }
        if let Some(dup) = first_duplicate(self.fields.names()) {
            return Err(invalid(format!("field '{dup}' declared twice")));
        }
        if let Some(name) = self.fields.names().iter().find(|n| n.trim().is_empty()) {
            return Err(invalid(format!("blank field name '{name}'")));
        }
        if let Some(width) = self.span.fixed_width() {
            if width != self.fields.len() {
                return Err(invalid(format!(
                    "span covers {width} columns but {} fields are declared",
                    self.fields.len()
                )));
            }
        }

        match &self.plan {
            RowPlan::Labeled { labels } => {
                if labels.is_empty() {
                    return Err(invalid("labeled plan has no labels".into()));
                }
                if let Some(dup) = first_duplicate(labels) {
                    return Err(invalid(format!("label '{dup}' declared twice")));
                }
                if self.row_count.minimum() < labels.len() {
                    return Err(invalid(format!(
                        "row count {} cannot fill {} labels",
                        self.row_count,
                        labels.len()
                    )));
                }
            }
            RowPlan::Summed => {}
            RowPlan::Segmented {
                series,
                roles,
                market,
                outputs,
            } => {
                self.validate_segmented(series, roles, market.as_ref(), outputs)?;
            }
        }

        if let Some(dup) = first_duplicate(&self.output_names()) {
            return Err(invalid(format!("record field '{dup}' produced twice")));
        }
        Ok(())
    }

    fn validate_segmented(
        &self,
        series: &[String],
        roles: &[RowRole],
        market: Option<&MarketColumn>,
        outputs: &[String],
    ) -> Result<(), SchemaError> {
        let invalid = |msg: String| SchemaError::invalid(&self.name, msg);

        let raw = raw_segments(roles);
        if raw.is_empty() {
            return Err(invalid("segmented plan has no raw rows".into()));
        }
        if let Some(seg) = raw.iter().find(|s| s.is_derived()) {
            return Err(invalid(format!("segment {seg} is derived and cannot be a raw row")));
        }
        if raw.iter().collect::<HashSet<_>>().len() != raw.len() {
            return Err(invalid("a raw segment is assigned to two rows".into()));
        }
        if let Some(dup) = first_duplicate(series) {
            return Err(invalid(format!("series '{dup}' declared twice")));
        }
        let expected = RowCount::Exactly(roles.len() * series.len().max(1));
        if self.row_count != expected {
            return Err(invalid(format!(
                "row count must be {expected} for {} roles × {} series, got {}",
                roles.len(),
                series.len().max(1),
                self.row_count
            )));
        }
        if outputs.is_empty() {
            return Err(invalid("segmented plan has no outputs".into()));
        }
        if let Some(market) = market {
            if market.span.fixed_width().is_some_and(|w| w != 1) {
                return Err(invalid("market column span must cover one column".into()));
            }
        }

        // Dry-run the decomposition on all-missing input to learn what it
        // can produce for this role map.
        let main = placeholder_decomposition(&self.fields, &raw, &raw)
            .map_err(|e| invalid(e.to_string()))?;
        let market_fields = match market {
            Some(m) => {
                let market_raw = market_segments(roles);
                Some(
                    placeholder_decomposition(&FieldLayout::new([m.field.as_str()]), &market_raw, &[])
                        .map_err(|e| invalid(e.to_string()))?,
                )
            }
            None => None,
        };
        for output in outputs {
            let known = main.get(output).is_some()
                || market_fields.as_ref().is_some_and(|m| m.get(output).is_some());
            if !known {
                return Err(invalid(format!(
                    "output '{output}' cannot be produced from the declared rows"
                )));
            }
        }
        Ok(())
    }

    /// Field names of the record [`Self::apply`] produces, in order.
    pub fn output_names(&self) -> Vec<String> {
        match &self.plan {
            RowPlan::Labeled { labels } => labels
                .iter()
                .flat_map(|label| {
                    self.fields
                        .names()
                        .iter()
                        .map(move |field| format!("{label}_{field}"))
                })
                .collect(),
            RowPlan::Summed => self.fields.names().to_vec(),
            RowPlan::Segmented {
                series, outputs, ..
            } => {
                if series.is_empty() {
                    outputs.clone()
                } else {
                    series
                        .iter()
                        .flat_map(|s| outputs.iter().map(move |o| format!("{s}_{o}")))
                        .collect()
                }
            }
        }
    }
}

// ─── Evaluation ──────────────────────────────────────────────────────

impl ReportSchema {
    /// Locate → extract → bind/decompose → assemble.
    pub fn apply(
        &self,
        table: &RawTable,
        date: NaiveDate,
        instrument: &str,
        parser: &dyn CellParser,
    ) -> Result<DerivedRecord, ReportError> {
        let fields = self.evaluate(table, parser)?;
        DerivedRecord::new(date, instrument, fields)
    }

    /// Like [`Self::apply`] but returns the bare field list, for drivers that
    /// combine several tables into one record.
    pub fn evaluate(
        &self,
        table: &RawTable,
        parser: &dyn CellParser,
    ) -> Result<FieldValues, ReportError> {
        let rows = locate(table, &self.header_token, &self.selector, self.row_count)?;

        match &self.plan {
            RowPlan::Labeled { labels } => {
                if rows.len() < labels.len() {
                    return Err(NoDataReason::RowCount {
                        expected: RowCount::AtLeast(labels.len()).to_string(),
                        found: rows.len(),
                    }
                    .into());
                }
                let mut fields = Vec::with_capacity(labels.len() * self.fields.len());
                for (label, row) in labels.iter().zip(&rows) {
                    let bound = self.fields.bind(&extract(row, &self.span, parser))?;
                    fields.extend(
                        bound
                            .into_iter()
                            .map(|(name, value)| (format!("{label}_{name}"), value)),
                    );
                }
                Ok(fields)
            }
            RowPlan::Summed => {
                let mut total: Option<NumericVector> = None;
                for row in &rows {
                    let vector = extract(row, &self.span, parser);
                    self.fields.bind(&vector)?;
                    total = Some(match total {
                        Some(acc) => acc.checked_add(&vector, "summed rows")?,
                        None => vector,
                    });
                }
                let total = total.unwrap_or_default();
                self.fields.bind(&total)
            }
            RowPlan::Segmented {
                series,
                roles,
                market,
                outputs,
            } => self.evaluate_segmented(&rows, series, roles, market.as_ref(), outputs, parser),
        }
    }

    fn evaluate_segmented(
        &self,
        rows: &[&Row],
        series: &[String],
        roles: &[RowRole],
        market: Option<&MarketColumn>,
        outputs: &[String],
        parser: &dyn CellParser,
    ) -> Result<FieldValues, ReportError> {
        let groups = series.len().max(1);
        if roles.is_empty() || rows.len() < roles.len() * groups {
            return Err(NoDataReason::RowCount {
                expected: RowCount::Exactly(roles.len() * groups).to_string(),
                found: rows.len(),
            }
            .into());
        }

        let decomposer = Decomposer::new(self.fields.clone());
        let market_decomposer =
            market.map(|m| Decomposer::new(FieldLayout::new([m.field.as_str()])));
        let required = raw_segments(roles);

        let mut fields = Vec::with_capacity(outputs.len() * groups);
        for (g, group) in rows.chunks(roles.len()).take(groups).enumerate() {
            let prefix = series.get(g).map(|s| format!("{s}_")).unwrap_or_default();

            let mut raw = SegmentVectors::new();
            let mut market_raw = SegmentVectors::new();
            for (role, row) in roles.iter().zip(group) {
                let RowRole::Raw(segment) = role else {
                    continue;
                };
                raw.insert(*segment, extract(row, &self.span, parser));
                if let Some(m) = market {
                    if segment.tier == Tier::AllTraders {
                        market_raw.insert(*segment, extract(row, &m.span, parser));
                    }
                }
            }

            let main = decomposer.decompose(&raw, &required)?;
            let market_values = match &market_decomposer {
                Some(d) => Some(d.decompose(&market_raw, &[])?),
                None => None,
            };

            for output in outputs {
                let value = main
                    .get(output)
                    .or_else(|| market_values.as_ref().and_then(|m| m.get(output)))
                    .ok_or_else(|| ReportError::UnknownField(output.clone()))?;
                fields.push((format!("{prefix}{output}"), value));
            }
        }
        Ok(fields)
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────

fn raw_segments(roles: &[RowRole]) -> Vec<Segment> {
    roles
        .iter()
        .filter_map(|r| match r {
            RowRole::Raw(s) => Some(*s),
            RowRole::Skip => None,
        })
        .collect()
}

fn market_segments(roles: &[RowRole]) -> Vec<Segment> {
    raw_segments(roles)
        .into_iter()
        .filter(|s| s.tier == Tier::AllTraders)
        .collect()
}

fn placeholder_decomposition(
    layout: &FieldLayout,
    raw: &[Segment],
    required: &[Segment],
) -> Result<Decomposition, ReportError> {
    let mut vectors = SegmentVectors::new();
    for segment in raw {
        vectors.insert(
            *segment,
            NumericVector::new(vec![Numeric::Missing; layout.len()]),
        );
    }
    Decomposer::new(layout.clone()).decompose(&vectors, required)
}

fn first_duplicate<S: AsRef<str>>(names: &[S]) -> Option<&str> {
    let mut seen = HashSet::new();
    names
        .iter()
        .map(|n| n.as_ref())
        .find(|name| !seen.insert(*name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::LocaleNumberParser;

    const SEGMENTED: &str = r#"
        name = "large_traders_futures"
        version = 1
        header_token = "日期"
        selector = [{ column = 1, match = "equals", value = "TX" }]
        row_count = { exactly = 4 }
        span = { kind = "from", start = 5, skip_last = 1 }
        fields = ["top5_long_oi", "top5_short_oi"]

        [plan]
        kind = "segmented"
        roles = [
            { role = "raw", tier = "all_traders", bucket = "front_month" },
            { role = "raw", tier = "specific", bucket = "front_month" },
            { role = "raw", tier = "all_traders", bucket = "all_months" },
            { role = "raw", tier = "specific", bucket = "all_months" },
        ]
        market = { span = { kind = "tail", count = 1 }, field = "market_oi" }
        outputs = [
            "top5_non_specific_back_months_long_oi",
            "top5_non_specific_back_months_net_oi",
            "market_back_months_oi",
        ]
    "#;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2022, 7, 1).unwrap()
    }

    fn tx_table() -> RawTable {
        RawTable::from_rows(vec![
            vec!["日期", "商品(契約)", "商品名稱", "到期月份(週別)", "交易人類別", "前五大買", "前五大賣", "全市場未沖銷部位數"],
            vec!["2022/07/01", "TX", "臺股期貨", "202207", "0", "100", "80", "1,000"],
            vec!["2022/07/01", "TX", "臺股期貨", "202207", "1", "60", "20", "1,000"],
            vec!["2022/07/01", "TX", "臺股期貨", "999999", "0", "300", "250", "1,500"],
            vec!["2022/07/01", "TX", "臺股期貨", "999999", "1", "150", "100", "1,500"],
        ])
    }

    #[test]
    fn toml_schema_loads_and_applies() {
        let schema = ReportSchema::from_toml(SEGMENTED).unwrap();
        let record = schema.apply(&tx_table(), date(), "TX", &LocaleNumberParser).unwrap();
        // back: all (300−100=200) − specific (150−60=90) = 110
        assert_eq!(
            record.get("top5_non_specific_back_months_long_oi"),
            Some(Numeric::Value(110.0))
        );
        // short: (250−80) − (100−20) = 90; net = 110 − 90
        assert_eq!(
            record.get("top5_non_specific_back_months_net_oi"),
            Some(Numeric::Value(20.0))
        );
        assert_eq!(record.get("market_back_months_oi"), Some(Numeric::Value(500.0)));
        assert_eq!(record.len(), 3);
    }

    #[test]
    fn unproducible_output_rejected_at_load() {
        let toml = SEGMENTED.replace(
            "\"market_back_months_oi\"",
            "\"market_back_months_oi\", \"top5_non_specific_back_months_gross_oi\"",
        );
        let err = ReportSchema::from_toml(&toml).unwrap_err();
        assert!(err.to_string().contains("gross"), "{err}");
    }

    #[test]
    fn missing_raw_role_rejected_at_load() {
        // Without the specific all-months row, non-specific back months is unreachable.
        let toml = SEGMENTED
            .replace(
                "{ role = \"raw\", tier = \"specific\", bucket = \"all_months\" }",
                "{ role = \"skip\" }",
            );
        assert!(matches!(
            ReportSchema::from_toml(&toml).unwrap_err(),
            SchemaError::Invalid { .. }
        ));
    }

    #[test]
    fn range_span_width_must_match_fields() {
        let schema = ReportSchema {
            name: "mtx".into(),
            version: 1,
            header_token: "交易日期".into(),
            selector: RowSelector::all(),
            row_count: RowCount::AtLeast(1),
            span: ColumnSpan::Range { start: 11, end: 13 },
            fields: FieldLayout::new(["market_oi"]),
            plan: RowPlan::Summed,
        };
        assert!(schema.validate().is_err());
    }

    #[test]
    fn labeled_plan_prefixes_and_ignores_extra_rows() {
        let schema = ReportSchema {
            name: "margin".into(),
            version: 1,
            header_token: "項目".into(),
            selector: RowSelector::all(),
            row_count: RowCount::AtLeast(2),
            span: ColumnSpan::from(1),
            fields: FieldLayout::new(["balance_prev", "balance"]),
            plan: RowPlan::Labeled {
                labels: vec!["margin".into(), "short".into()],
            },
        };
        schema.validate().unwrap();
        let table = RawTable::from_rows(vec![
            vec!["項目", "前日餘額", "今日餘額"],
            vec!["融資(交易單位)", "100", "110"],
            vec!["融券(交易單位)", "50", "45"],
            vec!["融資金額(仟元)", "9,000", "9,100"],
        ]);
        let fields = schema.evaluate(&table, &LocaleNumberParser).unwrap();
        assert_eq!(
            fields.iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>(),
            vec!["margin_balance_prev", "margin_balance", "short_balance_prev", "short_balance"]
        );
        assert_eq!(fields[3].1, Numeric::Value(45.0));
    }

    #[test]
    fn summed_plan_propagates_missing() {
        let schema = ReportSchema {
            name: "mtx".into(),
            version: 1,
            header_token: "交易日期".into(),
            selector: RowSelector::all(),
            row_count: RowCount::AtLeast(1),
            span: ColumnSpan::Range { start: 1, end: 2 },
            fields: FieldLayout::new(["market_oi"]),
            plan: RowPlan::Summed,
        };
        let table = RawTable::from_rows(vec![
            vec!["交易日期", "未沖銷契約數"],
            vec!["2022/07/01", "1,000"],
            vec!["2022/07/01", "2,500"],
        ]);
        let fields = schema.evaluate(&table, &LocaleNumberParser).unwrap();
        assert_eq!(fields, vec![("market_oi".to_string(), Numeric::Value(3500.0))]);

        let table = RawTable::from_rows(vec![
            vec!["交易日期", "未沖銷契約數"],
            vec!["2022/07/01", "1,000"],
            vec!["2022/07/01", "-"],
        ]);
        let fields = schema.evaluate(&table, &LocaleNumberParser).unwrap();
        assert_eq!(fields[0].1, Numeric::Missing);
    }

    #[test]
    fn header_mismatch_is_no_data() {
        let schema = ReportSchema::from_toml(SEGMENTED).unwrap();
        let table = RawTable::from_rows(vec![vec!["查無資料"]]);
        let err = schema.apply(&table, date(), "TX", &LocaleNumberParser).unwrap_err();
        assert!(err.is_no_data());
    }

    #[test]
    fn fingerprint_tracks_content() {
        let a = ReportSchema::from_toml(SEGMENTED).unwrap();
        let mut b = a.clone();
        assert_eq!(a.fingerprint(), b.fingerprint());
        b.version = 2;
        assert_ne!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
    }

    #[test]
    fn output_names_carry_series_prefix() {
        let mut schema = ReportSchema::from_toml(SEGMENTED).unwrap();
        if let RowPlan::Segmented { series, .. } = &mut schema.plan {
            *series = vec!["call".into(), "put".into()];
        }
        schema.row_count = RowCount::Exactly(8);
        schema.validate().unwrap();
        let names = schema.output_names();
        assert_eq!(names.len(), 6);
        assert_eq!(names[0], "call_top5_non_specific_back_months_long_oi");
        assert_eq!(names[3], "put_top5_non_specific_back_months_long_oi");
    }
}
