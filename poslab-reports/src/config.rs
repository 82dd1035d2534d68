//! Report configuration: which reports to run and schema overrides.
//!
//! ```toml
//! [[report]]
//! kind = "inst_investors_futures"
//! instrument = "MXF"
//!
//! [[report]]
//! kind = "put_call_ratio"
//!
//! [[schema]]
//! name = "put_call_ratio"
//! version = 2
//! # ... a full report schema
//! ```
//!
//! An override replaces the built-in schema of the same name in every
//! enabled report. It must validate, keep the built-in plan kind and row
//! selector, and not lower the version. Instrument-specific schemas carry
//! their instrument in the selector, so an override can never move one
//! instrument's rows onto another's record.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use poslab_core::{ReportSchema, SchemaError};

use crate::drivers::{
    InstInvestorsFutures, InstInvestorsOptions, LargeTradersFutures, LargeTradersOptions,
    MarginTransactions, OtcInstInvestors, OtcMarginTransactions, PutCallRatio, RetailPosition,
    StockInstInvestors,
};
use crate::report::{Report, ReportKind};

/// Errors from loading or applying a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("schema override '{name}' is invalid: {source}")]
    Schema {
        name: String,
        #[source]
        source: SchemaError,
    },

    #[error("schema override '{name}' rejected: {message}")]
    Override { name: String, message: String },

    #[error("{kind} does not support instrument '{instrument}'")]
    UnsupportedInstrument { kind: ReportKind, instrument: String },

    #[error("{kind} reads field '{field}' that its schemas no longer produce")]
    MissingField { kind: ReportKind, field: String },
}

/// One enabled report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub kind: ReportKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instrument: Option<String>,
}

impl ReportEntry {
    pub fn new(kind: ReportKind) -> Self {
        Self {
            kind,
            instrument: None,
        }
    }

    pub fn with_instrument(kind: ReportKind, instrument: impl Into<String>) -> Self {
        Self {
            kind,
            instrument: Some(instrument.into()),
        }
    }

    pub fn instrument(&self) -> &str {
        self.instrument
            .as_deref()
            .unwrap_or_else(|| self.kind.default_instrument())
    }

    fn build(&self) -> Result<Box<dyn Report>, ConfigError> {
        let instrument = self.instrument();
        let report: Box<dyn Report> = match self.kind {
            ReportKind::InstInvestorsFutures => Box::new(InstInvestorsFutures::new(instrument)),
            ReportKind::InstInvestorsOptions => Box::new(InstInvestorsOptions::new(instrument)),
            ReportKind::PutCallRatio => Box::new(PutCallRatio::new(instrument)),
            ReportKind::LargeTradersFutures => Box::new(LargeTradersFutures::new(instrument)),
            ReportKind::LargeTradersOptions => Box::new(LargeTradersOptions::new(instrument)),
            ReportKind::RetailPosition => Box::new(RetailPosition::new(instrument).ok_or_else(
                || ConfigError::UnsupportedInstrument {
                    kind: self.kind,
                    instrument: instrument.to_string(),
                },
            )?),
            ReportKind::StockInstInvestors => Box::new(StockInstInvestors::new(instrument)),
            ReportKind::MarginTransactions => Box::new(MarginTransactions::new(instrument)),
            ReportKind::OtcInstInvestors => Box::new(OtcInstInvestors::new(instrument)),
            ReportKind::OtcMarginTransactions => Box::new(OtcMarginTransactions::new(instrument)),
        };
        Ok(report)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportsConfig {
    #[serde(default = "default_reports", rename = "report")]
    pub reports: Vec<ReportEntry>,
    #[serde(default, rename = "schema", skip_serializing_if = "Vec::is_empty")]
    pub schemas: Vec<ReportSchema>,
}

/// Every report kind at its default instrument, plus mini-TAIEX futures.
fn default_reports() -> Vec<ReportEntry> {
    let mut reports: Vec<ReportEntry> = ReportKind::ALL.into_iter().map(ReportEntry::new).collect();
    reports.insert(
        1,
        ReportEntry::with_instrument(ReportKind::InstInvestorsFutures, "MXF"),
    );
    reports
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            reports: default_reports(),
            schemas: Vec::new(),
        }
    }
}

impl ReportsConfig {
    /// Parse and validate the overrides.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: ReportsConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Each override validates on its own and names a distinct schema.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for schema in &self.schemas {
            schema.validate().map_err(|source| ConfigError::Schema {
                name: schema.name.clone(),
                source,
            })?;
            if !seen.insert(schema.name.as_str()) {
                return Err(ConfigError::Override {
                    name: schema.name.clone(),
                    message: "overridden more than once".into(),
                });
            }
        }
        Ok(())
    }

    /// Instantiate the enabled reports with overrides applied.
    pub fn build_reports(&self) -> Result<Vec<Box<dyn Report>>, ConfigError> {
        self.validate()?;
        let mut used = HashSet::new();
        let mut reports = Vec::with_capacity(self.reports.len());

        for entry in &self.reports {
            let mut report = entry.build()?;
            for builtin in report.schemas_mut() {
                if let Some(replacement) = self.schemas.iter().find(|s| s.name == builtin.name) {
                    check_override(builtin, replacement)?;
                    debug!(
                        schema = %replacement.name,
                        version = replacement.version,
                        fingerprint = %replacement.fingerprint(),
                        "schema override applied"
                    );
                    *builtin = replacement.clone();
                    used.insert(replacement.name.as_str());
                }
            }
            if let Some(field) = report.missing_field() {
                return Err(ConfigError::MissingField {
                    kind: report.kind(),
                    field,
                });
            }
            reports.push(report);
        }

        if let Some(unused) = self.schemas.iter().find(|s| !used.contains(s.name.as_str())) {
            return Err(ConfigError::Override {
                name: unused.name.clone(),
                message: "no enabled report uses this schema".into(),
            });
        }
        Ok(reports)
    }
}

fn check_override(builtin: &ReportSchema, replacement: &ReportSchema) -> Result<(), ConfigError> {
    let reject = |message: String| ConfigError::Override {
        name: replacement.name.clone(),
        message,
    };
    if replacement.version < builtin.version {
        return Err(reject(format!(
            "version {} is older than built-in version {}",
            replacement.version, builtin.version
        )));
    }
    if replacement.plan.kind() != builtin.plan.kind() {
        return Err(reject(format!(
            "plan kind '{}' differs from built-in '{}'",
            replacement.plan.kind(),
            builtin.plan.kind()
        )));
    }
    if replacement.selector != builtin.selector {
        return Err(reject("row selector differs from built-in".into()));
    }
    Ok(())
}
