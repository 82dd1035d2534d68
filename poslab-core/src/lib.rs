//! PosLab Core — positioning-report decomposition.
//!
//! Exchange positioning reports arrive as loosely structured flat tables.
//! This crate turns one such table into a flat, field-complete record:
//! - [`locator`] validates the sentinel header and selects the instrument's rows
//! - [`extract`] slices each row at fixed offsets into a [`NumericVector`]
//! - [`decompose`] derives non-specific, back-months and net values by subtraction
//! - [`schema`] ties the three together as named, versioned report descriptors
//!
//! Everything here is pure and single-threaded: no I/O beyond reading schema
//! files, no logging, no shared state. Callers may evaluate independent
//! tables in parallel without coordination.

pub mod axis;
pub mod calendar;
pub mod decompose;
pub mod error;
pub mod extract;
pub mod locator;
pub mod record;
pub mod schema;
pub mod table;
pub mod value;

pub use axis::{Bucket, Segment, Side, Tier};
pub use calendar::ProviderDateFormat;
pub use decompose::{segment_field_name, Decomposer, Decomposition, SegmentVectors};
pub use error::{NoDataReason, ReportError, SchemaError, TableError};
pub use extract::{extract, CellParser, ColumnSpan, FieldLayout, FieldValues, LocaleNumberParser};
pub use locator::{locate, CellMatch, CellPredicate, RowCount, RowSelector};
pub use record::DerivedRecord;
pub use schema::{MarketColumn, ReportSchema, RowPlan, RowRole};
pub use table::{RawTable, Row};
pub use value::{Numeric, NumericVector};
