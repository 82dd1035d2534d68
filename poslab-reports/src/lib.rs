//! PosLab Reports — exchange positioning report drivers.
//!
//! This crate builds on `poslab-core` to provide:
//! - Built-in drivers for the TAIFEX, TWSE and TPEX positioning reports
//! - The `TableSource` transport seam, with an in-memory replay source
//! - TOML configuration with validated schema overrides
//! - Parallel batch evaluation of independent reports

pub mod batch;
pub mod config;
pub mod drivers;
pub mod report;
pub mod source;

pub use batch::{evaluate_all, ReportOutcome};
pub use config::{ConfigError, ReportEntry, ReportsConfig};
pub use drivers::{
    InstInvestorsFutures, InstInvestorsOptions, LargeTradersFutures, LargeTradersOptions,
    MarginTransactions, OtcInstInvestors, OtcMarginTransactions, PutCallRatio, RetailPosition,
    StockInstInvestors,
};
pub use report::{Report, ReportKind, RunError};
pub use source::{PayloadFormat, StaticSource, TableRequest, TableSource, TransportError};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn drivers_are_send_sync() {
        assert_send::<Box<dyn Report>>();
        assert_sync::<Box<dyn Report>>();
        assert_send::<RetailPosition>();
        assert_sync::<RetailPosition>();
        assert_send::<LargeTradersOptions>();
        assert_sync::<LargeTradersOptions>();
        assert_send::<OtcMarginTransactions>();
        assert_sync::<OtcMarginTransactions>();
    }

    #[test]
    fn sources_are_send_sync() {
        assert_send::<StaticSource>();
        assert_sync::<StaticSource>();
        assert_sync::<&dyn TableSource>();
    }

    #[test]
    fn outcomes_and_config_are_send_sync() {
        assert_send::<ReportOutcome>();
        assert_send::<ReportsConfig>();
        assert_sync::<ReportsConfig>();
        assert_send::<RunError>();
        assert_sync::<RunError>();
    }
}
