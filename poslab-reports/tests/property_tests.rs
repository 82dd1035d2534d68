//! Property tests for driver arithmetic and batch ordering.
//!
//! Uses proptest to verify:
//! 1. Retail identities: retail + institutional = market, net = inst short − inst long
//! 2. Batch outcomes follow input order for any selection of reports

mod common;

use common::*;
use proptest::prelude::*;
use poslab_core::Numeric;
use poslab_reports::{
    evaluate_all, Report, ReportEntry, ReportKind, ReportsConfig, RetailPosition, StaticSource,
};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_month_oi() -> impl Strategy<Value = Vec<u32>> {
    proptest::collection::vec(1u32..500_000, 1..4)
}

fn arb_class_oi() -> impl Strategy<Value = [(u32, u32); 3]> {
    let pair = || (0u32..100_000, 0u32..100_000);
    (pair(), pair(), pair()).prop_map(|(a, b, c)| [a, b, c])
}

fn arb_kinds() -> impl Strategy<Value = Vec<ReportKind>> {
    proptest::collection::vec(proptest::sample::select(ReportKind::ALL.to_vec()), 1..12)
}

// ── Fixture builders ─────────────────────────────────────────────────

fn quotes_csv(months: &[u32]) -> String {
    let header = MTX_QUOTES_CSV.lines().next().unwrap_or_default();
    let mut text = format!("{header}\n");
    for (i, oi) in months.iter().enumerate() {
        text.push_str(&format!(
            "2022/07/01,MTX,2022{:02},1,1,1,1,0,0%,1,1,{oi},1,1,1,1,,一般,\n",
            7 + i
        ));
    }
    text
}

fn inst_csv(classes: &[(u32, u32); 3]) -> String {
    let header = inst_futures_csv("小型臺指");
    let header = header.lines().next().unwrap_or_default();
    let mut text = format!("{header}\n");
    for ((long, short), class) in classes.iter().zip(["自營商", "投信", "外資"]) {
        text.push_str(&format!(
            "2022/07/01,小型臺指,{class},0,0,0,0,0,0,{long},0,{short},0,0,0\n"
        ));
    }
    text
}

// ── 1. Retail identities ─────────────────────────────────────────────

proptest! {
    #[test]
    fn retail_identities_hold(months in arb_month_oi(), classes in arb_class_oi()) {
        let source = StaticSource::new()
            .with(MTX_QUOTES_KEY, quotes_csv(&months))
            .with("futContractsDateDown?commodityId=MXF", inst_csv(&classes));
        let record = RetailPosition::new("MXF").unwrap().run(&source, trade_date()).unwrap();

        let market: f64 = months.iter().map(|&m| f64::from(m)).sum();
        let inst_long: f64 = classes.iter().map(|(l, _)| f64::from(*l)).sum();
        let inst_short: f64 = classes.iter().map(|(_, s)| f64::from(*s)).sum();
        let get = |name: &str| record.get(name).and_then(Numeric::value).unwrap();

        prop_assert_eq!(get("mxf_market_oi"), market);
        prop_assert_eq!(get("retail_mxf_long_oi") + get("inst_investors_mxf_long_oi"), market);
        prop_assert_eq!(get("retail_mxf_short_oi") + get("inst_investors_mxf_short_oi"), market);
        prop_assert_eq!(get("retail_mxf_net_oi"), inst_short - inst_long);

        let ratio = get("retail_mxf_long_short_ratio");
        let exact = (inst_short - inst_long) / market;
        prop_assert!((ratio - exact).abs() <= 0.00005 + 1e-12);
    }

    // ── 2. Batch ordering ────────────────────────────────────────────

    #[test]
    fn batch_outcomes_follow_input_order(kinds in arb_kinds()) {
        let config = ReportsConfig {
            reports: kinds.iter().map(|&k| ReportEntry::new(k)).collect(),
            schemas: vec![],
        };
        let reports: Vec<Box<dyn Report>> = config.build_reports().unwrap();
        let outcomes = evaluate_all(&reports, &fixture_source(), trade_date());

        let produced: Vec<ReportKind> = outcomes.iter().map(|o| o.kind).collect();
        prop_assert_eq!(produced, kinds);
        prop_assert!(outcomes.iter().all(|o| o.record().is_some()));
    }
}
