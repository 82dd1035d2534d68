//! Captured provider payloads for 2022-07-01, trimmed to what the drivers read.

#![allow(dead_code)]

use chrono::NaiveDate;
use poslab_reports::StaticSource;

pub fn trade_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, 7, 1).unwrap()
}

/// A Saturday: nothing is published.
pub fn holiday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, 7, 2).unwrap()
}

const INST_HEADER: &str = "日期,商品名稱,身份別,多方交易口數,多方交易契約金額(千元),空方交易口數,空方交易契約金額(千元),多空交易口數淨額,多空交易契約金額淨額(千元),多方未平倉口數,多方未平倉契約金額(千元),空方未平倉口數,空方未平倉契約金額(千元),多空未平倉口數淨額,多空未平倉契約金額淨額(千元)";

pub fn inst_futures_csv(product: &str) -> String {
    format!(
        r#"{INST_HEADER}
2022/07/01,{product},自營商,"5,000","14,000,000","6,000","16,800,000",-1000,"-2,800,000","1,000","2,800,000","2,000","5,600,000",-1000,"-2,800,000"
2022/07/01,{product},投信,100,280000,50,140000,50,140000,500,1400000,100,280000,400,1120000
2022/07/01,{product},外資,"60,000","168,000,000","58,000","162,400,000","2,000","5,600,000","10,000","28,000,000","20,000","56,000,000","-10,000","-28,000,000"
"#
    )
}

pub const INST_OPTIONS_CSV: &str = r#"日期,商品名稱,買賣權別,身份別,買方交易口數,買方交易契約金額(千元),賣方交易口數,賣方交易契約金額(千元),交易口數買賣淨額,交易契約金額買賣淨額(千元),買方未平倉口數,買方未平倉契約金額(千元),賣方未平倉口數,賣方未平倉契約金額(千元),未平倉口數買賣淨額,未平倉契約金額買賣淨額(千元)
2022/07/01,臺指選擇權,CALL,自營商,1,2,3,4,-2,-2,5,6,7,8,-2,-2
2022/07/01,臺指選擇權,CALL,投信,0,0,0,0,0,0,0,0,0,0,0,0
2022/07/01,臺指選擇權,CALL,外資,10,20,30,40,-20,-20,50,60,70,80,-20,-20
2022/07/01,臺指選擇權,PUT,自營商,2,4,6,8,-4,-4,10,12,14,16,-4,-4
2022/07/01,臺指選擇權,PUT,投信,0,0,0,0,0,0,0,0,0,0,0,0
2022/07/01,臺指選擇權,PUT,外資,"1,000","2,000",500,"1,000",500,"1,000","3,000","6,000","1,000","2,000","2,000","4,000"
"#;

pub const PUT_CALL_CSV: &str = r#"日期,賣權成交量,買權成交量,買賣權成交量比率%,賣權未平倉量,買權未平倉量,買賣權未平倉量比率%
2022/07/01,"300,000","240,000",125,"150,000","200,000",75
2022/06/30,"100,000","100,000",100,"100,000","100,000",100
"#;

pub const LARGE_TRADERS_FUTURES_CSV: &str = r#"日期,商品(契約),商品名稱,到期月份(週別),交易人類別,前五大交易人買方,前五大交易人賣方,前十大交易人買方,前十大交易人賣方,全市場未沖銷部位數
2022/07/01,TX,臺股期貨,202207W1,0,1,2,3,4,10
2022/07/01,TX,臺股期貨,202207W1,1,1,1,1,1,10
2022/07/01,TX,臺股期貨,202207,0,"1,000",800,"1,500","1,200","90,000"
2022/07/01,TX,臺股期貨,202207,1,600,200,900,300,"90,000"
2022/07/01,TX,臺股期貨,999999,0,"3,000","2,500","4,000","3,800","120,000"
2022/07/01,TX,臺股期貨,999999,1,"1,500","1,000","2,000","1,500","120,000"
2022/07/01,MTX,小型臺指,202207,0,5,5,5,5,5
"#;

/// The futures download with a full six-row MTX block after the TX block.
pub fn large_traders_futures_with_mtx_csv() -> String {
    let tx_block: String = LARGE_TRADERS_FUTURES_CSV
        .lines()
        .filter(|line| !line.contains(",MTX,"))
        .map(|line| format!("{line}\n"))
        .collect();
    format!(
        r#"{tx_block}2022/07/01,MTX,小型臺指,202207W1,0,1,1,1,1,2
2022/07/01,MTX,小型臺指,202207W1,1,1,1,1,1,2
2022/07/01,MTX,小型臺指,202207,0,9,8,12,11,50
2022/07/01,MTX,小型臺指,202207,1,7,3,9,4,50
2022/07/01,MTX,小型臺指,999999,0,20,18,30,25,80
2022/07/01,MTX,小型臺指,999999,1,10,6,14,9,80
"#
    )
}

pub const LARGE_TRADERS_OPTIONS_CSV: &str = r#"日期,商品(契約),商品名稱,買賣權別,到期月份(週別),交易人類別,前五大交易人買方,前五大交易人賣方,前十大交易人買方,前十大交易人賣方,全市場未沖銷部位數
2022/07/01,TXO,臺指選擇權,買權,202207W1,0,1,1,1,1,1
2022/07/01,TXO,臺指選擇權,買權,202207W1,1,1,1,1,1,1
2022/07/01,TXO,臺指選擇權,買權,202207,0,100,80,150,120,"1,000"
2022/07/01,TXO,臺指選擇權,買權,202207,1,60,20,90,30,"1,000"
2022/07/01,TXO,臺指選擇權,買權,999999,0,300,250,400,380,"2,000"
2022/07/01,TXO,臺指選擇權,買權,999999,1,150,100,200,150,"2,000"
2022/07/01,TXO,臺指選擇權,賣權,202207W1,0,2,2,2,2,2
2022/07/01,TXO,臺指選擇權,賣權,202207W1,1,2,2,2,2,2
2022/07/01,TXO,臺指選擇權,賣權,202207,0,200,160,300,240,"2,000"
2022/07/01,TXO,臺指選擇權,賣權,202207,1,120,40,180,60,"2,000"
2022/07/01,TXO,臺指選擇權,賣權,999999,0,600,500,800,760,"4,000"
2022/07/01,TXO,臺指選擇權,賣權,999999,1,300,200,400,300,"4,000"
2022/07/01,TEO,電子選擇權,買權,202207,0,9,9,9,9,9
"#;

/// Daily quotes for MTX: two regular-session months count, the after-hours
/// row and the spread row do not.
pub const MTX_QUOTES_CSV: &str = "\
交易日期,契約,到期月份(週別),開盤價,最高價,最低價,收盤價,漲跌價,漲跌%,成交量,結算價,未沖銷契約數,最後最佳買價,最後最佳賣價,歷史最高價,歷史最低價,是否因訊息面暫停交易,交易時段,價差對單式委託成交量
2022/07/01,MTX,202207,14300,14400,14200,14350,50,0.35%,100000,14350,\"30,000\",14349,14350,18500,12000,,一般,
2022/07/01,MTX,202208,14280,14390,14190,14330,50,0.35%,20000,14330,\"20,000\",14329,14330,18400,12100,,一般,
2022/07/01,MTX,202207,14350,14380,14300,14360,10,0.07%,30000,-,\"30,000\",14359,14360,18500,12000,,盤後,
2022/07/01,MTX,202207/202208,-20,-15,-25,-20,-,-,500,-,-,-20,-19,-,-,,一般,500
";

pub const BFI82U_JSON: &str = r#"{
  "stat": "OK",
  "date": "20220701",
  "fields": ["單位名稱", "買進金額", "賣出金額", "買賣差額"],
  "data": [
    ["自營商(自行買賣)", "1,000", "2,000", "-1,000"],
    ["自營商(避險)", "3,000", "1,000", "2,000"],
    ["投信", "500", "400", "100"],
    ["外資及陸資(不含外資自營商)", "10,000", "12,000", "-2,000"],
    ["外資自營商", "0", "0", "0"],
    ["合計", "14,500", "15,400", "-900"]
  ]
}"#;

pub const MI_MARGN_JSON: &str = r#"{
  "stat": "OK",
  "creditFields": ["項目", "買進", "賣出", "現金(券)償還", "前日餘額", "今日餘額"],
  "creditList": [
    ["融資(交易單位)", "300,000", "280,000", "5,000", "7,000,000", "7,015,000"],
    ["融券(交易單位)", "20,000", "25,000", "1,000", "600,000", "604,000"],
    ["融資金額(仟元)", "9,000,000", "8,500,000", "100,000", "280,000,000", "280,400,000"]
  ]
}"#;

/// TPEX `3itrdsum`: seven classes, totals included, no header row.
pub const TPEX_INST_JSON: &str = r#"{
  "reportDate": "111/07/01",
  "iTotalRecords": 7,
  "aaData": [
    ["外資及陸資合計", "10,000", "8,000", "2,000"],
    ["外資及陸資(不含外資自營商)", "9,000", "7,500", "1,500"],
    ["外資自營商", "1,000", "500", "500"],
    ["投信", "3,000", "1,000", "2,000"],
    ["自營商合計", "4,000", "4,500", "-500"],
    ["自營商(自行買賣)", "2,500", "3,000", "-500"],
    ["自營商(避險)", "1,500", "1,500", "0"]
  ]
}"#;

/// TPEX margin balances: totals live in the two footer rows.
pub const TPEX_MARGIN_JSON: &str = r#"{
  "reportDate": "111/07/01",
  "iTotalRecords": 2,
  "aaData": [
    ["1101", "台泥", "10", "1", "1", "0", "10", "", "", "", "2", "0", "0", "0", "2", "", "", "", "0", ""]
  ],
  "tfootData_one": ["", "合計(交易單位)", "100,000", "5,000", "4,000", "500", "100,500", "", "", "", "20,000", "1,000", "1,500", "100", "20,400", "", "", "", "300", ""],
  "tfootData_two": ["", "融資金額(仟元)", "1,950,000", "100,000", "80,000", "10,000", "1,960,000"]
}"#;

/// TPEX answer for a day without trading.
pub const TPEX_NO_DATA_JSON: &str = r#"{"reportDate": "111/07/02", "iTotalRecords": 0, "aaData": [], "tfootData_one": [], "tfootData_two": []}"#;

/// TWSE answer for a day without trading.
pub const TWSE_NO_DATA_JSON: &str = r#"{"stat": "很抱歉，沒有符合條件的資料!"}"#;

/// TAIFEX answer for a day without trading: an HTML notice, not CSV rows.
pub const TAIFEX_NO_DATA: &str = "<html><body>查無資料</body></html>\n";

pub const BFI82U_KEY: &str = "fund/BFI82U?response=json&type=day";
pub const MI_MARGN_KEY: &str = "exchangeReport/MI_MARGN?response=json&selectType=MS";
pub const MTX_QUOTES_KEY: &str = "futDataDown?down_type=1&commodity_id=MTX";
pub const TPEX_INST_KEY: &str =
    "web/stock/3insti/3insti_summary/3itrdsum_result.php?l=zh-tw&o=json&t=D";
pub const TPEX_MARGIN_KEY: &str =
    "web/stock/margin_trading/margin_balance/margin_bal_result.php?l=zh-tw&o=json";

/// Every default report's payload for [`trade_date`]; TWSE and TPEX reports
/// have an explicit no-data answer on [`holiday`].
pub fn fixture_source() -> StaticSource {
    let mut source = StaticSource::new()
        .with("futContractsDateDown?commodityId=TXF", inst_futures_csv("臺股期貨"))
        .with("futContractsDateDown?commodityId=MXF", inst_futures_csv("小型臺指"))
        .with("callsAndPutsDateDown?commodityId=TXO", INST_OPTIONS_CSV)
        .with("pcRatioDown", PUT_CALL_CSV)
        .with("largeTraderFutDown", LARGE_TRADERS_FUTURES_CSV)
        .with("largeTraderOptDown", LARGE_TRADERS_OPTIONS_CSV)
        .with(MTX_QUOTES_KEY, MTX_QUOTES_CSV)
        .with(BFI82U_KEY, BFI82U_JSON)
        .with(MI_MARGN_KEY, MI_MARGN_JSON)
        .with(TPEX_INST_KEY, TPEX_INST_JSON)
        .with(TPEX_MARGIN_KEY, TPEX_MARGIN_JSON);

    for key in [
        "futContractsDateDown?commodityId=TXF",
        "futContractsDateDown?commodityId=MXF",
        "callsAndPutsDateDown?commodityId=TXO",
        "pcRatioDown",
        "largeTraderFutDown",
        "largeTraderOptDown",
        MTX_QUOTES_KEY,
    ] {
        source.insert_dated(key, holiday(), TAIFEX_NO_DATA);
    }
    source.insert_dated(BFI82U_KEY, holiday(), TWSE_NO_DATA_JSON);
    source.insert_dated(MI_MARGN_KEY, holiday(), TWSE_NO_DATA_JSON);
    source.insert_dated(TPEX_INST_KEY, holiday(), TPEX_NO_DATA_JSON);
    source.insert_dated(TPEX_MARGIN_KEY, holiday(), TPEX_NO_DATA_JSON);
    source
}
