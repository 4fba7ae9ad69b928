//! Unit tests for result files

use crate::fixtures::symbol_page;
use energy_symbol_crawler::calendar::CalendarDate;
use energy_symbol_crawler::crawler::{CrawlFailure, CrawlResult, CrawledSymbol};
use energy_symbol_crawler::extractor::extract;
use energy_symbol_crawler::identifier::SymbolIdentifier;
use energy_symbol_crawler::output::{write_result, ResultFormat};
use tempfile::TempDir;

fn sample_result() -> CrawlResult {
    let date = CalendarDate::parse("1400/01/01").unwrap();
    CrawlResult {
        entries: vec![CrawledSymbol {
            identifier: SymbolIdentifier::from_raw("DAP00PFBEXD000101"),
            load_type: "Base".to_string(),
            date,
            record: extract(&symbol_page(
                "42",
                &[("1400/01/01", "10"), ("1400/01/02", "20")],
            )),
        }],
        failures: vec![CrawlFailure {
            identifier: SymbolIdentifier::from_raw("DAP00PFBEXD000102"),
            load_type: "Base".to_string(),
            date: CalendarDate::parse("1400/01/02").unwrap(),
            error: "HTTP 500".to_string(),
        }],
        attempted: 2,
        interrupted: false,
    }
}

#[test]
fn test_json_result_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("result.json");
    let result = sample_result();

    write_result(&result, &path, ResultFormat::Json).unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["attempted"], 2);
    assert_eq!(value["entries"][0]["identifier"], "DAP00PFBEXD000101");
    assert_eq!(value["entries"][0]["date"], "1400/01/01");
    assert_eq!(value["entries"][0]["record"]["ins_code"], "42");
    assert_eq!(value["entries"][0]["record"]["trades"][1]["cost"], "20");
    assert_eq!(value["failures"][0]["error"], "HTTP 500");
}

#[test]
fn test_csv_result_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out/trades.csv");

    write_result(&sample_result(), &path, ResultFormat::Csv).unwrap();

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][0], "DAP00PFBEXD000101");
    assert_eq!(&rows[0][1], "Base");
    assert_eq!(&rows[0][7], "Base");
    assert_eq!(&rows[0][8], "Base load, daily");
    assert_eq!(&rows[0][11], "20210321");
    assert_eq!(&rows[0][12], "20210321");
    assert_eq!(&rows[1][17], "1400/01/02");
    assert_eq!(&rows[1][23], "20");
}
