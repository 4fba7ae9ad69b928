//! Unit tests for page extraction against loader-shaped documents

use crate::fixtures::symbol_page;
use energy_symbol_crawler::extractor::{extract, extract_with_report};
use rust_decimal::Decimal;

#[test]
fn test_full_page_extraction() {
    let page = symbol_page("65883838195688438", &[("1400/01/01", "48,000,000")]);
    let extraction = extract_with_report(&page);

    assert!(extraction.is_complete(), "missing: {:?}", extraction.missing_fields);
    let record = extraction.record;
    assert_eq!(record.title, "Base load, daily");
    assert_eq!(record.energy_symbol, "DAP00PFBEXD000101");
    assert_eq!(record.start_validity, "20210321");
    assert_eq!(record.start_validity_shamsi, "1400/01/01");
    assert_eq!(record.ins_code, "65883838195688438");

    assert_eq!(record.trades.len(), 1);
    let trade = &record.trades[0];
    assert_eq!(trade.date, "1400/01/01");
    assert_eq!(trade.end, "1,000");
    assert_eq!(trade.cost, "48,000,000");
}

#[test]
fn test_trade_values_are_numeric() {
    let page = symbol_page("1", &[("1400/01/01", "48,000")]);
    let values = extract(&page).trades[0].numeric().unwrap();
    assert_eq!(values.end, Decimal::from(1000));
    assert_eq!(values.highest, Decimal::from(1100));
    assert_eq!(values.cost, Decimal::from(48_000));
}

#[test]
fn test_many_rows_keep_document_order() {
    let trades = [
        ("1400/01/03", "3"),
        ("1400/01/02", "2"),
        ("1400/01/01", "1"),
    ];
    let record = extract(&symbol_page("1", &trades));
    let got: Vec<(&str, &str)> = record
        .trades
        .iter()
        .map(|t| (t.date.as_str(), t.cost.as_str()))
        .collect();
    assert_eq!(got, trades);
}

#[test]
fn test_page_without_trades() {
    let extraction = extract_with_report(&symbol_page("1", &[]));
    assert!(extraction.is_complete());
    assert!(extraction.record.trades.is_empty());
}

#[test]
fn test_error_page_is_malformed() {
    let extraction = extract_with_report("<html><body><h1>Runtime Error</h1></body></html>");
    assert!(extraction.is_malformed());
    assert_eq!(extraction.missing_fields.len(), 14);
}
