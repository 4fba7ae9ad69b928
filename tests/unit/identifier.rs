//! Unit tests for symbol identifiers

use energy_symbol_crawler::calendar::CalendarDate;
use energy_symbol_crawler::config::{CrawlConfig, LoadType};
use energy_symbol_crawler::identifier::SymbolIdentifier;

#[test]
fn test_default_config_identifiers() {
    let config = CrawlConfig::default();
    let date = CalendarDate::parse("1400/01/01").unwrap();

    let ids: Vec<String> = config
        .load_types
        .iter()
        .map(|lt| SymbolIdentifier::generate(&config, &lt.code, &date).to_string())
        .collect();
    assert_eq!(
        ids,
        [
            "DAP00PFBEXD000101",
            "DAP00PFLEXD000101",
            "DAP00PFMEXD000101",
            "DAP00PFPEXD000101"
        ]
    );
}

#[test]
fn test_parse_recovers_generated_date() {
    let config = CrawlConfig::default().with_load_types(vec![LoadType::new("Peak", "P")]);
    for day in ["1399/01/20", "1399/12/30", "1401/01/20"] {
        let date = CalendarDate::parse(day).unwrap();
        let id = SymbolIdentifier::generate(&config, "P", &date);
        let parts = SymbolIdentifier::parse(id.as_str()).unwrap();
        assert_eq!(parts.load_type_code, "P");
        assert_eq!(parts.date().unwrap(), date);
    }
}

#[test]
fn test_parse_rejects_wrong_length() {
    assert!(SymbolIdentifier::parse("DAP00PFBEXD00010").is_err());
    assert!(SymbolIdentifier::parse("DAP00PFBEXD0001011").is_err());
    assert!(SymbolIdentifier::parse("").is_err());
}

#[test]
fn test_parse_rejects_impossible_date() {
    let parts = SymbolIdentifier::parse("DAP00PFBEXD001230").unwrap();
    assert!(parts.date().is_err());
}
