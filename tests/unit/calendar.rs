//! Unit tests for Shamsi date handling

use energy_symbol_crawler::calendar::{CalendarDate, DateRange};
use energy_symbol_crawler::config::CrawlConfig;

fn date(s: &str) -> CalendarDate {
    CalendarDate::parse(s).unwrap()
}

#[test]
fn test_nowruz_maps_to_march_equinox() {
    let nowruz = date("1400/01/01");
    assert_eq!(nowruz.to_gregorian().to_string(), "2021-03-21");
    assert_eq!(nowruz.to_string(), "1400/01/01");
}

#[test]
fn test_leap_year_end_is_visited() {
    let days: Vec<String> = DateRange::new(date("1399/12/29"), date("1400/01/01"))
        .into_iter()
        .map(|d| d.to_string())
        .collect();
    assert_eq!(days, ["1399/12/29", "1399/12/30", "1400/01/01"]);
}

#[test]
fn test_day_thirty_of_esfand_only_in_leap_years() {
    assert!(CalendarDate::parse("1399/12/30").is_ok());
    assert!(CalendarDate::parse("1400/12/30").is_err());
}

#[test]
fn test_default_window_covers_two_years() {
    let config = CrawlConfig::default();
    assert_eq!(config.start_date, date("1399/01/20"));
    assert_eq!(config.end_date, date("1401/01/20"));
    assert_eq!(config.date_range().len(), 732);
}

#[test]
fn test_single_day_range() {
    let day = date("1400/06/31");
    let range = DateRange::new(day, day);
    assert_eq!(range.len(), 1);
    assert_eq!(range.into_iter().collect::<Vec<_>>(), vec![day]);
}

#[test]
fn test_range_is_restartable() {
    let config = CrawlConfig::default().with_dates("1400/01/01", "1400/01/05").unwrap();
    let first: Vec<_> = config.date_range().into_iter().collect();
    let second: Vec<_> = config.date_range().into_iter().collect();
    assert_eq!(first.len(), 5);
    assert_eq!(first, second);
}
