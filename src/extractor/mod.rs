//! Symbol page extraction
//!
//! A page is processed in two independent passes over the same [`Scanner`]:
//!
//! - the header pass reads the fourteen `Name='value'` markers ([`header`])
//! - the row pass reads the trade-history table ([`rows`])
//!
//! Neither pass fails. Markers that are not found produce empty fields, and a page
//! without trade rows produces an empty `trades` list, which is the normal state for a
//! contract that did not trade.

pub mod header;
pub mod rows;
pub mod scanner;

use crate::SymbolRecord;
use header::HEADER_MARKERS;
use scanner::Scanner;

/// Extraction outcome together with what was missing from the page
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    /// The parsed record; missing markers are empty strings
    pub record: SymbolRecord,
    /// Names of header markers not found, in marker order
    pub missing_fields: Vec<&'static str>,
}

impl Extraction {
    /// Every header marker was found
    pub fn is_complete(&self) -> bool {
        self.missing_fields.is_empty()
    }

    /// No header marker was found, so the page is probably not a symbol page
    pub fn is_malformed(&self) -> bool {
        self.missing_fields.len() == HEADER_MARKERS.len()
    }
}

/// Parse a symbol page into a record
///
/// # Examples
///
/// ```
/// use energy_symbol_crawler::extractor::extract;
///
/// let page = "var StartDate='14000101'; <table>\
///     <tr><td>1400/01/05</td><td>10</td><td>9</td><td>11</td><td>1</td><td>2</td>\
///     <td><div class='ltr' title=\"20\">20</div></td></tr></table>";
/// let record = extract(page);
/// assert_eq!(record.start_date, "14000101");
/// assert_eq!(record.end_date, "");
/// assert_eq!(record.trades.len(), 1);
/// ```
pub fn extract(body: &str) -> SymbolRecord {
    extract_with_report(body).record
}

/// Parse a symbol page and report which header markers were absent
pub fn extract_with_report(body: &str) -> Extraction {
    let scanner = Scanner::new(body);

    let values = header::scan_header(&scanner);
    let missing_fields = values
        .iter()
        .zip(HEADER_MARKERS)
        .filter(|(value, _)| value.is_none())
        .map(|(_, marker)| marker)
        .collect();

    let trades = rows::scan_rows(&scanner);

    let [start_date, end_date, expire_date, stuff_code, load_type, title, hours, energy_symbol, start_validity, end_validity, start_validity_shamsi, end_validity_shamsi, ins_code, open_symbol] =
        values.map(Option::unwrap_or_default);

    Extraction {
        record: SymbolRecord {
            start_date,
            end_date,
            expire_date,
            stuff_code,
            load_type,
            title,
            hours,
            energy_symbol,
            start_validity,
            end_validity,
            start_validity_shamsi,
            end_validity_shamsi,
            ins_code,
            open_symbol,
            trades,
        },
        missing_fields,
    }
}
