//! Header pass: `Name='value'` markers in fixed document order

use super::scanner::Scanner;

/// Marker names in the order they appear on a symbol page
pub const HEADER_MARKERS: [&str; 14] = [
    "StartDate",
    "EndDate",
    "ExpireDate",
    "StuffCode",
    "LoadType",
    "Title",
    "Hours",
    "EnergySymbol",
    "StartValidity",
    "EndValidity",
    "StartValidityShamsi",
    "EndValidityShamsi",
    "InsCode",
    "OpenSymbol",
];

/// Longest value accepted between the quotes
const MAX_VALUE_LEN: usize = 512;

/// Values for each marker, aligned with [`HEADER_MARKERS`]; `None` when absent.
pub fn scan_header(scanner: &Scanner<'_>) -> [Option<String>; 14] {
    let mut values: [Option<String>; 14] = Default::default();
    let mut cursor = 0;

    for (slot, marker) in values.iter_mut().zip(HEADER_MARKERS) {
        if let Some((value, end)) = find_marker(scanner, marker, cursor) {
            *slot = Some(value.to_string());
            cursor = end;
        }
    }

    values
}

/// First `marker = '...'` at or after `from`. Occurrences that are part of a longer
/// word, or not followed by `=` and a single-quoted value, are skipped.
fn find_marker<'a>(scanner: &Scanner<'a>, marker: &str, from: usize) -> Option<(&'a str, usize)> {
    let mut search = from;

    while let Some(at) = scanner.find_ci(marker, search) {
        search = at + 1;
        if !scanner.is_word_start(at) {
            continue;
        }
        let eq = scanner.skip_ws(at + marker.len());
        if scanner.byte_at(eq) != Some(b'=') {
            continue;
        }
        let quote = scanner.skip_ws(eq + 1);
        if let Some(found) = scanner.quoted_at(quote, b"'", MAX_VALUE_LEN) {
            return Some(found);
        }
    }

    None
}
