//! Row pass: the trade-history table
//!
//! A trade row is a `<tr>` whose first six cells hold plain values and whose seventh
//! cell wraps an element carrying the value in its `title` attribute:
//!
//! ```text
//! <tr><td>1399/01/20</td><td>550</td><td>540</td><td>560</td><td>12</td><td>48</td>
//!     <td><div class='ltr' title="26,400,000">26.4 M</div></td></tr>
//! ```
//!
//! Rows of any other shape (headers, spacers, summaries) are skipped.

use super::scanner::Scanner;
use crate::TradeRow;

const PLAIN_COLUMNS: usize = 6;

/// Longest `title` attribute value accepted
const MAX_ATTR_LEN: usize = 256;

/// Every trade row in document order
pub fn scan_rows(scanner: &Scanner<'_>) -> Vec<TradeRow> {
    let mut rows = Vec::new();
    let mut from = 0;

    while let Some(open) = scanner.find_ci("<tr", from) {
        from = open + 3;
        if !scanner.is_tag_name_end(open + 3) {
            continue;
        }
        let Some(body_start) = scanner.find_ci(">", open).map(|i| i + 1) else {
            break;
        };
        let Some(body_end) = scanner.find_ci("</tr>", body_start) else {
            break;
        };
        from = body_end + "</tr>".len();

        if let Some(row) = parse_row(scanner, body_start, body_end) {
            rows.push(row);
        }
    }

    rows
}

/// Cell contents between `<td ...>` and `</td>` within `[from, limit)`
fn next_cell(scanner: &Scanner<'_>, from: usize, limit: usize) -> Option<(usize, usize)> {
    let mut search = from;
    loop {
        let open = scanner.find_ci_within("<td", search, limit)?;
        search = open + 3;
        if !scanner.is_tag_name_end(open + 3) {
            continue;
        }
        let inner_start = scanner.find_ci_within(">", open, limit)? + 1;
        let inner_end = scanner.find_ci_within("</td>", inner_start, limit)?;
        return Some((inner_start, inner_end));
    }
}

fn parse_row(scanner: &Scanner<'_>, start: usize, end: usize) -> Option<TradeRow> {
    let mut plain: Vec<&str> = Vec::with_capacity(PLAIN_COLUMNS);
    let mut cursor = start;

    for _ in 0..PLAIN_COLUMNS {
        let (inner_start, inner_end) = next_cell(scanner, cursor, end)?;
        plain.push(scanner.slice(inner_start, inner_end));
        cursor = inner_end + "</td>".len();
    }

    let (inner_start, inner_end) = next_cell(scanner, cursor, end)?;
    let cost = title_attribute(scanner, inner_start, inner_end)?;

    Some(TradeRow {
        date: plain[0].to_string(),
        end: plain[1].to_string(),
        lowest: plain[2].to_string(),
        highest: plain[3].to_string(),
        amount: plain[4].to_string(),
        volume: plain[5].to_string(),
        cost: cost.to_string(),
    })
}

/// `title` attribute of the first element inside a cell
fn title_attribute<'a>(scanner: &Scanner<'a>, start: usize, end: usize) -> Option<&'a str> {
    let tag_start = scanner.skip_ws(start);
    if scanner.byte_at(tag_start) != Some(b'<') {
        return None;
    }
    let tag_end = scanner.find_ci_within(">", tag_start, end)?;

    let mut search = tag_start;
    while let Some(at) = scanner.find_ci_within("title", search, tag_end) {
        search = at + 1;
        if !scanner.is_word_start(at) {
            continue;
        }
        let eq = scanner.skip_ws(at + "title".len());
        if eq >= tag_end || scanner.byte_at(eq) != Some(b'=') {
            continue;
        }
        let quote = scanner.skip_ws(eq + 1);
        if let Some((value, _)) = scanner.quoted_at(quote, b"\"'", MAX_ATTR_LEN) {
            return Some(value);
        }
    }

    None
}
