//! Symbol identifier generation and decomposition
//!
//! An identifier addresses one daily contract page on the venue. It is the fixed-width
//! concatenation
//!
//! `BAZAR(1) PRODUCT(2) PRODUCER(2) CONTRACT(2) LOAD(1) PLACE(2) PERIOD(1) yyMMdd(6)`
//!
//! e.g. `DAP00PFBEXD990120` for the domestic active-power base-load forward contract
//! delivered on 1399/01/20.

use crate::calendar::CalendarDate;
use crate::config::{
    CrawlConfig, BAZAR_TYPE_LEN, CONTRACT_TYPE_LEN, DELIVERY_PERIOD_LEN, DELIVERY_PLACE_LEN,
    LOAD_TYPE_CODE_LEN, PRODUCER_NAME_LEN, PRODUCT_NAME_LEN,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Width of the `yyMMdd` date suffix
const DATE_CODE_LEN: usize = 6;

/// Total identifier width
pub const IDENTIFIER_LEN: usize = BAZAR_TYPE_LEN
    + PRODUCT_NAME_LEN
    + PRODUCER_NAME_LEN
    + CONTRACT_TYPE_LEN
    + LOAD_TYPE_CODE_LEN
    + DELIVERY_PLACE_LEN
    + DELIVERY_PERIOD_LEN
    + DATE_CODE_LEN;

/// Composite key of one symbol page
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolIdentifier(String);

impl SymbolIdentifier {
    /// Build the identifier for one (load type, date) pair of `config`
    ///
    /// The prefix is rebuilt from the same four config fields for every load type.
    ///
    /// # Examples
    ///
    /// ```
    /// use energy_symbol_crawler::calendar::CalendarDate;
    /// use energy_symbol_crawler::config::CrawlConfig;
    /// use energy_symbol_crawler::identifier::SymbolIdentifier;
    ///
    /// let config = CrawlConfig::default();
    /// let date = CalendarDate::parse("1399/01/20").unwrap();
    /// let id = SymbolIdentifier::generate(&config, "B", &date);
    /// assert_eq!(id.as_str(), "DAP00PFBEXD990120");
    /// ```
    pub fn generate(config: &CrawlConfig, load_type_code: &str, date: &CalendarDate) -> Self {
        let mut id = String::with_capacity(IDENTIFIER_LEN);
        id.push_str(&config.bazar_type);
        id.push_str(&config.product_name);
        id.push_str(&config.producer_name);
        id.push_str(&config.contract_type);
        id.push_str(load_type_code);
        id.push_str(&config.delivery_place);
        id.push_str(&config.delivery_period);
        id.push_str(&date.format("yyMMdd"));
        Self(id)
    }

    /// Wrap an identifier string as-is
    pub fn from_raw(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Identifier text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split a well-formed identifier back into its components
    ///
    /// Input is case-insensitive and normalized to uppercase.
    ///
    /// # Errors
    ///
    /// Returns an error if the length is wrong, a character is not ASCII
    /// alphanumeric, or the date suffix is not six digits.
    pub fn parse(s: &str) -> Result<SymbolParts, IdentifierError> {
        let s = s.trim().to_uppercase();
        if s.len() != IDENTIFIER_LEN {
            return Err(IdentifierError::InvalidFormat(format!(
                "expected {IDENTIFIER_LEN} characters, got {}",
                s.len()
            )));
        }
        if !s.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(IdentifierError::InvalidFormat(
                "identifier must be ASCII alphanumeric".to_string(),
            ));
        }

        let mut rest = s.as_str();
        let mut take = |n: usize| {
            let (head, tail) = rest.split_at(n);
            rest = tail;
            head.to_string()
        };

        let parts = SymbolParts {
            bazar_type: take(BAZAR_TYPE_LEN),
            product_name: take(PRODUCT_NAME_LEN),
            producer_name: take(PRODUCER_NAME_LEN),
            contract_type: take(CONTRACT_TYPE_LEN),
            load_type_code: take(LOAD_TYPE_CODE_LEN),
            delivery_place: take(DELIVERY_PLACE_LEN),
            delivery_period: take(DELIVERY_PERIOD_LEN),
            date_code: take(DATE_CODE_LEN),
        };

        if !parts.date_code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(IdentifierError::InvalidFormat(format!(
                "date suffix '{}' must be six digits",
                parts.date_code
            )));
        }

        Ok(parts)
    }
}

impl fmt::Display for SymbolIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SymbolIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Components of a decomposed identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolParts {
    /// Bazar type code
    pub bazar_type: String,
    /// Product code
    pub product_name: String,
    /// Producer code
    pub producer_name: String,
    /// Contract type code
    pub contract_type: String,
    /// Load-type code
    pub load_type_code: String,
    /// Delivery place code
    pub delivery_place: String,
    /// Delivery period code
    pub delivery_period: String,
    /// Raw `yyMMdd` suffix
    pub date_code: String,
}

impl SymbolParts {
    /// Resolve the two-digit year: 50-99 map to 13xx, 00-49 to 14xx.
    pub fn date(&self) -> Result<CalendarDate, IdentifierError> {
        let num = |range: std::ops::Range<usize>| -> Result<u32, IdentifierError> {
            self.date_code[range]
                .parse()
                .map_err(|_| IdentifierError::InvalidFormat(self.date_code.clone()))
        };
        let yy = num(0..2)? as i32;
        let month = num(2..4)?;
        let day = num(4..6)?;
        let year = if yy >= 50 { 1300 + yy } else { 1400 + yy };
        CalendarDate::from_ymd(year, month, day)
            .map_err(|e| IdentifierError::InvalidDate(e.to_string()))
    }
}

/// Errors that can occur during identifier parsing
#[derive(Debug, thiserror::Error)]
pub enum IdentifierError {
    /// Invalid identifier format
    #[error("identifier error: {0}")]
    InvalidFormat(String),

    /// Date suffix does not name a real day
    #[error("identifier date error: {0}")]
    InvalidDate(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoadType;
    use std::collections::HashSet;

    fn date(s: &str) -> CalendarDate {
        CalendarDate::parse(s).unwrap()
    }

    #[test]
    fn test_generate_default_config() {
        let config = CrawlConfig::default();
        let id = SymbolIdentifier::generate(&config, "P", &date("1401/01/20"));
        assert_eq!(id.as_str(), "DAP00PFPEXD010120");
        assert_eq!(id.as_str().len(), IDENTIFIER_LEN);
    }

    #[test]
    fn test_generate_is_deterministic() {
        let config = CrawlConfig::default();
        let a = SymbolIdentifier::generate(&config, "B", &date("1399/05/05"));
        let b = SymbolIdentifier::generate(&config.clone(), "B", &date("1399/05/05"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_generate_injective_over_load_type_and_date() {
        let config = CrawlConfig::default();
        let mut seen = HashSet::new();
        for load_type in LoadType::defaults() {
            for day in config.date_range() {
                let id = SymbolIdentifier::generate(&config, &load_type.code, &day);
                assert!(seen.insert(id), "duplicate identifier");
            }
        }
        assert_eq!(seen.len() as u64, config.total_identifiers());
    }

    #[test]
    fn test_prefix_identical_across_load_types() {
        let config = CrawlConfig::default();
        let day = date("1400/02/03");
        let base = SymbolIdentifier::generate(&config, "B", &day);
        let peak = SymbolIdentifier::generate(&config, "P", &day);
        assert_eq!(&base.as_str()[..7], "DAP00PF");
        assert_eq!(&base.as_str()[..7], &peak.as_str()[..7]);
        assert_eq!(&base.as_str()[8..], &peak.as_str()[8..]);
    }

    #[test]
    fn test_parse_round_trip() {
        let parts = SymbolIdentifier::parse("dap00pfbexd990120").unwrap();
        assert_eq!(parts.bazar_type, "D");
        assert_eq!(parts.product_name, "AP");
        assert_eq!(parts.producer_name, "00");
        assert_eq!(parts.contract_type, "PF");
        assert_eq!(parts.load_type_code, "B");
        assert_eq!(parts.delivery_place, "EX");
        assert_eq!(parts.delivery_period, "D");
        assert_eq!(parts.date_code, "990120");
        assert_eq!(parts.date().unwrap(), date("1399/01/20"));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(SymbolIdentifier::parse("DAP00PF").is_err());
        assert!(SymbolIdentifier::parse("DAP00PFBEXD99012X").is_err());
        assert!(SymbolIdentifier::parse("DAP00PF-EXD990120").is_err());
    }

    #[test]
    fn test_parts_date_rejects_impossible_day() {
        let parts = SymbolIdentifier::parse("DAP00PFBEXD991332").unwrap();
        assert!(matches!(parts.date(), Err(IdentifierError::InvalidDate(_))));
    }
}
