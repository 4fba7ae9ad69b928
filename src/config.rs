//! Crawl configuration
//!
//! [`CrawlConfig`] is the single immutable value a crawl runs against. Defaults match
//! the venue's daily active-power contracts; every field can be overridden from a JSON
//! file or from the command line.

use crate::calendar::{CalendarDate, DateRange};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Venue host
pub const DEFAULT_BASE_URL: &str = "http://www.tsetmc.com";

/// Browser-like user agent; the venue rejects obviously scripted clients
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:49.0) Gecko/20100101 Firefox/49.0";

/// Per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const DEFAULT_START_DATE: &str = "1399/01/20";
const DEFAULT_END_DATE: &str = "1401/01/20";

/// Fixed widths of the identifier components, in identifier order.
pub(crate) const BAZAR_TYPE_LEN: usize = 1;
pub(crate) const PRODUCT_NAME_LEN: usize = 2;
pub(crate) const PRODUCER_NAME_LEN: usize = 2;
pub(crate) const CONTRACT_TYPE_LEN: usize = 2;
pub(crate) const LOAD_TYPE_CODE_LEN: usize = 1;
pub(crate) const DELIVERY_PLACE_LEN: usize = 2;
pub(crate) const DELIVERY_PERIOD_LEN: usize = 1;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Start or end date could not be parsed
    #[error("invalid date format: {0}")]
    InvalidDateFormat(String),

    /// End date precedes start date
    #[error("end date {end} is before start date {start}")]
    EndBeforeStart {
        /// Configured start date
        start: CalendarDate,
        /// Configured end date
        end: CalendarDate,
    },

    /// A code field has the wrong width or alphabet
    #[error("invalid {field} code '{value}': expected {expected_len} ASCII alphanumeric character(s)")]
    InvalidCode {
        /// Field name
        field: &'static str,
        /// Offending value
        value: String,
        /// Required width
        expected_len: usize,
    },

    /// No load types configured
    #[error("at least one load type is required")]
    NoLoadTypes,

    /// Two load types share a name or code
    #[error("duplicate load type: {0}")]
    DuplicateLoadType(String),

    /// Load-type flag not in NAME=CODE form
    #[error("invalid load type '{0}': expected NAME=CODE")]
    InvalidLoadType(String),

    /// Timeout must be positive
    #[error("timeout must be greater than zero")]
    ZeroTimeout,

    /// Reading the config file failed
    #[error("IO error: {0}")]
    IoError(String),

    /// Config file is not valid JSON for this schema
    #[error("parse error: {0}")]
    ParseError(String),
}

impl From<crate::calendar::CalendarError> for ConfigError {
    fn from(e: crate::calendar::CalendarError) -> Self {
        ConfigError::InvalidDateFormat(e.to_string())
    }
}

/// One electricity delivery profile: display name and single-character code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadType {
    /// Human name used in logs (e.g. "Base")
    pub name: String,
    /// Code embedded in the identifier (e.g. "B")
    pub code: String,
}

impl LoadType {
    /// Create a load type
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
        }
    }

    /// Parse the `NAME=CODE` command-line form
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let (name, code) = s
            .split_once('=')
            .ok_or_else(|| ConfigError::InvalidLoadType(s.to_string()))?;
        let (name, code) = (name.trim(), code.trim());
        if name.is_empty() || code.is_empty() {
            return Err(ConfigError::InvalidLoadType(s.to_string()));
        }
        Ok(Self::new(name, code))
    }

    /// Base, Low, Mid, Peak in venue order
    pub fn defaults() -> Vec<LoadType> {
        vec![
            LoadType::new("Base", "B"),
            LoadType::new("Low", "L"),
            LoadType::new("Mid", "M"),
            LoadType::new("Peak", "P"),
        ]
    }
}

/// Everything a crawl needs, fixed for its whole duration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// 'D' domestic, 'I' international
    pub bazar_type: String,
    /// 'AP' active power, ...
    pub product_name: String,
    /// '00' for the electricity exchange itself
    pub producer_name: String,
    /// 'PF' forward, 'CA' cash
    pub contract_type: String,
    /// Ordered load types; iteration order is crawl order
    pub load_types: Vec<LoadType>,
    /// 'EX' ex-works, ...
    pub delivery_place: String,
    /// 'D' day, 'W' week, 'M' month, 'S' season, 'Y' year
    pub delivery_period: String,
    /// First delivery date (inclusive)
    pub start_date: CalendarDate,
    /// Last delivery date (inclusive)
    pub end_date: CalendarDate,
    /// User-Agent header sent with every request
    pub user_agent: String,
    /// Venue base URL
    pub base_url: String,
    /// Per-request timeout
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        // The default literals are valid Shamsi dates.
        let start_date = CalendarDate::parse(DEFAULT_START_DATE)
            .unwrap_or_else(|_| unreachable!("default start date is valid"));
        let end_date = CalendarDate::parse(DEFAULT_END_DATE)
            .unwrap_or_else(|_| unreachable!("default end date is valid"));

        Self {
            bazar_type: "D".to_string(),
            product_name: "AP".to_string(),
            producer_name: "00".to_string(),
            contract_type: "PF".to_string(),
            load_types: LoadType::defaults(),
            delivery_place: "EX".to_string(),
            delivery_period: "D".to_string(),
            start_date,
            end_date,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl CrawlConfig {
    /// Load a config from a JSON file; missing fields take their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::IoError(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&text)
    }

    /// Parse a config from JSON text
    ///
    /// A date string that is not a Shamsi date is an
    /// [`ConfigError::InvalidDateFormat`], like a bad date flag.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        for key in ["start_date", "end_date"] {
            if let Some(date) = value.get(key).and_then(serde_json::Value::as_str) {
                CalendarDate::parse(date)?;
            }
        }
        serde_json::from_value(value).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Override the date window, parsing both ends
    pub fn with_dates(mut self, start: &str, end: &str) -> Result<Self, ConfigError> {
        self.start_date = CalendarDate::parse(start)?;
        self.end_date = CalendarDate::parse(end)?;
        Ok(self)
    }

    /// Replace the load-type list
    pub fn with_load_types(mut self, load_types: Vec<LoadType>) -> Self {
        self.load_types = load_types;
        self
    }

    /// Point the fetcher at another host
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the User-Agent header
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// A new traversal of the configured date window
    pub fn date_range(&self) -> DateRange {
        DateRange::new(self.start_date, self.end_date)
    }

    /// Number of identifiers a full crawl attempts
    pub fn total_identifiers(&self) -> u64 {
        self.load_types.len() as u64 * self.date_range().len()
    }

    /// Check everything a crawl relies on before the first request
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_code("bazar type", &self.bazar_type, BAZAR_TYPE_LEN)?;
        check_code("product name", &self.product_name, PRODUCT_NAME_LEN)?;
        check_code("producer name", &self.producer_name, PRODUCER_NAME_LEN)?;
        check_code("contract type", &self.contract_type, CONTRACT_TYPE_LEN)?;
        check_code("delivery place", &self.delivery_place, DELIVERY_PLACE_LEN)?;
        check_code("delivery period", &self.delivery_period, DELIVERY_PERIOD_LEN)?;

        if self.load_types.is_empty() {
            return Err(ConfigError::NoLoadTypes);
        }
        for (i, load_type) in self.load_types.iter().enumerate() {
            check_code("load type", &load_type.code, LOAD_TYPE_CODE_LEN)?;
            let duplicate = self.load_types[..i]
                .iter()
                .any(|prev| prev.name == load_type.name || prev.code == load_type.code);
            if duplicate {
                return Err(ConfigError::DuplicateLoadType(format!(
                    "{}={}",
                    load_type.name, load_type.code
                )));
            }
        }

        if self.end_date < self.start_date {
            return Err(ConfigError::EndBeforeStart {
                start: self.start_date,
                end: self.end_date,
            });
        }

        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }

        Ok(())
    }
}

fn check_code(field: &'static str, value: &str, expected_len: usize) -> Result<(), ConfigError> {
    if value.len() == expected_len && value.bytes().all(|b| b.is_ascii_alphanumeric()) {
        Ok(())
    } else {
        Err(ConfigError::InvalidCode {
            field,
            value: value.to_string(),
            expected_len,
        })
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}
