//! Solar Hijri (Shamsi) calendar dates and inclusive day ranges
//!
//! The venue addresses its symbol pages by Shamsi date, so every date the crawler
//! touches lives in that calendar. Conversion to and from the proleptic Gregorian
//! calendar is arithmetic (33-year break table), with `chrono::NaiveDate` doing the
//! day arithmetic underneath.
//!
//! Dates are calendar days in the Asia/Tehran zone; they carry no time of day, so the
//! zone only matters when resolving "today" (see [`CalendarDate::today`]).

use chrono::{Datelike, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Asia/Tehran has been a fixed UTC+03:30 since daylight saving was abolished in 2022.
const TEHRAN_OFFSET_SECS: i32 = 3 * 3600 + 30 * 60;

/// Shamsi years at which the 33-year leap cycle shifts.
const BREAKS: [i32; 20] = [
    -61, 9, 38, 199, 426, 686, 756, 818, 1111, 1181, 1210, 1635, 2060, 2097, 2192, 2262, 2324,
    2394, 2456, 3178,
];

/// Calendar errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalendarError {
    /// Input is not a `yyyy/MM/dd` Shamsi date
    #[error("invalid date format: '{0}' (expected yyyy/MM/dd)")]
    InvalidDateFormat(String),

    /// Components parse but do not name a real day
    #[error("invalid date: {year}/{month:02}/{day:02}")]
    InvalidDate {
        /// Shamsi year
        year: i32,
        /// Shamsi month (1-12)
        month: u32,
        /// Day of month
        day: u32,
    },

    /// Date falls outside the supported Shamsi year range
    #[error("date out of supported range")]
    OutOfRange,
}

/// Result type for calendar operations
pub type CalendarResult<T> = Result<T, CalendarError>;

/// Leap-cycle position of a Shamsi year, plus where its Farvardin 1 falls in March.
struct YearInfo {
    /// Years since the last leap year (0 = this year is leap)
    leap: i32,
    /// Gregorian year in which this Shamsi year begins
    gy: i32,
    /// Day of March on which Farvardin 1 falls
    march: i32,
}

fn year_info(jy: i32) -> Option<YearInfo> {
    let last = BREAKS[BREAKS.len() - 1];
    if jy < BREAKS[0] || jy >= last {
        return None;
    }

    let gy = jy + 621;
    let mut leap_j = -14;
    let mut jp = BREAKS[0];
    let mut jump = 0;

    for &jm in &BREAKS[1..] {
        jump = jm - jp;
        if jy < jm {
            break;
        }
        leap_j += jump / 33 * 8 + (jump % 33) / 4;
        jp = jm;
    }

    let mut n = jy - jp;
    leap_j += n / 33 * 8 + (n % 33 + 3) / 4;
    if jump % 33 == 4 && jump - n == 4 {
        leap_j += 1;
    }

    let leap_g = gy / 4 - (gy / 100 + 1) * 3 / 4 - 150;
    let march = 20 + leap_j - leap_g;

    if jump - n < 6 {
        n = n - jump + (jump + 4) / 33 * 33;
    }
    let mut leap = ((n + 1) % 33 - 1) % 4;
    if leap == -1 {
        leap = 4;
    }

    Some(YearInfo { leap, gy, march })
}

fn days_in_month(year: i32, month: u32) -> Option<u32> {
    match month {
        1..=6 => Some(31),
        7..=11 => Some(30),
        12 => year_info(year).map(|info| if info.leap == 0 { 30 } else { 29 }),
        _ => None,
    }
}

fn shamsi_to_gregorian(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    let info = year_info(year)?;
    let farvardin_first = NaiveDate::from_ymd_opt(info.gy, 3, info.march as u32)?;
    let m = month as i64;
    let offset = (m - 1) * 31 - (m / 7) * (m - 7) + day as i64 - 1;
    farvardin_first.checked_add_signed(chrono::Duration::days(offset))
}

fn gregorian_to_shamsi(date: NaiveDate) -> Option<(i32, u32, u32)> {
    let gy = date.year();
    let mut jy = gy - 621;
    let info = year_info(jy)?;
    let farvardin_first = NaiveDate::from_ymd_opt(gy, 3, info.march as u32)?;
    let mut k = date.signed_duration_since(farvardin_first).num_days();

    if k >= 0 {
        if k <= 185 {
            return Some((jy, (1 + k / 31) as u32, (k % 31 + 1) as u32));
        }
        k -= 186;
    } else {
        jy -= 1;
        k += 179;
        if info.leap == 1 {
            k += 1;
        }
    }

    Some((jy, (7 + k / 30) as u32, (k % 30 + 1) as u32))
}

/// A day in the Shamsi calendar
///
/// # Examples
///
/// ```
/// use energy_symbol_crawler::calendar::CalendarDate;
///
/// let date = CalendarDate::parse("1399/01/20").unwrap();
/// assert_eq!(date.format("yyMMdd"), "990120");
/// assert_eq!(date.to_gregorian().to_string(), "2020-04-08");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CalendarDate {
    gregorian: NaiveDate,
    year: i32,
    month: u32,
    day: u32,
}

impl CalendarDate {
    /// Build a date from Shamsi components
    pub fn from_ymd(year: i32, month: u32, day: u32) -> CalendarResult<Self> {
        let max_day = days_in_month(year, month).ok_or(CalendarError::InvalidDate {
            year,
            month,
            day,
        })?;
        if day == 0 || day > max_day {
            return Err(CalendarError::InvalidDate { year, month, day });
        }
        let gregorian = shamsi_to_gregorian(year, month, day).ok_or(CalendarError::OutOfRange)?;
        Ok(Self {
            gregorian,
            year,
            month,
            day,
        })
    }

    /// Build a date from its Gregorian equivalent
    pub fn from_gregorian(gregorian: NaiveDate) -> CalendarResult<Self> {
        let (year, month, day) = gregorian_to_shamsi(gregorian).ok_or(CalendarError::OutOfRange)?;
        Ok(Self {
            gregorian,
            year,
            month,
            day,
        })
    }

    /// Parse `yyyy/MM/dd` (or `yyyy-MM-dd`); month and day may be one or two digits.
    pub fn parse(input: &str) -> CalendarResult<Self> {
        let invalid = || CalendarError::InvalidDateFormat(input.to_string());
        let trimmed = input.trim();
        let sep = if trimmed.contains('/') { '/' } else { '-' };

        let parts: Vec<&str> = trimmed.split(sep).collect();
        if parts.len() != 3 {
            return Err(invalid());
        }

        let widths_ok = (1..=4).contains(&parts[0].len())
            && (1..=2).contains(&parts[1].len())
            && (1..=2).contains(&parts[2].len());
        let digits_ok = parts
            .iter()
            .all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()));
        if !widths_ok || !digits_ok {
            return Err(invalid());
        }

        let year: i32 = parts[0].parse().map_err(|_| invalid())?;
        let month: u32 = parts[1].parse().map_err(|_| invalid())?;
        let day: u32 = parts[2].parse().map_err(|_| invalid())?;

        Self::from_ymd(year, month, day)
    }

    /// Current date in Asia/Tehran
    pub fn today() -> CalendarResult<Self> {
        let offset = FixedOffset::east_opt(TEHRAN_OFFSET_SECS).ok_or(CalendarError::OutOfRange)?;
        Self::from_gregorian(Utc::now().with_timezone(&offset).date_naive())
    }

    /// Shamsi year
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Shamsi month (1 = Farvardin)
    pub fn month(&self) -> u32 {
        self.month
    }

    /// Day of month
    pub fn day(&self) -> u32 {
        self.day
    }

    /// Gregorian equivalent of this day
    pub fn to_gregorian(&self) -> NaiveDate {
        self.gregorian
    }

    /// Whether this date's year has a 30-day Esfand
    pub fn is_leap_year(&self) -> bool {
        year_info(self.year).map(|info| info.leap == 0).unwrap_or(false)
    }

    /// Date `n` days later (or earlier for negative `n`)
    pub fn add_days(&self, n: i64) -> CalendarResult<Self> {
        let delta = chrono::Duration::try_days(n).ok_or(CalendarError::OutOfRange)?;
        let shifted = self
            .gregorian
            .checked_add_signed(delta)
            .ok_or(CalendarError::OutOfRange)?;
        Self::from_gregorian(shifted)
    }

    /// Signed number of days from `self` to `other`
    pub fn days_between(&self, other: &CalendarDate) -> i64 {
        other.gregorian.signed_duration_since(self.gregorian).num_days()
    }

    /// Three-way comparison
    pub fn compare(&self, other: &CalendarDate) -> Ordering {
        self.cmp(other)
    }

    /// Render with ICU-style tokens: `yyyy`, `yy`, `MM`, `M`, `dd`, `d`.
    /// Every other character is copied through.
    pub fn format(&self, pattern: &str) -> String {
        let chars: Vec<char> = pattern.chars().collect();
        let mut out = String::with_capacity(pattern.len() + 4);
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            let run = chars[i..].iter().take_while(|&&x| x == c).count();
            match c {
                'y' => {
                    if run == 2 {
                        out.push_str(&format!("{:02}", self.year.rem_euclid(100)));
                    } else {
                        out.push_str(&format!("{:0width$}", self.year, width = run));
                    }
                }
                'M' => out.push_str(&format!("{:0width$}", self.month, width = run.min(2))),
                'd' => out.push_str(&format!("{:0width$}", self.day, width = run.min(2))),
                _ => chars[i..i + run].iter().for_each(|&ch| out.push(ch)),
            }
            i += run;
        }

        out
    }
}

impl PartialOrd for CalendarDate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CalendarDate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.gregorian.cmp(&other.gregorian)
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}/{:02}/{:02}", self.year, self.month, self.day)
    }
}

impl FromStr for CalendarDate {
    type Err = CalendarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CalendarDate {
    type Error = CalendarError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CalendarDate> for String {
    fn from(date: CalendarDate) -> Self {
        date.to_string()
    }
}

/// Inclusive range of days
///
/// A `DateRange` is a plain value: every call to [`DateRange::iter`] starts a new
/// traversal at `start`, so the same range can be walked once per load type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: CalendarDate,
    end: CalendarDate,
}

impl DateRange {
    /// Range from `start` through `end`; empty when `start > end`
    pub fn new(start: CalendarDate, end: CalendarDate) -> Self {
        Self { start, end }
    }

    /// First day
    pub fn start(&self) -> CalendarDate {
        self.start
    }

    /// Last day
    pub fn end(&self) -> CalendarDate {
        self.end
    }

    /// Number of days in the range
    pub fn len(&self) -> u64 {
        let span = self.start.days_between(&self.end);
        if span < 0 {
            0
        } else {
            span as u64 + 1
        }
    }

    /// Whether the range yields no days
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fresh traversal from `start`
    pub fn iter(&self) -> DateRangeIter {
        DateRangeIter {
            next: Some(self.start),
            end: self.end,
        }
    }
}

impl IntoIterator for DateRange {
    type Item = CalendarDate;
    type IntoIter = DateRangeIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for &DateRange {
    type Item = CalendarDate;
    type IntoIter = DateRangeIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Day-by-day cursor over a [`DateRange`]
#[derive(Debug, Clone)]
pub struct DateRangeIter {
    next: Option<CalendarDate>,
    end: CalendarDate,
}

impl Iterator for DateRangeIter {
    type Item = CalendarDate;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.filter(|d| *d <= self.end)?;
        self.next = if current < self.end {
            current.add_days(1).ok()
        } else {
            None
        };
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = match self.next {
            Some(next) if next <= self.end => (next.days_between(&self.end) + 1) as usize,
            _ => 0,
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for DateRangeIter {}
