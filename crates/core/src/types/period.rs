//! Billing period (`YYYY-MM`) type.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when parsing a [`BillingPeriod`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BillingPeriodError {
    /// Not in `YYYY-MM` form.
    #[error("billing period must be in YYYY-MM format (got {0:?})")]
    Format(String),
    /// Month outside 01-12.
    #[error("billing period month must be between 01 and 12 (got {0})")]
    Month(u32),
}

/// A calendar month used for meter readings and bills, written `YYYY-MM`.
///
/// ```
/// use village_water_core::BillingPeriod;
///
/// let period: BillingPeriod = "2025-03".parse().unwrap();
/// assert_eq!(period.year(), 2025);
/// assert_eq!(period.month(), 3);
/// assert_eq!(period.to_string(), "2025-03");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BillingPeriod {
    year: i32,
    month: u32,
}

impl BillingPeriod {
    /// Create a period from a year and a month (1-12).
    ///
    /// # Errors
    ///
    /// Returns [`BillingPeriodError::Month`] if `month` is out of range.
    pub fn new(year: i32, month: u32) -> Result<Self, BillingPeriodError> {
        if month == 0 || month > 12 {
            return Err(BillingPeriodError::Month(month));
        }
        Ok(Self { year, month })
    }

    /// The period containing the given date.
    #[must_use]
    pub fn containing(date: chrono::NaiveDate) -> Self {
        use chrono::Datelike;
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Parse a `YYYY-MM` string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not exactly four digits, a dash and
    /// two digits, or if the month is out of range.
    pub fn parse(s: &str) -> Result<Self, BillingPeriodError> {
        let format_err = || BillingPeriodError::Format(s.to_owned());

        let (year, month) = s.split_once('-').ok_or_else(format_err)?;
        let all_digits = |part: &str, len: usize| {
            part.len() == len && part.chars().all(|c| c.is_ascii_digit())
        };
        if !all_digits(year, 4) || !all_digits(month, 2) {
            return Err(format_err());
        }

        let year = year.parse().map_err(|_| format_err())?;
        let month = month.parse().map_err(|_| format_err())?;
        Self::new(year, month)
    }

    /// The year.
    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// The month (1-12).
    #[must_use]
    pub const fn month(&self) -> u32 {
        self.month
    }
}

impl fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl std::str::FromStr for BillingPeriod {
    type Err = BillingPeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for BillingPeriod {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BillingPeriod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
