//! Fetch windows: lookback periods and explicit date ranges.
//!
//! Date ranges are validated before any network call. The checks run in a
//! fixed order and the first failure wins:
//! 1. both dates parse as `YYYY-MM-DD`
//! 2. start < end
//! 3. neither date is after today
//! 4. the span is at most 3650 days

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Longest accepted explicit range, in days.
pub const MAX_RANGE_DAYS: i64 = 3650;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Input validation failures. Raised before any data source is contacted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid ticker '{0}': expected 1-5 letters optionally followed by digits")]
    InvalidTicker(String),

    #[error("{0}")]
    InvalidDateRange(DateRangeIssue),

    #[error("unknown period '{0}'")]
    UnknownPeriod(String),
}

/// Why a date range was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRangeIssue {
    BadFormat,
    StartNotBeforeEnd,
    StartInFuture,
    EndInFuture,
    TooLong,
}

impl DateRangeIssue {
    pub fn message(&self) -> &'static str {
        match self {
            DateRangeIssue::BadFormat => "Invalid date format. Use YYYY-MM-DD.",
            DateRangeIssue::StartNotBeforeEnd => "Start date must be before end date.",
            DateRangeIssue::StartInFuture => "Start date cannot be in the future.",
            DateRangeIssue::EndInFuture => "End date cannot be in the future.",
            DateRangeIssue::TooLong => "Date range cannot exceed 10 years.",
        }
    }
}

impl fmt::Display for DateRangeIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// A validated `[start, end]` range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Validate a range against `today`.
    pub fn new(start: NaiveDate, end: NaiveDate, today: NaiveDate) -> Result<Self, ValidationError> {
        let issue = if start >= end {
            Some(DateRangeIssue::StartNotBeforeEnd)
        } else if start > today {
            Some(DateRangeIssue::StartInFuture)
        } else if end > today {
            Some(DateRangeIssue::EndInFuture)
        } else if (end - start).num_days() > MAX_RANGE_DAYS {
            Some(DateRangeIssue::TooLong)
        } else {
            None
        };

        match issue {
            Some(issue) => Err(ValidationError::InvalidDateRange(issue)),
            None => Ok(Self { start, end }),
        }
    }

    /// Parse and validate two `YYYY-MM-DD` strings against `today`.
    pub fn parse(start: &str, end: &str, today: NaiveDate) -> Result<Self, ValidationError> {
        let bad_format = || ValidationError::InvalidDateRange(DateRangeIssue::BadFormat);
        let start = NaiveDate::parse_from_str(start.trim(), DATE_FORMAT).map_err(|_| bad_format())?;
        let end = NaiveDate::parse_from_str(end.trim(), DATE_FORMAT).map_err(|_| bad_format())?;
        Self::new(start, end, today)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

/// Validate a `YYYY-MM-DD` range against the local calendar date.
pub fn validate_date_range(start: &str, end: &str) -> Result<DateRange, ValidationError> {
    DateRange::parse(start, end, Local::now().date_naive())
}

/// `(ok, message)` form of [`validate_date_range`]; the message is empty on success.
pub fn check_date_range(start: &str, end: &str) -> (bool, String) {
    match validate_date_range(start, end) {
        Ok(_) => (true, String::new()),
        Err(e) => (false, e.to_string()),
    }
}

/// Lookback periods understood by the data provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "5d")]
    FiveDays,
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[serde(rename = "6mo")]
    SixMonths,
    #[default]
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "2y")]
    TwoYears,
    #[serde(rename = "5y")]
    FiveYears,
    #[serde(rename = "10y")]
    TenYears,
    #[serde(rename = "ytd")]
    YearToDate,
    #[serde(rename = "max")]
    Max,
}

impl Period {
    pub const ALL: [Period; 11] = [
        Period::OneDay,
        Period::FiveDays,
        Period::OneMonth,
        Period::ThreeMonths,
        Period::SixMonths,
        Period::OneYear,
        Period::TwoYears,
        Period::FiveYears,
        Period::TenYears,
        Period::YearToDate,
        Period::Max,
    ];

    /// Provider code, e.g. `"1mo"`.
    pub fn code(&self) -> &'static str {
        match self {
            Period::OneDay => "1d",
            Period::FiveDays => "5d",
            Period::OneMonth => "1mo",
            Period::ThreeMonths => "3mo",
            Period::SixMonths => "6mo",
            Period::OneYear => "1y",
            Period::TwoYears => "2y",
            Period::FiveYears => "5y",
            Period::TenYears => "10y",
            Period::YearToDate => "ytd",
            Period::Max => "max",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Period::OneDay => "1 Day",
            Period::FiveDays => "5 Days",
            Period::OneMonth => "1 Month",
            Period::ThreeMonths => "3 Months",
            Period::SixMonths => "6 Months",
            Period::OneYear => "1 Year",
            Period::TwoYears => "2 Years",
            Period::FiveYears => "5 Years",
            Period::TenYears => "10 Years",
            Period::YearToDate => "Year to Date",
            Period::Max => "Maximum Available",
        }
    }

    /// Approximate calendar span ending at `today`. `Max` has no fixed start
    /// and is capped at the longest explicit range.
    pub fn to_date_range(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        use chrono::{Datelike, Duration, Months};
        let start = match self {
            Period::OneDay => today - Duration::days(1),
            Period::FiveDays => today - Duration::days(5),
            Period::OneMonth => today - Months::new(1),
            Period::ThreeMonths => today - Months::new(3),
            Period::SixMonths => today - Months::new(6),
            Period::OneYear => today - Months::new(12),
            Period::TwoYears => today - Months::new(24),
            Period::FiveYears => today - Months::new(60),
            Period::TenYears => today - Months::new(120),
            Period::YearToDate => NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today),
            Period::Max => today - Duration::days(MAX_RANGE_DAYS),
        };
        (start, today)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Period {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Period::ALL
            .iter()
            .copied()
            .find(|p| p.code() == needle)
            .ok_or_else(|| ValidationError::UnknownPeriod(s.to_string()))
    }
}

/// What span of history to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchWindow {
    Period(Period),
    Range(DateRange),
}

impl Default for FetchWindow {
    fn default() -> Self {
        FetchWindow::Period(Period::default())
    }
}

impl fmt::Display for FetchWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchWindow::Period(p) => write!(f, "{}", p.label()),
            FetchWindow::Range(r) => write!(f, "{} to {}", r.start(), r.end()),
        }
    }
}
