//! Data provider trait, fetch requests and outcomes, and structured errors.
//!
//! The `DataProvider` trait abstracts over data sources (Yahoo Finance, CSV
//! import, synthetic walks) so the pipeline can swap implementations and
//! tests never touch the network.
//!
//! A fetch has three outcomes and callers can branch on each:
//! - `Ok(FetchOutcome::Data(series))`: at least one bar
//! - `Ok(FetchOutcome::NoData { .. })`: the source answered but had nothing
//! - `Err(DataError)`: the fetch itself failed

use crate::domain::{CompanyInfo, FetchWindow, PriceSeries, SeriesError, Ticker};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// What to fetch. Both fields are already validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchRequest {
    pub ticker: Ticker,
    pub window: FetchWindow,
}

impl FetchRequest {
    pub fn new(ticker: Ticker, window: FetchWindow) -> Self {
        Self { ticker, window }
    }
}

/// Result of a fetch that reached the data source.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    Data(PriceSeries),
    NoData { ticker: Ticker },
}

impl FetchOutcome {
    /// Collapse into a series, treating "no data" as an error.
    pub fn into_result(self) -> Result<PriceSeries, DataError> {
        match self {
            FetchOutcome::Data(series) => Ok(series),
            FetchOutcome::NoData { ticker } => Err(DataError::NoDataFound { ticker }),
        }
    }

    pub fn has_data(&self) -> bool {
        matches!(self, FetchOutcome::Data(_))
    }
}

/// Structured errors for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("fetch failed for {ticker}: {reason}")]
    FetchFailed { ticker: Ticker, reason: String },

    #[error("no data found for {ticker}")]
    NoDataFound { ticker: Ticker },

    #[error("request for {ticker} timed out after {attempts} attempt(s)")]
    Timeout { ticker: Ticker, attempts: u32 },

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("data provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("provider returned an invalid series: {0}")]
    InvalidSeries(#[from] SeriesError),
}

/// Timeout and retry policy for network providers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    /// Per-request timeout.
    pub timeout_secs: u64,
    /// Retries after the first attempt for transient failures.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each further retry.
    pub backoff_base_ms: u64,
}

impl FetchSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Delay before retry number `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
        Duration::from_millis(self.backoff_base_ms.saturating_mul(factor))
    }
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_retries: 3,
            backoff_base_ms: 500,
        }
    }
}

/// Where a series came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    YahooFinance,
    CsvImport,
    Synthetic,
}

/// A source of daily price history and company metadata.
pub trait DataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    fn source(&self) -> DataSource;

    /// Fetch daily bars for the request's ticker and window.
    fn fetch_history(&self, request: &FetchRequest) -> Result<FetchOutcome, DataError>;

    /// Company metadata. Missing fields are `None`; only transport failures error.
    fn company_info(&self, ticker: &Ticker) -> Result<CompanyInfo, DataError>;

    /// False while the provider refuses requests (e.g. circuit breaker open).
    fn is_available(&self) -> bool;
}
