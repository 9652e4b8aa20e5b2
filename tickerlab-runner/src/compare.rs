//! Side-by-side performance of several tickers over one window.
//!
//! Tickers are fetched one after another. A ticker that fails to fetch is
//! recorded in `failures` and the rest of the comparison goes on.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

use tickerlab_core::data::{DataProvider, FetchRequest};
use tickerlab_core::domain::{FetchWindow, PriceSeries, Ticker};
use tickerlab_core::indicators::{DailyReturn, Indicator};

/// Trading days per year used to annualize volatility.
pub const TRADING_DAYS: f64 = 252.0;

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonEntry {
    pub ticker: Ticker,
    /// close / first close, per date.
    pub normalized: Vec<(NaiveDate, f64)>,
    pub total_return: f64,
    /// Sample std of daily returns times sqrt(252). `None` with fewer than 3 bars.
    pub annualized_volatility: Option<f64>,
}

impl ComparisonEntry {
    pub fn from_series(series: &PriceSeries) -> Option<Self> {
        let first = series.bars().first()?.close;
        if first <= 0.0 {
            return None;
        }
        let normalized: Vec<(NaiveDate, f64)> = series
            .bars()
            .iter()
            .map(|b| (b.date, b.close / first))
            .collect();
        let total_return = normalized.last().map_or(0.0, |(_, v)| v - 1.0);

        let returns: Vec<f64> = DailyReturn
            .compute(series.bars())
            .into_iter()
            .filter(|r| r.is_finite())
            .collect();
        let annualized_volatility = (returns.len() >= 2).then(|| {
            let n = returns.len() as f64;
            let mean = returns.iter().sum::<f64>() / n;
            let var = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n - 1.0);
            var.sqrt() * TRADING_DAYS.sqrt()
        });

        Some(Self {
            ticker: series.ticker().clone(),
            normalized,
            total_return,
            annualized_volatility,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ComparisonFailure {
    pub ticker: Ticker,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Comparison {
    pub entries: Vec<ComparisonEntry>,
    pub failures: Vec<ComparisonFailure>,
}

impl Comparison {
    /// Entries sorted by total return, best first.
    pub fn ranked(&self) -> Vec<&ComparisonEntry> {
        let mut ranked: Vec<&ComparisonEntry> = self.entries.iter().collect();
        ranked.sort_by(|a, b| b.total_return.total_cmp(&a.total_return));
        ranked
    }
}

pub fn compare_tickers(
    provider: &dyn DataProvider,
    tickers: &[Ticker],
    window: FetchWindow,
) -> Comparison {
    let mut comparison = Comparison::default();
    for ticker in tickers {
        let request = FetchRequest::new(ticker.clone(), window);
        let fetched = provider
            .fetch_history(&request)
            .and_then(|outcome| outcome.into_result());
        match fetched {
            Ok(series) => match ComparisonEntry::from_series(&series) {
                Some(entry) => comparison.entries.push(entry),
                None => comparison.failures.push(ComparisonFailure {
                    ticker: ticker.clone(),
                    reason: "series has no usable first close".into(),
                }),
            },
            Err(e) => {
                warn!(ticker = %ticker, error = %e, "comparison fetch failed");
                comparison.failures.push(ComparisonFailure {
                    ticker: ticker.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }
    info!(
        compared = comparison.entries.len(),
        failed = comparison.failures.len(),
        "comparison complete"
    );
    comparison
}
