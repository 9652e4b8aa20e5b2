//! Bar and PriceSeries: the daily market data units.

use super::ticker::Ticker;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Daily OHLCV bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Bar {
    /// Returns true if any price field is NaN.
    pub fn is_void(&self) -> bool {
        self.open.is_nan() || self.high.is_nan() || self.low.is_nan() || self.close.is_nan()
    }

    /// Basic OHLC sanity check: high is the top of the bar, low the bottom, prices positive.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.open > 0.0
            && self.close > 0.0
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum SeriesError {
    #[error("bar dates must be strictly increasing: {previous} is followed by {next}")]
    NotStrictlyIncreasing { previous: NaiveDate, next: NaiveDate },

    #[error("duplicate bar date {0}")]
    DuplicateDate(NaiveDate),
}

/// Time-ordered daily bars for one ticker.
///
/// Dates are strictly increasing. The invariant is checked on construction
/// and the bars are never exposed mutably, so every series that exists holds it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    ticker: Ticker,
    bars: Vec<Bar>,
}

impl PriceSeries {
    /// Build a series from bars that are already in ascending date order.
    pub fn new(ticker: Ticker, bars: Vec<Bar>) -> Result<Self, SeriesError> {
        for pair in bars.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(SeriesError::NotStrictlyIncreasing {
                    previous: pair[0].date,
                    next: pair[1].date,
                });
            }
        }
        Ok(Self { ticker, bars })
    }

    /// Build a series from bars in any order. Duplicate dates are rejected.
    pub fn from_unsorted(ticker: Ticker, mut bars: Vec<Bar>) -> Result<Self, SeriesError> {
        bars.sort_by_key(|b| b.date);
        if let Some(pair) = bars.windows(2).find(|w| w[0].date == w[1].date) {
            return Err(SeriesError::DuplicateDate(pair[0].date));
        }
        Ok(Self { ticker, bars })
    }

    pub fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    /// Stable BLAKE3 digest over the ticker and every bar value.
    pub fn content_hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.ticker.as_str().as_bytes());
        for bar in &self.bars {
            hasher.update(bar.date.to_string().as_bytes());
            hasher.update(&bar.open.to_le_bytes());
            hasher.update(&bar.high.to_le_bytes());
            hasher.update(&bar.low.to_le_bytes());
            hasher.update(&bar.close.to_le_bytes());
            hasher.update(&bar.volume.to_le_bytes());
        }
        hasher.finalize().to_hex().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(day: u32, close: f64) -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: close - 1.0,
            high: close + 2.0,
            low: close - 2.0,
            close,
            volume: 50_000,
        }
    }

    fn ticker() -> Ticker {
        Ticker::parse("SPY").unwrap()
    }

    #[test]
    fn bar_is_sane() {
        assert!(bar(2, 103.0).is_sane());
    }

    #[test]
    fn bar_detects_void() {
        let mut b = bar(2, 103.0);
        b.open = f64::NAN;
        assert!(b.is_void());
        assert!(!b.is_sane());
    }

    #[test]
    fn bar_detects_insane_high_low() {
        let mut b = bar(2, 103.0);
        b.high = 90.0;
        assert!(!b.is_sane());
    }

    #[test]
    fn series_accepts_ascending_dates() {
        let series = PriceSeries::new(ticker(), vec![bar(2, 1.0), bar(3, 2.0), bar(5, 3.0)]).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.closes(), vec![1.0, 2.0, 3.0]);
        assert_eq!(series.first_date(), NaiveDate::from_ymd_opt(2024, 1, 2));
    }

    #[test]
    fn series_rejects_out_of_order_dates() {
        let err = PriceSeries::new(ticker(), vec![bar(3, 1.0), bar(2, 2.0)]).unwrap_err();
        assert!(matches!(err, SeriesError::NotStrictlyIncreasing { .. }));
    }

    #[test]
    fn series_rejects_repeated_date() {
        let err = PriceSeries::new(ticker(), vec![bar(2, 1.0), bar(2, 2.0)]).unwrap_err();
        assert!(matches!(err, SeriesError::NotStrictlyIncreasing { .. }));
    }

    #[test]
    fn from_unsorted_sorts_and_rejects_duplicates() {
        let series =
            PriceSeries::from_unsorted(ticker(), vec![bar(4, 3.0), bar(2, 1.0), bar(3, 2.0)])
                .unwrap();
        assert_eq!(series.closes(), vec![1.0, 2.0, 3.0]);

        let err = PriceSeries::from_unsorted(ticker(), vec![bar(4, 3.0), bar(4, 1.0)]).unwrap_err();
        assert_eq!(
            err,
            SeriesError::DuplicateDate(NaiveDate::from_ymd_opt(2024, 1, 4).unwrap())
        );
    }

    #[test]
    fn content_hash_is_deterministic_and_value_sensitive() {
        let a = PriceSeries::new(ticker(), vec![bar(2, 1.0), bar(3, 2.0)]).unwrap();
        let b = PriceSeries::new(ticker(), vec![bar(2, 1.0), bar(3, 2.0)]).unwrap();
        let c = PriceSeries::new(ticker(), vec![bar(2, 1.0), bar(3, 2.5)]).unwrap();
        assert_eq!(a.content_hash(), b.content_hash());
        assert_ne!(a.content_hash(), c.content_hash());
    }

    #[test]
    fn bar_serialization_roundtrip() {
        let b = bar(2, 103.0);
        let json = serde_json::to_string(&b).unwrap();
        let back: Bar = serde_json::from_str(&json).unwrap();
        assert_eq!(b, back);
    }
}
