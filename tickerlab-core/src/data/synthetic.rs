//! Synthetic data provider.
//!
//! Produces a weekday-only random walk from a starting price of 100.0, seeded
//! per ticker so the same request always yields the same bars. Used offline
//! and in tests. The provider can also be told to answer with no data or to
//! fail, which lets callers exercise every fetch outcome without a network.

use super::provider::{
    DataError, DataProvider, DataSource, FetchOutcome, FetchRequest,
};
use crate::domain::{Bar, CompanyInfo, FetchWindow, PriceSeries, Ticker};
use crate::rng::RngHierarchy;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::Rng;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntheticMode {
    RandomWalk,
    /// Answer every request with `FetchOutcome::NoData`.
    Empty,
    /// Fail every request with `DataError::FetchFailed`.
    Failing(String),
}

#[derive(Debug, Clone)]
pub struct SyntheticProvider {
    today: NaiveDate,
    mode: SyntheticMode,
    seeds: RngHierarchy,
}

impl SyntheticProvider {
    /// Random-walk provider whose calendar ends at `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            mode: SyntheticMode::RandomWalk,
            seeds: RngHierarchy::default(),
        }
    }

    pub fn with_mode(mut self, mode: SyntheticMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seeds = RngHierarchy::new(seed);
        self
    }

    /// Weekday bars for `ticker` over `[start, end]`.
    pub fn generate(&self, ticker: &Ticker, start: NaiveDate, end: NaiveDate) -> Vec<Bar> {
        let mut rng = self.seeds.rng_for("synthetic", ticker.as_str());
        let mut bars = Vec::new();
        let mut price = 100.0_f64;
        let mut current = start;

        while current <= end {
            if matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
                current += Duration::days(1);
                continue;
            }

            let daily_return: f64 = rng.gen_range(-0.02..0.0205);
            let open = price;
            let close = price * (1.0 + daily_return);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
            let volume = rng.gen_range(500_000..5_000_000u64);

            bars.push(Bar {
                date: current,
                open,
                high,
                low,
                close,
                volume,
            });

            price = close;
            current += Duration::days(1);
        }

        bars
    }

    fn bounds(&self, window: &FetchWindow) -> (NaiveDate, NaiveDate) {
        match window {
            FetchWindow::Period(period) => period.to_date_range(self.today),
            FetchWindow::Range(range) => (range.start(), range.end()),
        }
    }
}

impl DataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn source(&self) -> DataSource {
        DataSource::Synthetic
    }

    fn fetch_history(&self, request: &FetchRequest) -> Result<FetchOutcome, DataError> {
        match &self.mode {
            SyntheticMode::Failing(reason) => Err(DataError::FetchFailed {
                ticker: request.ticker.clone(),
                reason: reason.clone(),
            }),
            SyntheticMode::Empty => Ok(FetchOutcome::NoData {
                ticker: request.ticker.clone(),
            }),
            SyntheticMode::RandomWalk => {
                let (start, end) = self.bounds(&request.window);
                let bars = self.generate(&request.ticker, start, end);
                if bars.is_empty() {
                    return Ok(FetchOutcome::NoData {
                        ticker: request.ticker.clone(),
                    });
                }
                Ok(FetchOutcome::Data(PriceSeries::new(request.ticker.clone(), bars)?))
            }
        }
    }

    fn company_info(&self, ticker: &Ticker) -> Result<CompanyInfo, DataError> {
        if let SyntheticMode::Failing(reason) = &self.mode {
            return Err(DataError::FetchFailed {
                ticker: ticker.clone(),
                reason: reason.clone(),
            });
        }
        Ok(CompanyInfo {
            name: Some(format!("{ticker} Synthetic Holdings")),
            ..CompanyInfo::default()
        })
    }

    fn is_available(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DateRange, Period};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 30).unwrap()
    }

    fn request(symbol: &str, window: FetchWindow) -> FetchRequest {
        FetchRequest::new(Ticker::parse(symbol).unwrap(), window)
    }

    #[test]
    fn one_year_walk_has_only_weekdays() {
        let provider = SyntheticProvider::new(today());
        let series = provider
            .fetch_history(&request("SPY", FetchWindow::Period(Period::OneYear)))
            .unwrap()
            .into_result()
            .unwrap();
        assert!(series.len() > 250 && series.len() < 265, "{}", series.len());
        assert!(series
            .bars()
            .iter()
            .all(|b| !matches!(b.date.weekday(), Weekday::Sat | Weekday::Sun)));
        assert!(series.bars().iter().all(|b| b.is_sane()));
    }

    #[test]
    fn walks_are_deterministic_per_ticker() {
        let provider = SyntheticProvider::new(today());
        let window = FetchWindow::Period(Period::ThreeMonths);
        let a = provider.fetch_history(&request("SPY", window)).unwrap().into_result().unwrap();
        let b = provider.fetch_history(&request("SPY", window)).unwrap().into_result().unwrap();
        let c = provider.fetch_history(&request("QQQ", window)).unwrap().into_result().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), c.len());
        assert_ne!(a.closes(), c.closes());
    }

    #[test]
    fn explicit_range_is_respected() {
        let d = |m, day| NaiveDate::from_ymd_opt(2025, m, day).unwrap();
        let range = DateRange::new(d(3, 3), d(3, 14), today()).unwrap();
        let series = SyntheticProvider::new(today())
            .fetch_history(&request("IBM", FetchWindow::Range(range)))
            .unwrap()
            .into_result()
            .unwrap();
        assert_eq!(series.len(), 10);
        assert_eq!(series.first_date(), Some(d(3, 3)));
        assert_eq!(series.last_date(), Some(d(3, 14)));
    }

    #[test]
    fn empty_and_failing_modes_are_distinct() {
        let window = FetchWindow::Period(Period::OneMonth);
        let empty = SyntheticProvider::new(today()).with_mode(SyntheticMode::Empty);
        assert!(!empty.fetch_history(&request("SPY", window)).unwrap().has_data());

        let failing = SyntheticProvider::new(today())
            .with_mode(SyntheticMode::Failing("connection reset".into()));
        assert!(matches!(
            failing.fetch_history(&request("SPY", window)),
            Err(DataError::FetchFailed { .. })
        ));
    }

    #[test]
    fn company_info_is_partial() {
        let info = SyntheticProvider::new(today())
            .company_info(&Ticker::parse("SPY").unwrap())
            .unwrap();
        assert_eq!(info.known_fields(), 1);
    }
}
