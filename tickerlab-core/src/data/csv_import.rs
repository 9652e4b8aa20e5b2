//! CSV import provider.
//!
//! Reads `{dir}/{TICKER}.csv` files with a `date,open,high,low,close,volume`
//! header. Rows may arrive in any order; the series is sorted and duplicate
//! dates are rejected. A missing file answers with `FetchOutcome::NoData`.

use super::provider::{DataError, DataProvider, DataSource, FetchOutcome, FetchRequest};
use crate::domain::{Bar, CompanyInfo, FetchWindow, PriceSeries, Ticker};
use chrono::{Local, NaiveDate};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct CsvProvider {
    dir: PathBuf,
    today: NaiveDate,
}

impl CsvProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            today: Local::now().date_naive(),
        }
    }

    /// Anchor period windows at `today` instead of the local date.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn path_for(&self, ticker: &Ticker) -> PathBuf {
        self.dir.join(format!("{}.csv", ticker.as_str()))
    }

    fn read_bars(path: &Path, ticker: &Ticker) -> Result<Vec<Bar>, DataError> {
        let failed = |reason: String| DataError::FetchFailed {
            ticker: ticker.clone(),
            reason,
        };
        let mut reader = csv::Reader::from_path(path).map_err(|e| failed(e.to_string()))?;
        reader
            .deserialize::<Bar>()
            .map(|row| row.map_err(|e| failed(format!("{}: {e}", path.display()))))
            .collect()
    }
}

impl DataProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv"
    }

    fn source(&self) -> DataSource {
        DataSource::CsvImport
    }

    fn fetch_history(&self, request: &FetchRequest) -> Result<FetchOutcome, DataError> {
        let path = self.path_for(&request.ticker);
        if !path.exists() {
            debug!(path = %path.display(), "no CSV file for ticker");
            return Ok(FetchOutcome::NoData {
                ticker: request.ticker.clone(),
            });
        }

        let (start, end) = match request.window {
            FetchWindow::Period(period) => period.to_date_range(self.today),
            FetchWindow::Range(range) => (range.start(), range.end()),
        };

        let bars: Vec<Bar> = Self::read_bars(&path, &request.ticker)?
            .into_iter()
            .filter(|b| b.date >= start && b.date <= end && !b.is_void())
            .collect();
        debug!(path = %path.display(), rows = bars.len(), "read CSV bars");

        if bars.is_empty() {
            return Ok(FetchOutcome::NoData {
                ticker: request.ticker.clone(),
            });
        }
        Ok(FetchOutcome::Data(PriceSeries::from_unsorted(
            request.ticker.clone(),
            bars,
        )?))
    }

    fn company_info(&self, _ticker: &Ticker) -> Result<CompanyInfo, DataError> {
        Ok(CompanyInfo::default())
    }

    fn is_available(&self) -> bool {
        self.dir.is_dir()
    }
}
