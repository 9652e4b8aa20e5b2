//! Feature construction.
//!
//! A [`FeatureBuilder`] turns a [`PriceSeries`] into a [`FeatureTable`]: one
//! column per [`FeatureSpec`], aligned with the series dates, with `NaN`
//! wherever an indicator window is not yet full. [`FeatureTable::to_dataset`]
//! then cuts the complete-case rows used for training.

pub mod spec;
pub mod table;
pub mod target;

pub use spec::{FeatureError, FeatureSpec};
pub use table::{Dataset, FeatureTable};
pub use target::Target;

use crate::domain::PriceSeries;
use std::collections::HashSet;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureBuilder {
    specs: Vec<FeatureSpec>,
}

impl FeatureBuilder {
    /// Validates every spec and rejects duplicate columns.
    pub fn new(specs: Vec<FeatureSpec>) -> Result<Self, FeatureError> {
        if specs.is_empty() {
            return Err(FeatureError::Empty);
        }
        let mut seen = HashSet::new();
        for spec in &specs {
            spec.validate()?;
            if !seen.insert(spec.column_name()) {
                return Err(FeatureError::DuplicateColumn(spec.column_name()));
            }
        }
        Ok(Self { specs })
    }

    /// `sma_20`, `sma_50`, `daily_return`.
    pub fn default_set() -> Self {
        Self {
            specs: Self::default_specs(),
        }
    }

    pub fn default_specs() -> Vec<FeatureSpec> {
        vec![
            FeatureSpec::Sma { window: 20 },
            FeatureSpec::Sma { window: 50 },
            FeatureSpec::DailyReturn,
        ]
    }

    pub fn specs(&self) -> &[FeatureSpec] {
        &self.specs
    }

    /// Longest warmup among the requested columns.
    pub fn max_lookback(&self) -> usize {
        self.specs
            .iter()
            .map(|s| s.indicator().lookback())
            .max()
            .unwrap_or(0)
    }

    pub fn build(&self, series: &PriceSeries) -> FeatureTable {
        let columns: Vec<(String, Vec<f64>)> = self
            .specs
            .iter()
            .map(|spec| {
                let indicator = spec.indicator();
                (indicator.name().to_string(), indicator.compute(series.bars()))
            })
            .collect();
        debug!(
            ticker = %series.ticker(),
            rows = series.len(),
            columns = columns.len(),
            "built feature table"
        );
        FeatureTable::new(series.ticker().clone(), series.bars().to_vec(), columns)
    }
}

impl Default for FeatureBuilder {
    fn default() -> Self {
        Self::default_set()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Ticker;
    use crate::indicators::make_bars;

    fn series(n: usize) -> PriceSeries {
        let closes: Vec<f64> = (0..n).map(|i| 100.0 + (i as f64 * 0.3).sin()).collect();
        PriceSeries::new(Ticker::parse("TEST").unwrap(), make_bars(&closes)).unwrap()
    }

    #[test]
    fn default_set_columns() {
        let table = FeatureBuilder::default_set().build(&series(60));
        assert_eq!(table.feature_names(), vec!["sma_20", "sma_50", "daily_return"]);
        let defined = |name: &str| table.column(name).unwrap().iter().filter(|v| v.is_finite()).count();
        assert_eq!(defined("sma_20"), 41);
        assert_eq!(defined("sma_50"), 11);
        assert_eq!(defined("daily_return"), 59);
    }

    #[test]
    fn dataset_starts_after_longest_window() {
        let table = FeatureBuilder::default_set().build(&series(60));
        let ds = table.to_dataset(Target::NextClose);
        // Rows 49..=58 have every feature and a next close.
        assert_eq!(ds.len(), 10);
        assert_eq!(ds.dates[0], table.bars()[49].date);
    }

    #[test]
    fn short_series_yields_empty_dataset() {
        let table = FeatureBuilder::default_set().build(&series(30));
        assert!(table.to_dataset(Target::NextClose).is_empty());
        assert!(table.latest_complete_row().is_none());
    }

    #[test]
    fn rejects_duplicates_and_empty() {
        let dup = vec![FeatureSpec::DailyReturn, FeatureSpec::DailyReturn];
        assert_eq!(
            FeatureBuilder::new(dup),
            Err(FeatureError::DuplicateColumn("daily_return".into()))
        );
        assert_eq!(FeatureBuilder::new(vec![]), Err(FeatureError::Empty));
    }

    #[test]
    fn max_lookback_of_default_set() {
        assert_eq!(FeatureBuilder::default_set().max_lookback(), 49);
    }
}
