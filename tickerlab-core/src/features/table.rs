//! Feature tables and the complete-case datasets cut from them.

use super::target::Target;
use crate::domain::{Bar, Ticker};
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use serde::Serialize;

/// Days from 0001-01-01 (CE day 1) to 1970-01-01.
const UNIX_EPOCH_FROM_CE: i32 = 719_163;

/// Feature columns aligned row-for-row with the bars they were computed from.
#[derive(Debug, Clone)]
pub struct FeatureTable {
    ticker: Ticker,
    bars: Vec<Bar>,
    columns: Vec<(String, Vec<f64>)>,
}

impl FeatureTable {
    pub(crate) fn new(ticker: Ticker, bars: Vec<Bar>, columns: Vec<(String, Vec<f64>)>) -> Self {
        debug_assert!(columns.iter().all(|(_, c)| c.len() == bars.len()));
        Self {
            ticker,
            bars,
            columns,
        }
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

    pub fn feature_names(&self) -> Vec<String> {
        self.columns.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, values)| values.as_slice())
    }

    /// Feature values of row `i`, in column order.
    pub fn row(&self, i: usize) -> Vec<f64> {
        self.columns.iter().map(|(_, values)| values[i]).collect()
    }

    fn row_is_complete(&self, i: usize) -> bool {
        self.columns.iter().all(|(_, values)| values[i].is_finite())
    }

    /// Rows whose features and target are all defined. Incomplete rows are dropped.
    pub fn to_dataset(&self, target: Target) -> Dataset {
        let targets = target.values(&self.bars);
        let mut dataset = Dataset {
            feature_names: self.feature_names(),
            dates: Vec::new(),
            features: Vec::new(),
            target: Vec::new(),
        };
        for (i, &y) in targets.iter().enumerate() {
            if y.is_finite() && self.row_is_complete(i) {
                dataset.dates.push(self.bars[i].date);
                dataset.features.push(self.row(i));
                dataset.target.push(y);
            }
        }
        dataset
    }

    /// The newest row with every feature defined, whatever its target.
    ///
    /// For the last bar this is the row whose next close is still unknown.
    pub fn latest_complete_row(&self) -> Option<(NaiveDate, Vec<f64>)> {
        (0..self.len())
            .rev()
            .find(|&i| self.row_is_complete(i))
            .map(|i| (self.bars[i].date, self.row(i)))
    }

    /// Bars plus feature columns as a polars frame. Undefined values become nulls.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let days: Vec<i32> = self
            .bars
            .iter()
            .map(|b| b.date.num_days_from_ce() - UNIX_EPOCH_FROM_CE)
            .collect();
        let field = |f: fn(&Bar) -> f64| self.bars.iter().map(f).collect::<Vec<f64>>();

        let mut columns = vec![
            Column::new("date".into(), days).cast(&DataType::Date)?,
            Column::new("open".into(), field(|b: &Bar| b.open)),
            Column::new("high".into(), field(|b: &Bar| b.high)),
            Column::new("low".into(), field(|b: &Bar| b.low)),
            Column::new("close".into(), field(|b: &Bar| b.close)),
            Column::new(
                "volume".into(),
                self.bars.iter().map(|b| b.volume).collect::<Vec<u64>>(),
            ),
        ];
        for (name, values) in &self.columns {
            let nullable: Vec<Option<f64>> = values
                .iter()
                .map(|v| v.is_finite().then_some(*v))
                .collect();
            columns.push(Column::new(name.as_str().into(), nullable));
        }
        DataFrame::new(columns)
    }
}

/// Complete-case training data: one feature row and one target per date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub feature_names: Vec<String>,
    pub dates: Vec<NaiveDate>,
    pub features: Vec<Vec<f64>>,
    pub target: Vec<f64>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.target.len()
    }

    pub fn is_empty(&self) -> bool {
        self.target.is_empty()
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Rows at `indices`, in that order.
    pub fn select(&self, indices: &[usize]) -> Dataset {
        Dataset {
            feature_names: self.feature_names.clone(),
            dates: indices.iter().map(|&i| self.dates[i]).collect(),
            features: indices.iter().map(|&i| self.features[i].clone()).collect(),
            target: indices.iter().map(|&i| self.target[i]).collect(),
        }
    }
}
