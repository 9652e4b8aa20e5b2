//! The result of one pipeline run.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use tickerlab_core::domain::Ticker;
use tickerlab_core::features::Target;
use tickerlab_core::metrics::EvaluationResult;
use tickerlab_core::model::{ModelKind, SplitPolicy};

/// Current schema version for exported reports.
pub const SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// One held-out row: what happened and what the model said.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeldOutPrediction {
    pub date: NaiveDate,
    pub actual: f64,
    pub predicted: f64,
}

impl HeldOutPrediction {
    pub fn error(&self) -> f64 {
        self.actual - self.predicted
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitSummary {
    pub policy: SplitPolicy,
    pub test_ratio: f64,
    pub train_rows: usize,
    pub test_rows: usize,
}

/// Prediction for the period after the newest complete feature row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub as_of: NaiveDate,
    pub predicted: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub ticker: Ticker,
    pub provider: String,
    /// Period code or `start..end`.
    pub window: String,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
    pub bar_count: usize,
    /// BLAKE3 of the fetched bars.
    pub dataset_hash: String,
    pub feature_names: Vec<String>,
    pub target: Target,
    pub model: ModelKind,
    pub standardized: bool,
    pub split: SplitSummary,
    pub metrics: EvaluationResult,
    pub predictions: Vec<HeldOutPrediction>,
    pub forecast: Option<Forecast>,
    pub generated_at: DateTime<Utc>,
}

impl PipelineReport {
    /// Human-readable summary for terminals.
    pub fn summary(&self) -> String {
        let mut s = format!(
            "{} | {} | {} bars {}..{} | model {}\n",
            self.ticker, self.window, self.bar_count, self.first_date, self.last_date, self.model
        );
        s.push_str(&format!(
            "features: {} | target: {}\n",
            self.feature_names.join(", "),
            self.target
        ));
        s.push_str(&format!(
            "split: {} train / {} test\n",
            self.split.train_rows, self.split.test_rows
        ));
        s.push_str(&self.metrics.report());
        if let Some(f) = self.forecast {
            s.push_str(&format!("forecast after {}: {:.4}\n", f.as_of, f.predicted));
        }
        s
    }
}
