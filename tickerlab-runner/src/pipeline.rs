//! The prediction pipeline as an explicit state machine.
//!
//! ```text
//! Idle -> DataFetched -> FeaturesBuilt -> Trained -> Evaluated
//!   \_________\______________\______________\_____-> Failed
//! ```
//!
//! Each stage consumes the previous stage's output. A failure at any stage
//! moves the machine to `Failed` and no partial report is produced.

use chrono::{Local, Utc};
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};

use tickerlab_core::data::{DataError, DataProvider, FetchRequest};
use tickerlab_core::domain::{PriceSeries, ValidationError};
use tickerlab_core::features::FeatureTable;
use tickerlab_core::metrics::{evaluate, MetricsError};
use tickerlab_core::model::{
    test_size, train_test_split, ModelError, Predictor, SplitError, TrainTestSplit,
};

use crate::config::{ConfigError, PipelineConfig, ValidatedConfig};
use crate::report::{Forecast, HeldOutPrediction, PipelineReport, SplitSummary, SCHEMA_VERSION};

/// Smallest dataset whose split leaves two held-out rows for the metrics and
/// at least one row to train on.
pub(crate) fn min_rows(test_ratio: f64) -> usize {
    let mut rows = 3;
    loop {
        let held_out = test_size(rows, test_ratio);
        if held_out >= 2 && held_out < rows {
            return rows;
        }
        rows += 1;
    }
}

/// Stable classification of pipeline failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidTicker,
    InvalidDateRange,
    InvalidConfig,
    FetchFailed,
    NoDataFound,
    Timeout,
    InvalidSeries,
    InsufficientData,
    SplitFailed,
    PredictBeforeFit,
    ModelFailed,
    MetricLengthMismatch,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error("{ticker}: {rows} complete feature row(s), need at least {needed}")]
    InsufficientData {
        ticker: String,
        rows: usize,
        needed: usize,
    },

    #[error("split failed: {0}")]
    Split(#[from] SplitError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("evaluation failed: {0}")]
    Metrics(#[from] MetricsError),
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Config(ConfigError::Validation(v)) => match v {
                ValidationError::InvalidTicker(_) => ErrorKind::InvalidTicker,
                ValidationError::InvalidDateRange(_) => ErrorKind::InvalidDateRange,
                ValidationError::UnknownPeriod(_) => ErrorKind::InvalidConfig,
            },
            PipelineError::Config(_) => ErrorKind::InvalidConfig,
            PipelineError::Data(e) => match e {
                DataError::NoDataFound { .. } => ErrorKind::NoDataFound,
                DataError::Timeout { .. } => ErrorKind::Timeout,
                DataError::InvalidSeries(_) => ErrorKind::InvalidSeries,
                DataError::FetchFailed { .. }
                | DataError::RateLimited { .. }
                | DataError::CircuitBreakerTripped
                | DataError::ResponseFormatChanged(_) => ErrorKind::FetchFailed,
            },
            PipelineError::InsufficientData { .. } => ErrorKind::InsufficientData,
            PipelineError::Split(SplitError::TooFewRows { .. }) => ErrorKind::InsufficientData,
            PipelineError::Split(SplitError::InvalidRatio(_)) => ErrorKind::SplitFailed,
            PipelineError::Model(ModelError::PredictBeforeFit) => ErrorKind::PredictBeforeFit,
            PipelineError::Model(_) => ErrorKind::ModelFailed,
            PipelineError::Metrics(MetricsError::MetricLengthMismatch { .. }) => {
                ErrorKind::MetricLengthMismatch
            }
            PipelineError::Metrics(MetricsError::InsufficientData { .. }) => {
                ErrorKind::InsufficientData
            }
        }
    }
}

/// Where the machine is, without the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    DataFetched,
    FeaturesBuilt,
    Trained,
    Evaluated,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::DataFetched => "data_fetched",
            Stage::FeaturesBuilt => "features_built",
            Stage::Trained => "trained",
            Stage::Evaluated => "evaluated",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
pub enum PipelineState {
    Idle,
    DataFetched {
        series: PriceSeries,
    },
    FeaturesBuilt {
        series: PriceSeries,
        table: FeatureTable,
    },
    Trained {
        series: PriceSeries,
        table: FeatureTable,
        split: TrainTestSplit,
        predictor: Predictor,
    },
    Evaluated {
        report: Box<PipelineReport>,
        table: FeatureTable,
    },
    Failed {
        stage: Stage,
        error: PipelineError,
    },
}

impl PipelineState {
    pub fn stage(&self) -> Stage {
        match self {
            PipelineState::Idle => Stage::Idle,
            PipelineState::DataFetched { .. } => Stage::DataFetched,
            PipelineState::FeaturesBuilt { .. } => Stage::FeaturesBuilt,
            PipelineState::Trained { .. } => Stage::Trained,
            PipelineState::Evaluated { .. } => Stage::Evaluated,
            PipelineState::Failed { .. } => Stage::Failed,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Evaluated { .. } | PipelineState::Failed { .. })
    }
}

/// Final output of a successful run.
#[derive(Debug)]
pub struct PipelineOutput {
    pub report: PipelineReport,
    /// The enriched series the model was trained on.
    pub table: FeatureTable,
}

pub struct Pipeline<'a> {
    config: ValidatedConfig,
    provider: &'a dyn DataProvider,
    state: PipelineState,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: ValidatedConfig, provider: &'a dyn DataProvider) -> Self {
        Self {
            config,
            provider,
            state: PipelineState::Idle,
        }
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub fn stage(&self) -> Stage {
        self.state.stage()
    }

    /// Run exactly one transition. Terminal states stay where they are.
    pub fn advance(&mut self) -> Stage {
        let current = std::mem::replace(&mut self.state, PipelineState::Idle);
        let stage = current.stage();
        self.state = match self.transition(current) {
            Ok(next) => next,
            Err(error) => {
                warn!(stage = %stage, kind = ?error.kind(), "pipeline failed: {error}");
                PipelineState::Failed { stage, error }
            }
        };
        debug!(from = %stage, to = %self.stage(), "pipeline transition");
        self.stage()
    }

    /// Advance until a terminal state.
    pub fn run(mut self) -> Result<PipelineOutput, PipelineError> {
        loop {
            match std::mem::replace(&mut self.state, PipelineState::Idle) {
                PipelineState::Evaluated { report, table } => {
                    return Ok(PipelineOutput {
                        report: *report,
                        table,
                    })
                }
                PipelineState::Failed { error, .. } => return Err(error),
                pending => {
                    self.state = pending;
                    self.advance();
                }
            }
        }
    }

    fn transition(&self, state: PipelineState) -> Result<PipelineState, PipelineError> {
        match state {
            PipelineState::Idle => {
                let series = self.fetch()?;
                Ok(PipelineState::DataFetched { series })
            }
            PipelineState::DataFetched { series } => {
                let table = self.config.features.build(&series);
                Ok(PipelineState::FeaturesBuilt { series, table })
            }
            PipelineState::FeaturesBuilt { series, table } => {
                let (split, predictor) = self.train(&table)?;
                Ok(PipelineState::Trained {
                    series,
                    table,
                    split,
                    predictor,
                })
            }
            PipelineState::Trained {
                series,
                table,
                split,
                predictor,
            } => {
                let report = self.evaluate(&series, &table, &split, &predictor)?;
                Ok(PipelineState::Evaluated {
                    report: Box::new(report),
                    table,
                })
            }
            terminal => Ok(terminal),
        }
    }

    fn fetch(&self) -> Result<PriceSeries, PipelineError> {
        let request = FetchRequest::new(self.config.ticker.clone(), self.config.window);
        info!(
            ticker = %request.ticker,
            window = %request.window,
            provider = self.provider.name(),
            "fetching price history"
        );
        let series = self.provider.fetch_history(&request)?.into_result()?;
        info!(ticker = %series.ticker(), bars = series.len(), "price history fetched");
        Ok(series)
    }

    fn train(&self, table: &FeatureTable) -> Result<(TrainTestSplit, Predictor), PipelineError> {
        let dataset = table.to_dataset(self.config.target);
        let needed = min_rows(self.config.test_ratio);
        if dataset.len() < needed {
            return Err(PipelineError::InsufficientData {
                ticker: table.ticker().to_string(),
                rows: dataset.len(),
                needed,
            });
        }

        let split = train_test_split(&dataset, self.config.test_ratio, self.config.split)?;
        let mut predictor =
            Predictor::new(self.config.model).with_standardization(self.config.standardize);
        predictor.fit_dataset(&split.train)?;
        Ok((split, predictor))
    }

    fn evaluate(
        &self,
        series: &PriceSeries,
        table: &FeatureTable,
        split: &TrainTestSplit,
        predictor: &Predictor,
    ) -> Result<PipelineReport, PipelineError> {
        let predicted = predictor.predict(&split.test.features)?;
        let metrics = evaluate(&predicted, &split.test.target)?;
        info!(
            ticker = %series.ticker(),
            mse = metrics.mse,
            mae = metrics.mae,
            r2 = metrics.r2,
            "model evaluated"
        );

        let predictions = split
            .test
            .dates
            .iter()
            .zip(&split.test.target)
            .zip(&predicted)
            .map(|((&date, &actual), &predicted)| HeldOutPrediction {
                date,
                actual,
                predicted,
            })
            .collect();
        let forecast = predictor
            .forecast_next(table)?
            .map(|(as_of, predicted)| Forecast { as_of, predicted });

        let (Some(first_date), Some(last_date)) = (series.first_date(), series.last_date()) else {
            return Err(PipelineError::InsufficientData {
                ticker: series.ticker().to_string(),
                rows: 0,
                needed: 1,
            });
        };

        Ok(PipelineReport {
            schema_version: SCHEMA_VERSION,
            ticker: series.ticker().clone(),
            provider: self.provider.name().to_string(),
            window: self.config.window.to_string(),
            first_date,
            last_date,
            bar_count: series.len(),
            dataset_hash: series.content_hash(),
            feature_names: table.feature_names(),
            target: self.config.target,
            model: self.config.model,
            standardized: self.config.standardize,
            split: SplitSummary {
                policy: self.config.split,
                test_ratio: self.config.test_ratio,
                train_rows: split.train.len(),
                test_rows: split.test.len(),
            },
            metrics,
            predictions,
            forecast,
            generated_at: Utc::now(),
        })
    }
}

/// Validate `config` against today's date and run it to completion.
pub fn run_pipeline(
    config: &PipelineConfig,
    provider: &dyn DataProvider,
) -> Result<PipelineReport, PipelineError> {
    let validated = config.validate(Local::now().date_naive())?;
    Ok(Pipeline::new(validated, provider).run()?.report)
}
