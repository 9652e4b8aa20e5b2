//! Regression models behind one interface.
//!
//! [`Regressor`] is the strategy seam: ordinary least squares and random
//! forest both implement it. [`Predictor`] wraps one strategy together with
//! optional standardization and enforces the fit-before-predict lifecycle.

pub mod forest;
pub mod linear;
pub mod predictor;
pub mod scaler;
pub mod split;

pub use forest::{ForestModel, ForestParams};
pub use linear::LinearModel;
pub use predictor::Predictor;
pub use scaler::StandardScaler;
pub use split::{test_size, train_test_split, SplitError, SplitPolicy, TrainTestSplit};

use serde::{Deserialize, Serialize};
use smartcore::linalg::basic::matrix::DenseMatrix;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("model must be fitted before predicting")]
    PredictBeforeFit,

    #[error("invalid model input: {0}")]
    InvalidInput(String),

    #[error("expected {expected} feature(s) per row, got {got}")]
    FeatureCountMismatch { expected: usize, got: usize },

    #[error("model backend failed: {0}")]
    Backend(String),
}

/// A regression strategy.
pub trait Regressor: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Fit on rows `x` and targets `y`. Inputs are already validated.
    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<(), ModelError>;

    /// One prediction per row of `x`.
    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>, ModelError>;

    fn is_fitted(&self) -> bool;
}

fn default_n_trees() -> usize {
    100
}

fn default_min_samples_split() -> usize {
    2
}

fn default_seed() -> u64 {
    42
}

/// Which regressor to train. Serialized with a `type` tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelKind {
    #[default]
    Linear,
    RandomForest {
        #[serde(default = "default_n_trees")]
        n_trees: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_depth: Option<u16>,
        #[serde(default = "default_min_samples_split")]
        min_samples_split: usize,
        #[serde(default = "default_seed")]
        seed: u64,
    },
}

impl ModelKind {
    /// Random forest with 100 trees, unbounded depth and seed 42.
    pub fn random_forest() -> Self {
        let p = ForestParams::default();
        ModelKind::RandomForest {
            n_trees: p.n_trees,
            max_depth: p.max_depth,
            min_samples_split: p.min_samples_split,
            seed: p.seed,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ModelKind::Linear => "linear",
            ModelKind::RandomForest { .. } => "random_forest",
        }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if let ModelKind::RandomForest {
            n_trees,
            min_samples_split,
            ..
        } = *self
        {
            if n_trees == 0 {
                return Err(ModelError::InvalidInput("n_trees must be at least 1".into()));
            }
            if min_samples_split < 2 {
                return Err(ModelError::InvalidInput(
                    "min_samples_split must be at least 2".into(),
                ));
            }
        }
        Ok(())
    }

    pub fn build(&self) -> Box<dyn Regressor> {
        match *self {
            ModelKind::Linear => Box::new(LinearModel::new()),
            ModelKind::RandomForest {
                n_trees,
                max_depth,
                min_samples_split,
                seed,
            } => Box::new(ForestModel::new(ForestParams {
                n_trees,
                max_depth,
                min_samples_split,
                seed,
            })),
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for ModelKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "linear" => Ok(ModelKind::Linear),
            "random_forest" | "rf" => Ok(ModelKind::random_forest()),
            other => Err(ModelError::InvalidInput(format!("unknown model type: {other}"))),
        }
    }
}

pub(crate) fn to_matrix(rows: &[Vec<f64>]) -> Result<DenseMatrix<f64>, ModelError> {
    DenseMatrix::from_2d_vec(&rows.to_vec()).map_err(|e| ModelError::InvalidInput(e.to_string()))
}
