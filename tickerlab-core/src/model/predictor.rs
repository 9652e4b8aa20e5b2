//! Predictor: a regression strategy plus optional feature standardization.
//!
//! The scaler is fit on the training rows only and then applied unchanged to
//! every later `predict` call, so held-out rows never leak into the scaling.

use super::{ModelError, ModelKind, Regressor, StandardScaler};
use crate::features::{Dataset, FeatureTable};
use chrono::NaiveDate;
use tracing::info;

#[derive(Debug)]
pub struct Predictor {
    kind: ModelKind,
    regressor: Box<dyn Regressor>,
    standardize: bool,
    scaler: Option<StandardScaler>,
    n_features: Option<usize>,
}

impl Predictor {
    pub fn new(kind: ModelKind) -> Self {
        Self {
            kind,
            regressor: kind.build(),
            standardize: false,
            scaler: None,
            n_features: None,
        }
    }

    pub fn with_standardization(mut self, standardize: bool) -> Self {
        self.standardize = standardize;
        self
    }

    pub fn kind(&self) -> ModelKind {
        self.kind
    }

    pub fn is_trained(&self) -> bool {
        self.n_features.is_some() && self.regressor.is_fitted()
    }

    pub fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<(), ModelError> {
        if x.is_empty() {
            return Err(ModelError::InvalidInput("cannot fit on zero rows".into()));
        }
        if x.len() != y.len() {
            return Err(ModelError::InvalidInput(format!(
                "{} feature row(s) but {} target(s)",
                x.len(),
                y.len()
            )));
        }
        let width = x[0].len();
        if width == 0 {
            return Err(ModelError::InvalidInput("rows have no features".into()));
        }
        check_rows(x, width)?;
        if y.iter().any(|v| !v.is_finite()) {
            return Err(ModelError::InvalidInput("targets must be finite".into()));
        }

        let scaler = self.standardize.then(|| StandardScaler::fit(x));
        let prepared = match &scaler {
            Some(s) => s.transform(x),
            None => x.to_vec(),
        };
        self.regressor.fit(&prepared, y)?;
        self.scaler = scaler;
        self.n_features = Some(width);

        info!(
            model = self.regressor.name(),
            rows = x.len(),
            features = width,
            standardized = self.standardize,
            "model fitted"
        );
        Ok(())
    }

    pub fn fit_dataset(&mut self, dataset: &Dataset) -> Result<(), ModelError> {
        self.fit(&dataset.features, &dataset.target)
    }

    /// One prediction per row. Fails with `PredictBeforeFit` until `fit` succeeds.
    pub fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>, ModelError> {
        let width = self.n_features.ok_or(ModelError::PredictBeforeFit)?;
        if x.is_empty() {
            return Ok(Vec::new());
        }
        check_rows(x, width)?;
        match &self.scaler {
            Some(scaler) => self.regressor.predict(&scaler.transform(x)),
            None => self.regressor.predict(x),
        }
    }

    /// Prediction for the newest complete feature row, i.e. the period after
    /// the last bar when that row is the last one.
    pub fn forecast_next(&self, table: &FeatureTable) -> Result<Option<(NaiveDate, f64)>, ModelError> {
        let Some((date, row)) = table.latest_complete_row() else {
            return Ok(None);
        };
        let prediction = self.predict(&[row])?;
        Ok(prediction.first().map(|p| (date, *p)))
    }
}

fn check_rows(x: &[Vec<f64>], width: usize) -> Result<(), ModelError> {
    if let Some(row) = x.iter().find(|r| r.len() != width) {
        return Err(ModelError::FeatureCountMismatch {
            expected: width,
            got: row.len(),
        });
    }
    if x.iter().flatten().any(|v| !v.is_finite()) {
        return Err(ModelError::InvalidInput("features must be finite".into()));
    }
    Ok(())
}
