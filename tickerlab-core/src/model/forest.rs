//! Random forest regression via smartcore.

use super::{to_matrix, ModelError, Regressor};
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;
use tracing::debug;

type Fitted = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForestParams {
    pub n_trees: usize,
    /// `None` grows each tree until its leaves are pure.
    pub max_depth: Option<u16>,
    pub min_samples_split: usize,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            seed: 42,
        }
    }
}

pub struct ForestModel {
    params: ForestParams,
    fitted: Option<Fitted>,
}

impl ForestModel {
    pub fn new(params: ForestParams) -> Self {
        Self {
            params,
            fitted: None,
        }
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    fn smartcore_params(&self) -> RandomForestRegressorParameters {
        let params = RandomForestRegressorParameters::default()
            .with_n_trees(self.params.n_trees)
            .with_min_samples_split(self.params.min_samples_split)
            .with_seed(self.params.seed);
        match self.params.max_depth {
            Some(depth) => params.with_max_depth(depth),
            None => params,
        }
    }
}

impl std::fmt::Debug for ForestModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForestModel")
            .field("params", &self.params)
            .field("fitted", &self.fitted.is_some())
            .finish()
    }
}

impl Regressor for ForestModel {
    fn name(&self) -> &str {
        "random_forest"
    }

    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<(), ModelError> {
        let matrix = to_matrix(x)?;
        debug!(
            n_trees = self.params.n_trees,
            rows = x.len(),
            "fitting random forest"
        );
        let model = RandomForestRegressor::fit(&matrix, &y.to_vec(), self.smartcore_params())
            .map_err(|e| ModelError::Backend(e.to_string()))?;
        self.fitted = Some(model);
        Ok(())
    }

    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<f64>, ModelError> {
        let model = self.fitted.as_ref().ok_or(ModelError::PredictBeforeFit)?;
        model
            .predict(&to_matrix(x)?)
            .map_err(|e| ModelError::Backend(e.to_string()))
    }

    fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }
}
