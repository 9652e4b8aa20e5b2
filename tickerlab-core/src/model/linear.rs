//! Ordinary least squares via smartcore.

use super::{to_matrix, ModelError, Regressor};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::linear_regression::{
    LinearRegression, LinearRegressionParameters, LinearRegressionSolverName,
};

type Fitted = LinearRegression<f64, f64, DenseMatrix<f64>, Vec<f64>>;

#[derive(Default)]
pub struct LinearModel {
    fitted: Option<Fitted>,
}

impl LinearModel {
    pub fn new() -> Self {
        Self::default()
    }
}

impl std::fmt::Debug for LinearModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinearModel")
            .field("fitted", &self.fitted.is_some())
            .finish()
    }
}

impl Regressor for LinearModel {
    fn name(&self) -> &str {
        "linear"
    }

    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<(), ModelError> {
        let matrix = to_matrix(x)?;
        // SVD copes with collinear columns such as overlapping moving averages.
        let params = LinearRegressionParameters::default()
            .with_solver(LinearRegressionSolverName::SVD);
        let model = LinearRegression::fit(&matrix, &y.to_vec(), params)
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
